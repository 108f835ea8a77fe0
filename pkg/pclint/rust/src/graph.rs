// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Dependency graph between processes.
//!
//! The graph is a forest: each root is expanded through `depends_on`
//! recursively. A dependency already on the current path is emitted as a
//! cycle leaf and a dependency that names no process as a missing leaf, so
//! building always terminates. Each process is expanded once per graph; a
//! later occurrence with dependencies of its own is emitted as a shared leaf
//! pointing back at that expansion, which keeps the forest linear in the
//! number of edges.

mod render;

use crate::document::Document;
use crate::errors::{RenderError, UnknownGraphFormat};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub name: String,
    /// Condition on the edge from the parent; `None` for roots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub missing: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub cycle: bool,
    /// Dependencies already expanded elsewhere in the graph.
    #[serde(skip_serializing_if = "is_false")]
    pub shared: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<GraphNode>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyGraph {
    pub roots: Vec<GraphNode>,
}

struct Builder<'a> {
    doc: &'a Document,
    statuses: &'a HashMap<String, String>,
    path: Vec<&'a str>,
    reached: HashSet<&'a str>,
}

impl<'a> Builder<'a> {
    fn expand(&mut self, name: &'a str, condition: Option<String>) -> GraphNode {
        let mut node = GraphNode {
            name: name.to_string(),
            condition,
            status: self.statuses.get(name).cloned(),
            ..GraphNode::default()
        };
        if self.path.contains(&name) {
            node.cycle = true;
            return node;
        }
        let Some(process) = self.doc.process(name) else {
            node.missing = true;
            return node;
        };
        if !self.reached.insert(name) {
            node.shared = !process.depends_on.is_empty();
            return node;
        }

        self.path.push(name);
        node.depends_on = process
            .depends_on
            .iter()
            .map(|dep| self.expand(&dep.name, Some(dep.condition.to_string())))
            .collect();
        self.path.pop();
        node
    }
}

impl DependencyGraph {
    pub fn build(doc: &Document) -> Self {
        Self::with_status(doc, &HashMap::new())
    }

    /// Build the graph, annotating each node with its runtime status when
    /// `statuses` has an entry for it.
    pub fn with_status(doc: &Document, statuses: &HashMap<String, String>) -> Self {
        let depended: HashSet<&str> = doc
            .processes()
            .flat_map(|p| p.depends_on.iter().map(|d| d.name.as_str()))
            .collect();

        let mut builder = Builder {
            doc,
            statuses,
            path: Vec::new(),
            reached: HashSet::new(),
        };
        let mut roots: Vec<GraphNode> = doc
            .processes()
            .filter(|p| !depended.contains(p.name.as_str()))
            .map(|p| builder.expand(&p.name, None))
            .collect();

        // Processes only reachable through a cycle.
        for process in doc.processes() {
            if !builder.reached.contains(process.name.as_str()) {
                roots.push(builder.expand(&process.name, None));
            }
        }
        Self { roots }
    }

    /// Graph rooted at a single process, or `None` if it is not declared.
    pub fn for_process(
        doc: &Document,
        name: &str,
        statuses: &HashMap<String, String>,
    ) -> Option<Self> {
        let process = doc.process(name)?;
        let mut builder = Builder {
            doc,
            statuses,
            path: Vec::new(),
            reached: HashSet::new(),
        };
        Some(Self {
            roots: vec![builder.expand(&process.name, None)],
        })
    }

    /// Distinct `(dependent, dependency)` pairs in first-seen order. Every
    /// reachable process is expanded exactly once, so a single walk sees
    /// each edge.
    pub fn edges(&self) -> Vec<(&str, &str)> {
        fn walk<'g>(
            node: &'g GraphNode,
            seen: &mut HashSet<(&'g str, &'g str)>,
            out: &mut Vec<(&'g str, &'g str)>,
        ) {
            for child in &node.depends_on {
                let edge = (node.name.as_str(), child.name.as_str());
                if seen.insert(edge) {
                    out.push(edge);
                }
                walk(child, seen, out);
            }
        }

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for root in &self.roots {
            walk(root, &mut seen, &mut out);
        }
        out
    }

    pub fn render(&self, format: GraphFormat) -> Result<String, RenderError> {
        Ok(match format {
            GraphFormat::Ascii => render::ascii(self),
            GraphFormat::Mermaid => render::mermaid(self),
            GraphFormat::Json => serde_json::to_string_pretty(self)? + "\n",
            GraphFormat::Yaml => serde_yaml::to_string(self)?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GraphFormat {
    #[default]
    Ascii,
    Mermaid,
    Json,
    Yaml,
}

impl FromStr for GraphFormat {
    type Err = UnknownGraphFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ascii" => Ok(GraphFormat::Ascii),
            "mermaid" => Ok(GraphFormat::Mermaid),
            "json" => Ok(GraphFormat::Json),
            "yaml" => Ok(GraphFormat::Yaml),
            _ => Err(UnknownGraphFormat(s.to_string())),
        }
    }
}

impl fmt::Display for GraphFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GraphFormat::Ascii => "ascii",
            GraphFormat::Mermaid => "mermaid",
            GraphFormat::Json => "json",
            GraphFormat::Yaml => "yaml",
        })
    }
}
