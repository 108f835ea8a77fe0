// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use super::{DependencyGraph, GraphNode};
use std::collections::{HashMap, HashSet};
use std::fmt::Write;

/// Indented tree with branch connectors, one line per node.
pub(super) fn ascii(graph: &DependencyGraph) -> String {
    let mut out = String::new();
    for root in &graph.roots {
        out.push_str(&label(root));
        out.push('\n');
        write_children(&mut out, root, "");
    }
    out
}

fn write_children(out: &mut String, node: &GraphNode, prefix: &str) {
    let count = node.depends_on.len();
    for (i, child) in node.depends_on.iter().enumerate() {
        let last = i + 1 == count;
        let (branch, indent) = if last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        let _ = writeln!(out, "{prefix}{branch}{}", label(child));
        write_children(out, child, &format!("{prefix}{indent}"));
    }
}

fn label(node: &GraphNode) -> String {
    let mut label = node.name.clone();
    if let Some(condition) = &node.condition {
        let _ = write!(label, " ({condition})");
    }
    if let Some(status) = &node.status {
        let _ = write!(label, " [{status}]");
    }
    if node.missing {
        label.push_str(" (missing)");
    }
    if node.cycle {
        label.push_str(" (cycle)");
    }
    if node.shared {
        label.push_str(" (see above)");
    }
    label
}

/// `flowchart TD` with one `dependent --> dependency` line per edge.
/// Processes without any edge are listed on their own.
pub(super) fn mermaid(graph: &DependencyGraph) -> String {
    let edges = graph.edges();
    let mut ids = NodeIds::default();
    let mut out = String::from("flowchart TD\n");
    for &(from, to) in &edges {
        let from = ids.node_ref(from);
        let to = ids.node_ref(to);
        let _ = writeln!(out, "    {from} --> {to}");
    }

    let connected: HashSet<&str> = edges.iter().flat_map(|(a, b)| [*a, *b]).collect();
    for root in &graph.roots {
        if !connected.contains(root.name.as_str()) {
            let _ = writeln!(out, "    {}", ids.node_ref(&root.name));
        }
    }
    out
}

/// Mermaid identifiers, assigned in first-seen order. Names that are not
/// valid identifiers are sanitized, and a sanitized id that is already
/// taken gets a numeric suffix.
#[derive(Default)]
struct NodeIds<'g> {
    ids: HashMap<&'g str, String>,
    taken: HashSet<String>,
}

impl<'g> NodeIds<'g> {
    /// Bare id when it equals the name, otherwise the id carrying the real
    /// name as its label.
    fn node_ref(&mut self, name: &'g str) -> String {
        let id = self.id(name);
        if id == name {
            return id;
        }
        format!("{id}[\"{}\"]", name.replace('"', "#quot;"))
    }

    fn id(&mut self, name: &'g str) -> String {
        if let Some(id) = self.ids.get(name) {
            return id.clone();
        }
        let base: String = name
            .chars()
            .map(|c| if is_id_char(c) { c } else { '_' })
            .collect();
        let base = if base.is_empty() { "_".to_string() } else { base };
        let mut id = base.clone();
        let mut n = 2;
        while self.taken.contains(&id) {
            id = format!("{base}_{n}");
            n += 1;
        }
        self.taken.insert(id.clone());
        self.ids.insert(name, id.clone());
        id
    }
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
