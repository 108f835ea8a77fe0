// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Bytes to [`Document`].
//!
//! The text is read twice: once through the `yaml-rust2` event stream to
//! record a real position for every key and sequence item, and once through
//! `serde_yaml` to decode the typed model. Unknown keys are ignored.

use crate::document::{Document, Position, Process, SourceMap};
use crate::errors::ParseError;
use log::debug;
use serde::Deserialize;
use std::path::Path;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::Marker;

/// Parse a configuration file from disk.
pub fn parse_file(path: &Path) -> Result<Document, ParseError> {
    let display = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|source| ParseError::Io {
        path: display.clone(),
        source,
    })?;
    parse(&display, bytes)
}

/// Parse configuration bytes. `path` is only used in diagnostics.
///
/// Fails only when the input is not well-formed YAML or cannot be decoded
/// into the model; semantic problems are left to the rules.
pub fn parse(path: &str, bytes: impl Into<Vec<u8>>) -> Result<Document, ParseError> {
    let raw_content = bytes.into();
    let text = std::str::from_utf8(&raw_content).map_err(|source| ParseError::Encoding {
        path: path.to_string(),
        source,
    })?;

    let collected = collect_positions(path, text)?;
    let (version, env_files, processes) = match collected.root {
        RootKind::Absent => (String::new(), Vec::new(), Vec::new()),
        RootKind::Other => {
            return Err(ParseError::NotAMapping {
                path: path.to_string(),
            });
        }
        RootKind::Mapping => decode(path, text)?,
    };

    debug!(
        "parsed {path}: version={version:?}, {} process(es)",
        processes.len()
    );

    Ok(Document::new(
        path.to_string(),
        version,
        env_files,
        processes,
        raw_content,
        collected.source_map,
    ))
}

#[derive(Deserialize, Default)]
struct RawDocument {
    #[serde(default)]
    version: Option<serde_yaml::Value>,
    #[serde(default, alias = "dotenv")]
    env_file: Option<StringOrList>,
    #[serde(default)]
    processes: Option<serde_yaml::Mapping>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrList {
    One(String),
    Many(Vec<String>),
}

fn decode(path: &str, text: &str) -> Result<(String, Vec<String>, Vec<Process>), ParseError> {
    let raw: RawDocument = serde_yaml::from_str(text).map_err(|source| ParseError::Schema {
        path: path.to_string(),
        source,
    })?;

    let version = match raw.version {
        None | Some(serde_yaml::Value::Null) => String::new(),
        Some(serde_yaml::Value::String(s)) => s.trim().to_string(),
        Some(serde_yaml::Value::Number(n)) => n.to_string(),
        Some(serde_yaml::Value::Bool(b)) => b.to_string(),
        Some(other) => {
            return Err(ParseError::Schema {
                path: path.to_string(),
                source: serde::de::Error::custom(format!(
                    "version must be a scalar, got {other:?}"
                )),
            });
        }
    };

    let env_files = match raw.env_file {
        None => Vec::new(),
        Some(StringOrList::One(file)) => vec![file],
        Some(StringOrList::Many(files)) => files,
    };
    let env_files = env_files
        .into_iter()
        .filter(|f| !f.trim().is_empty())
        .collect();

    let mut processes = Vec::new();
    for (key, value) in raw.processes.unwrap_or_default() {
        let name = match key {
            serde_yaml::Value::String(s) if !s.is_empty() => s,
            other => {
                return Err(ParseError::Process {
                    path: path.to_string(),
                    process: format!("{other:?}"),
                    source: serde::de::Error::custom("process name must be a non-empty string"),
                });
            }
        };
        let mut process = match value {
            serde_yaml::Value::Null => Process::default(),
            value => serde_yaml::from_value::<Process>(value).map_err(|source| {
                ParseError::Process {
                    path: path.to_string(),
                    process: name.clone(),
                    source,
                }
            })?,
        };
        process.name = name;
        processes.push(process);
    }

    Ok((version, env_files, processes))
}

/// Shape of the first document's root node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RootKind {
    Absent,
    Mapping,
    Other,
}

struct Collected {
    root: RootKind,
    source_map: SourceMap,
}

fn collect_positions(path: &str, text: &str) -> Result<Collected, ParseError> {
    let mut collector = PositionCollector::default();
    let mut parser = Parser::new_from_str(text);
    parser
        .load(&mut collector, false)
        .map_err(|e| ParseError::Syntax {
            path: path.to_string(),
            line: e.marker().line(),
            column: e.marker().col() + 1,
            message: e.info().to_string(),
        })?;
    Ok(Collected {
        root: collector.root,
        source_map: collector.source_map,
    })
}

enum Frame {
    /// `pending_key` holds the key whose value comes next.
    Mapping { pending_key: Option<String> },
    Sequence { next: usize },
}

struct OpenNode {
    frame: Frame,
    /// Whether entering this node pushed a path segment.
    segment: bool,
    /// A complex (non-scalar) mapping key.
    is_key: bool,
}

/// Role of the next node relative to its parent.
enum Slot {
    Root,
    Key,
    Value(String),
    Item(usize),
}

const COMPLEX_KEY: &str = "<complex>";

struct PositionCollector {
    stack: Vec<OpenNode>,
    path: Vec<String>,
    root: RootKind,
    source_map: SourceMap,
}

impl Default for PositionCollector {
    fn default() -> Self {
        Self {
            stack: Vec::new(),
            path: Vec::new(),
            root: RootKind::Absent,
            source_map: SourceMap::default(),
        }
    }
}

impl PositionCollector {
    fn next_slot(&mut self) -> Slot {
        match self.stack.last_mut().map(|node| &mut node.frame) {
            None => Slot::Root,
            Some(Frame::Mapping { pending_key }) => match pending_key.take() {
                None => Slot::Key,
                Some(key) => Slot::Value(key),
            },
            Some(Frame::Sequence { next }) => {
                let index = *next;
                *next += 1;
                Slot::Item(index)
            }
        }
    }

    fn record(&mut self, segment: String, mark: Marker) {
        let mut path = self.path.clone();
        path.push(segment);
        self.source_map
            .insert(path, Position::new(mark.line(), mark.col() + 1));
    }

    fn scalar(&mut self, value: String, null: bool, mark: Marker) {
        match self.next_slot() {
            Slot::Root => {
                self.root = if null {
                    RootKind::Absent
                } else {
                    RootKind::Other
                };
            }
            Slot::Key => {
                self.record(value.clone(), mark);
                if let Some(OpenNode {
                    frame: Frame::Mapping { pending_key },
                    ..
                }) = self.stack.last_mut()
                {
                    *pending_key = Some(value);
                }
            }
            Slot::Value(_) => {}
            Slot::Item(index) => self.record(index.to_string(), mark),
        }
    }

    fn enter(&mut self, frame: Frame, mark: Marker) {
        let (segment, is_key) = match self.next_slot() {
            Slot::Root => {
                self.root = match frame {
                    Frame::Mapping { .. } => RootKind::Mapping,
                    Frame::Sequence { .. } => RootKind::Other,
                };
                (None, false)
            }
            Slot::Key => (Some(COMPLEX_KEY.to_string()), true),
            Slot::Value(key) => (Some(key), false),
            Slot::Item(index) => {
                self.record(index.to_string(), mark);
                (Some(index.to_string()), false)
            }
        };
        let pushed = segment.is_some();
        if let Some(segment) = segment {
            self.path.push(segment);
        }
        self.stack.push(OpenNode {
            frame,
            segment: pushed,
            is_key,
        });
    }

    fn leave(&mut self) {
        let Some(node) = self.stack.pop() else {
            return;
        };
        if node.segment {
            self.path.pop();
        }
        if node.is_key
            && let Some(OpenNode {
                frame: Frame::Mapping { pending_key },
                ..
            }) = self.stack.last_mut()
        {
            *pending_key = Some(COMPLEX_KEY.to_string());
        }
    }
}

fn is_null_scalar(value: &str) -> bool {
    matches!(value, "" | "~" | "null" | "Null" | "NULL")
}

impl MarkedEventReceiver for PositionCollector {
    fn on_event(&mut self, ev: Event, mark: Marker) {
        match ev {
            Event::Scalar(value, ..) => {
                let null = is_null_scalar(&value);
                self.scalar(value, null, mark);
            }
            Event::Alias(..) => self.scalar("*".to_string(), false, mark),
            Event::MappingStart(..) => self.enter(
                Frame::Mapping { pending_key: None },
                mark,
            ),
            Event::SequenceStart(..) => self.enter(Frame::Sequence { next: 0 }, mark),
            Event::MappingEnd | Event::SequenceEnd => self.leave(),
            _ => {}
        }
    }
}
