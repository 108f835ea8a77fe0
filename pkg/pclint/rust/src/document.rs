// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! In-memory model of one parsed configuration file.
//!
//! A [`Document`] is built fresh by [`crate::parse`] and never mutated
//! afterwards: fix rules produce new bytes from `raw_content` instead.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 1-based source position. `0` means unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const UNKNOWN: Position = Position { line: 0, column: 0 };

    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Positions of every mapping key and sequence item, keyed by path from the
/// document root (`["processes", "web", "schedule", "cron"]`).
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    positions: HashMap<Vec<String>, Position>,
    process_order: Vec<String>,
}

impl SourceMap {
    pub(crate) fn insert(&mut self, path: Vec<String>, position: Position) {
        if path.len() == 2 && path.first().is_some_and(|p| p == "processes") {
            if let Some(name) = path.get(1) {
                self.process_order.push(name.clone());
            }
        }
        self.positions.entry(path).or_insert(position);
    }

    /// Position of the node at `path`, if the source has one.
    pub fn get(&self, path: &[&str]) -> Option<Position> {
        let key: Vec<String> = path.iter().map(|s| s.to_string()).collect();
        self.positions.get(&key).copied()
    }

    /// Process names in the order they appear in the raw text.
    pub fn process_order(&self) -> &[String] {
        &self.process_order
    }
}

/// Root value produced by parsing one configuration file.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: String,
    /// Declared schema version; empty when missing.
    pub version: String,
    /// Top-level `env_file` (or `dotenv`) sources.
    pub env_files: Vec<String>,
    pub raw_content: Vec<u8>,
    pub line_index: Vec<String>,
    pub source_map: SourceMap,
    processes: Vec<Process>,
}

impl Document {
    pub(crate) fn new(
        path: String,
        version: String,
        env_files: Vec<String>,
        processes: Vec<Process>,
        raw_content: Vec<u8>,
        source_map: SourceMap,
    ) -> Self {
        let line_index = String::from_utf8_lossy(&raw_content)
            .split('\n')
            .map(str::to_string)
            .collect();
        Self {
            path,
            version,
            env_files,
            raw_content,
            line_index,
            source_map,
            processes,
        }
    }

    /// Processes in declaration order.
    pub fn processes(&self) -> impl Iterator<Item = &Process> {
        self.processes.iter()
    }

    pub fn process(&self, name: &str) -> Option<&Process> {
        self.processes.iter().find(|p| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn process_order(&self) -> &[String] {
        self.source_map.process_order()
    }

    /// Position of a process key, or of one of its (nested) fields.
    pub fn position_of(&self, process: &str, field: &[&str]) -> Position {
        let mut path = vec!["processes", process];
        path.extend_from_slice(field);
        self.source_map
            .get(&path)
            .or_else(|| self.source_map.get(&["processes", process]))
            .unwrap_or(Position::UNKNOWN)
    }

    /// Position of a top-level key.
    pub fn position_of_key(&self, key: &str) -> Position {
        self.source_map.get(&[key]).unwrap_or(Position::UNKNOWN)
    }
}

/// One named unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Process {
    #[serde(skip)]
    pub name: String,
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default, deserialize_with = "deserialize_depends_on")]
    pub depends_on: Vec<Dependency>,
    #[serde(default)]
    pub readiness_probe: Option<ReadinessProbe>,
    #[serde(default)]
    pub schedule: Option<Schedule>,
    #[serde(default)]
    pub availability: Option<Availability>,
    #[serde(default)]
    pub shutdown: Option<Shutdown>,
    #[serde(default)]
    pub environment: Vec<String>,
}

impl Process {
    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }

    /// `KEY=VALUE` entries split at the first `=`. Entries without `=` have
    /// an empty value.
    pub fn environment_pairs(&self) -> impl Iterator<Item = (usize, &str, &str)> {
        self.environment.iter().enumerate().map(|(i, entry)| {
            let (key, value) = entry.split_once('=').unwrap_or((entry.as_str(), ""));
            (i, key.trim(), value)
        })
    }
}

/// Condition a dependency must reach before the dependent starts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DependencyCondition {
    #[default]
    ProcessStarted,
    ProcessHealthy,
    ProcessCompleted,
    ProcessCompletedSuccessfully,
    /// Unrecognised tag, kept verbatim.
    Other(String),
}

impl DependencyCondition {
    pub fn as_str(&self) -> &str {
        match self {
            Self::ProcessStarted => "process_started",
            Self::ProcessHealthy => "process_healthy",
            Self::ProcessCompleted => "process_completed",
            Self::ProcessCompletedSuccessfully => "process_completed_successfully",
            Self::Other(tag) => tag,
        }
    }
}

impl From<&str> for DependencyCondition {
    fn from(tag: &str) -> Self {
        match tag {
            "process_started" => Self::ProcessStarted,
            "process_healthy" => Self::ProcessHealthy,
            "process_completed" => Self::ProcessCompleted,
            "process_completed_successfully" => Self::ProcessCompletedSuccessfully,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for DependencyCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DependencyCondition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from(tag.as_str()))
    }
}

impl Serialize for DependencyCondition {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub name: String,
    pub condition: DependencyCondition,
}

#[derive(Deserialize, Default)]
struct DependencyEntry {
    #[serde(default)]
    condition: DependencyCondition,
}

/// `depends_on` is a mapping; keep its declaration order.
fn deserialize_depends_on<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<Dependency>, D::Error> {
    use serde::de::Error;

    let Some(mapping) = Option::<serde_yaml::Mapping>::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    let mut deps = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let name = match key {
            serde_yaml::Value::String(s) => s,
            other => return Err(D::Error::custom(format!("depends_on key {other:?} is not a string"))),
        };
        let entry: Option<DependencyEntry> = serde_yaml::from_value(value).map_err(D::Error::custom)?;
        deps.push(Dependency {
            name,
            condition: entry.unwrap_or_default().condition,
        });
    }
    Ok(deps)
}

/// A port may be numeric or an environment-substituted string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum IntOrString {
    Int(i64),
    Str(String),
}

impl fmt::Display for IntOrString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct ReadinessProbe {
    #[serde(default)]
    pub http_get: Option<HttpProbe>,
    #[serde(default)]
    pub exec: Option<ExecProbe>,
    #[serde(default)]
    pub initial_delay_seconds: Option<u64>,
    #[serde(default)]
    pub period_seconds: Option<u64>,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub success_threshold: Option<u64>,
    #[serde(default)]
    pub failure_threshold: Option<u64>,
}

/// Which kind of check a readiness probe performs.
#[derive(Debug, Clone, Copy)]
pub enum ProbeKind<'a> {
    Exec(&'a ExecProbe),
    Http(&'a HttpProbe),
    /// Block present but neither `exec` nor `http_get` set.
    Empty,
}

impl ReadinessProbe {
    pub fn kind(&self) -> ProbeKind<'_> {
        match (&self.exec, &self.http_get) {
            (Some(exec), _) => ProbeKind::Exec(exec),
            (None, Some(http)) => ProbeKind::Http(http),
            (None, None) => ProbeKind::Empty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct HttpProbe {
    #[serde(default)]
    pub scheme: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<IntOrString>,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct ExecProbe {
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub working_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Schedule {
    #[serde(default)]
    pub cron: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub run_on_start: bool,
    #[serde(default)]
    pub max_concurrent: Option<i64>,
}

impl Schedule {
    /// `cron`, treating a blank string as unset.
    pub fn cron(&self) -> Option<&str> {
        non_blank(self.cron.as_deref())
    }

    /// `interval`, treating a blank string as unset.
    pub fn interval(&self) -> Option<&str> {
        non_blank(self.interval.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Availability {
    #[serde(default)]
    pub restart: Option<String>,
    #[serde(default)]
    pub backoff_seconds: Option<u64>,
    #[serde(default)]
    pub max_restarts: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Shutdown {
    #[serde(default)]
    pub signal: Option<IntOrString>,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub command: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_pairs() {
        let process = Process {
            environment: vec![
                "A=1".to_string(),
                "B=x=y".to_string(),
                "BARE".to_string(),
            ],
            ..Process::default()
        };
        let pairs: Vec<_> = process.environment_pairs().collect();
        assert_eq!(pairs, vec![(0, "A", "1"), (1, "B", "x=y"), (2, "BARE", "")]);
    }

    #[test]
    fn test_dependency_condition_roundtrip_tags() {
        for tag in [
            "process_started",
            "process_healthy",
            "process_completed",
            "process_completed_successfully",
            "process_log_ready",
        ] {
            assert_eq!(DependencyCondition::from(tag).as_str(), tag);
        }
        assert_eq!(
            DependencyCondition::from("process_log_ready"),
            DependencyCondition::Other("process_log_ready".to_string())
        );
    }

    #[test]
    fn test_depends_on_keeps_declaration_order() {
        let yaml = r#"
command: task web:run
depends_on:
  redis:
    condition: process_healthy
  db:
  api:
    condition: process_completed
"#;
        let process: Process = serde_yaml::from_str(yaml).unwrap();
        let names: Vec<&str> = process.depends_on.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["redis", "db", "api"]);
        assert_eq!(process.depends_on[0].condition, DependencyCondition::ProcessHealthy);
        assert_eq!(process.depends_on[1].condition, DependencyCondition::ProcessStarted);
        assert_eq!(process.depends_on[2].condition, DependencyCondition::ProcessCompleted);
    }

    #[test]
    fn test_probe_kind() {
        let yaml = r#"
http_get:
  host: 127.0.0.1
  port: "${PORT}"
  path: /health
period_seconds: 5
"#;
        let probe: ReadinessProbe = serde_yaml::from_str(yaml).unwrap();
        match probe.kind() {
            ProbeKind::Http(http) => {
                assert_eq!(http.port, Some(IntOrString::Str("${PORT}".to_string())));
            }
            other => panic!("expected http probe, got {other:?}"),
        }

        let probe: ReadinessProbe = serde_yaml::from_str("exec:\n  command: task web:health\n").unwrap();
        assert!(matches!(probe.kind(), ProbeKind::Exec(e) if e.command == "task web:health"));

        let probe: ReadinessProbe = serde_yaml::from_str("period_seconds: 5\n").unwrap();
        assert!(matches!(probe.kind(), ProbeKind::Empty));
    }

    #[test]
    fn test_schedule_blank_fields_are_unset() {
        let schedule: Schedule = serde_yaml::from_str("cron: \"\"\ninterval: \"  \"\n").unwrap();
        assert_eq!(schedule.cron(), None);
        assert_eq!(schedule.interval(), None);
    }

    #[test]
    fn test_unknown_fields_tolerated() {
        let yaml = "command: task a:run\nworking_dir: /tmp\nlog_location: /var/log/a.log\n";
        let process: Process = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(process.command, "task a:run");
    }
}
