// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Per-process conventions: task runner commands, lifecycle policy, probes.

use super::{Rule, enabled};
use crate::document::{Document, ProbeKind};
use crate::violation::Violation;
use regex::Regex;
use std::sync::LazyLock;

/// A task target: colon-separated segments, e.g. `api`, `api:db`.
#[allow(clippy::expect_used)]
static TASK_TARGET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_.\-]+(?::[A-Za-z0-9_.\-]+)*$").expect("static regex")
});

/// Why a command does not follow the `task <name>:<action>` convention.
#[derive(Debug, PartialEq, Eq)]
enum TaskMismatch {
    NotTask,
    MissingTarget,
    BadTarget(String),
    WrongAction(String),
}

/// First non-flag argument after `task`.
fn task_target(command: &str) -> Result<&str, TaskMismatch> {
    let mut words = command.split_whitespace();
    if words.next() != Some("task") {
        return Err(TaskMismatch::NotTask);
    }
    words
        .find(|w| !w.starts_with('-'))
        .ok_or(TaskMismatch::MissingTarget)
}

/// Check that `command` is `task <name>:<action>`. The last segment must be
/// `action`, optionally followed by a `-` or `_` qualifier (`:run-dev`).
fn match_task_command(command: &str, action: &str) -> Result<(), TaskMismatch> {
    let target = task_target(command)?;
    if !TASK_TARGET.is_match(target) {
        return Err(TaskMismatch::BadTarget(target.to_string()));
    }
    let Some((_, last)) = target.rsplit_once(':') else {
        return Err(TaskMismatch::WrongAction(target.to_string()));
    };
    let qualified = last
        .strip_prefix(action)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('-') || rest.starts_with('_'));
    if !qualified {
        return Err(TaskMismatch::WrongAction(target.to_string()));
    }
    Ok(())
}

fn describe(mismatch: TaskMismatch, action: &str) -> String {
    match mismatch {
        TaskMismatch::NotTask => {
            format!("does not use the task runner (expected `task <name>:{action}`)")
        }
        TaskMismatch::MissingTarget => {
            format!("`task` is missing a target (expected `task <name>:{action}`)")
        }
        TaskMismatch::BadTarget(target) => {
            format!("task target '{target}' is not of the form `<name>:{action}`")
        }
        TaskMismatch::WrongAction(target) => {
            format!("task target '{target}' should end with ':{action}'")
        }
    }
}

pub(super) fn check_task_command(doc: &Document) -> Vec<Violation> {
    let rule = Rule::TaskCommand;
    enabled(doc)
        .filter_map(|p| {
            let mismatch = match_task_command(&p.command, "run").err()?;
            Some(rule.violation(
                doc,
                doc.position_of(&p.name, &["command"]),
                format!("process '{}': command {}", p.name, describe(mismatch, "run")),
            ))
        })
        .collect()
}

pub(super) fn check_task_health(doc: &Document) -> Vec<Violation> {
    let rule = Rule::TaskHealth;
    enabled(doc)
        .filter_map(|p| {
            let probe = p.readiness_probe.as_ref()?;
            let ProbeKind::Exec(exec) = probe.kind() else {
                return None;
            };
            let mismatch = match_task_command(&exec.command, "health").err()?;
            Some(rule.violation(
                doc,
                doc.position_of(&p.name, &["readiness_probe", "exec", "command"]),
                format!(
                    "process '{}': readiness probe command {}",
                    p.name,
                    describe(mismatch, "health")
                ),
            ))
        })
        .collect()
}

pub(super) fn check_shutdown(doc: &Document) -> Vec<Violation> {
    let rule = Rule::ShutdownConfig;
    enabled(doc)
        .filter(|p| {
            p.shutdown
                .as_ref()
                .is_none_or(|s| s.signal.is_none() && s.timeout_seconds.is_none())
        })
        .map(|p| {
            rule.violation(
                doc,
                doc.position_of(&p.name, &["shutdown"]),
                format!(
                    "process '{}' has no shutdown signal or timeout_seconds configured",
                    p.name
                ),
            )
        })
        .collect()
}

pub(super) fn check_restart_policy(doc: &Document) -> Vec<Violation> {
    let rule = Rule::RestartPolicy;
    enabled(doc)
        .filter(|p| {
            p.availability
                .as_ref()
                .and_then(|a| a.restart.as_deref())
                .is_none_or(|r| r.trim().is_empty())
        })
        .map(|p| {
            rule.violation(
                doc,
                doc.position_of(&p.name, &["availability"]),
                format!("process '{}' has no availability.restart policy", p.name),
            )
        })
        .collect()
}

pub(super) fn check_readiness_probe(doc: &Document) -> Vec<Violation> {
    let rule = Rule::ReadinessProbe;
    enabled(doc)
        .filter(|p| p.readiness_probe.is_none())
        .map(|p| {
            rule.violation(
                doc,
                doc.position_of(&p.name, &[]),
                format!("process '{}' has no readiness_probe", p.name),
            )
        })
        .collect()
}
