// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use super::{Rule, enabled};
use crate::document::{Document, Process, ProbeKind};
use crate::violation::Violation;
use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static SECRET_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)TOKEN|SECRET|KEY|PASSWORD|API_|AUTH_|ACCOUNT_ID").expect("static regex")
});

#[allow(clippy::expect_used)]
static SUBSTITUTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{[A-Za-z_][A-Za-z0-9_]*\}|\$[A-Za-z_][A-Za-z0-9_]*").expect("static regex")
});

/// Whether `value` references a variable (`$NAME` or `${NAME}`). `$$` is an
/// escaped dollar.
pub(crate) fn uses_substitution(value: &str) -> bool {
    SUBSTITUTION.is_match(&value.replace("$$", ""))
}

/// Every string of a process that the runtime expands variables in.
fn expanded_fields(process: &Process) -> impl Iterator<Item = String> + '_ {
    let env_values = process.environment_pairs().map(|(_, _, v)| v.to_string());
    let probe_fields: Vec<String> = match process.readiness_probe.as_ref().map(|p| p.kind()) {
        Some(ProbeKind::Exec(exec)) => vec![exec.command.clone()],
        Some(ProbeKind::Http(http)) => http
            .host
            .iter()
            .cloned()
            .chain(http.port.iter().map(|p| p.to_string()))
            .chain(http.path.iter().cloned())
            .collect(),
        Some(ProbeKind::Empty) | None => Vec::new(),
    };
    std::iter::once(process.command.clone())
        .chain(env_values)
        .chain(probe_fields)
}

fn process_uses_substitution(process: &Process) -> bool {
    expanded_fields(process).any(|field| uses_substitution(&field))
}

pub(super) fn check_substitution(doc: &Document) -> Vec<Violation> {
    let rule = Rule::EnvSubstitution;
    let mut violations = Vec::new();
    for process in enabled(doc) {
        for (idx, key, value) in process.environment_pairs() {
            if !SECRET_KEY.is_match(key) || value.is_empty() || uses_substitution(value) {
                continue;
            }
            let item = idx.to_string();
            violations.push(rule.violation(
                doc,
                doc.position_of(&process.name, &["environment", &item]),
                format!(
                    "process '{}': {key} looks like a secret but has a literal value; use ${{{key}}}",
                    process.name
                ),
            ));
        }
    }
    violations
}

pub(super) fn check_env_file(doc: &Document) -> Vec<Violation> {
    if !doc.env_files.is_empty() {
        return Vec::new();
    }
    let Some(process) = doc.processes().find(|p| process_uses_substitution(p)) else {
        return Vec::new();
    };
    vec![Rule::EnvFile.violation(
        doc,
        doc.position_of(&process.name, &[]),
        format!(
            "process '{}' uses variable substitution but the document declares no env_file",
            process.name
        ),
    )]
}
