// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Built-in rule registry.
//!
//! The rule set is closed: [`Rule`] enumerates every check, and
//! [`Rule::as_fix`] exposes the auto-fix capability for the subset that can
//! rewrite the document. Rules only read the [`Document`]; fixes return new
//! bytes built from its raw text.

mod conventions;
mod environment;
mod schedule;
mod sort;
mod version;

use crate::document::{Document, Process};
use crate::errors::{FixError, ParseError, UnknownRule};
use crate::parser::parse;
use crate::violation::{Severity, Violation};
use log::{debug, warn};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    TaskCommand,
    TaskHealth,
    ShutdownConfig,
    RestartPolicy,
    EnvSubstitution,
    EnvFile,
    ReadinessProbe,
    ScheduleConfig,
    Version,
    SortProcesses,
}

impl Rule {
    /// Registration order; violations are reported in this order.
    pub const ALL: [Rule; 10] = [
        Rule::TaskCommand,
        Rule::TaskHealth,
        Rule::ShutdownConfig,
        Rule::RestartPolicy,
        Rule::EnvSubstitution,
        Rule::EnvFile,
        Rule::ReadinessProbe,
        Rule::ScheduleConfig,
        Rule::Version,
        Rule::SortProcesses,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Rule::TaskCommand => "task-command",
            Rule::TaskHealth => "task-health",
            Rule::ShutdownConfig => "shutdown-config",
            Rule::RestartPolicy => "restart-policy",
            Rule::EnvSubstitution => "env-substitution",
            Rule::EnvFile => "env-file",
            Rule::ReadinessProbe => "readiness-probe",
            Rule::ScheduleConfig => "schedule-config",
            Rule::Version => "version",
            Rule::SortProcesses => "sort-processes",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Rule::TaskCommand => "process commands use `task <name>:run`",
            Rule::TaskHealth => "exec readiness probes use `task <name>:health`",
            Rule::ShutdownConfig => "processes configure a shutdown signal or timeout",
            Rule::RestartPolicy => "processes configure an availability restart policy",
            Rule::EnvSubstitution => "secret-like environment values use ${VAR} substitution",
            Rule::EnvFile => "documents using ${VAR} substitution declare an env_file",
            Rule::ReadinessProbe => "processes configure a readiness probe",
            Rule::ScheduleConfig => "schedules set exactly one valid cron or interval",
            Rule::Version => "the document declares a version",
            Rule::SortProcesses => "processes are declared in alphabetical order",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            Rule::EnvFile | Rule::ScheduleConfig | Rule::Version => Severity::Error,
            _ => Severity::Warn,
        }
    }

    pub fn from_name(name: &str) -> Option<Rule> {
        Rule::ALL.into_iter().find(|r| r.name() == name)
    }

    /// The fix capability, for rules that have one.
    pub fn as_fix(self) -> Option<FixRule> {
        match self {
            Rule::Version => Some(FixRule::Version),
            Rule::SortProcesses => Some(FixRule::SortProcesses),
            _ => None,
        }
    }

    pub fn is_fixable(self) -> bool {
        self.as_fix().is_some()
    }

    pub fn check(self, doc: &Document) -> Vec<Violation> {
        let violations = match self {
            Rule::TaskCommand => conventions::check_task_command(doc),
            Rule::TaskHealth => conventions::check_task_health(doc),
            Rule::ShutdownConfig => conventions::check_shutdown(doc),
            Rule::RestartPolicy => conventions::check_restart_policy(doc),
            Rule::EnvSubstitution => environment::check_substitution(doc),
            Rule::EnvFile => environment::check_env_file(doc),
            Rule::ReadinessProbe => conventions::check_readiness_probe(doc),
            Rule::ScheduleConfig => schedule::check(doc),
            Rule::Version => version::check(doc),
            Rule::SortProcesses => sort::check(doc),
        };
        if self.is_fixable() {
            violations.into_iter().map(Violation::fixable).collect()
        } else {
            violations
        }
    }

    pub(crate) fn violation(
        self,
        doc: &Document,
        position: crate::Position,
        message: impl Into<String>,
    ) -> Violation {
        Violation::new(&doc.path, position, self.name(), self.severity(), message)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rules that can rewrite the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixRule {
    Version,
    SortProcesses,
}

impl FixRule {
    pub fn rule(self) -> Rule {
        match self {
            FixRule::Version => Rule::Version,
            FixRule::SortProcesses => Rule::SortProcesses,
        }
    }

    pub fn name(self) -> &'static str {
        self.rule().name()
    }

    pub fn description(self) -> &'static str {
        self.rule().description()
    }

    pub fn check(self, doc: &Document) -> Vec<Violation> {
        self.rule().check(doc)
    }

    /// New document bytes. Returns the input bytes unchanged when there is
    /// nothing to fix.
    pub fn fix(self, doc: &Document) -> Result<Vec<u8>, FixError> {
        match self {
            FixRule::Version => version::fix(doc),
            FixRule::SortProcesses => sort::fix(doc),
        }
    }
}

/// Ordered set of enabled rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            rules: Rule::ALL.to_vec(),
        }
    }
}

impl RuleSet {
    /// Remove rules by identifier.
    pub fn without<S: AsRef<str>>(mut self, names: &[S]) -> Result<Self, UnknownRule> {
        for name in names {
            let name = name.as_ref();
            let rule = Rule::from_name(name).ok_or_else(|| UnknownRule(name.to_string()))?;
            self.rules.retain(|r| *r != rule);
        }
        Ok(self)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn fix_rules(&self) -> impl Iterator<Item = FixRule> + '_ {
        self.rules.iter().filter_map(|r| r.as_fix())
    }
}

/// Run every check rule to completion and collect all violations.
pub fn run_checks(doc: &Document, rules: &RuleSet) -> Vec<Violation> {
    let mut violations = Vec::new();
    for rule in rules.rules() {
        let found = rule.check(doc);
        debug!("{}: {} violation(s)", rule, found.len());
        violations.extend(found);
    }
    violations
}

/// What a single fix rule did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixOutcome {
    Applied,
    /// Nothing to fix.
    Clean,
    /// The rule declined; the document is unchanged.
    Skipped(String),
}

#[derive(Debug, Clone)]
pub struct FixReport {
    /// Final document bytes; always parse.
    pub content: Vec<u8>,
    pub outcomes: Vec<(&'static str, FixOutcome)>,
}

impl FixReport {
    pub fn changed(&self) -> bool {
        self.outcomes
            .iter()
            .any(|(_, outcome)| *outcome == FixOutcome::Applied)
    }
}

/// Apply every enabled fix rule in registration order. The document is
/// re-parsed after each applied fix; a fix whose output does not parse, or
/// that changes any process definition, is discarded and reported as
/// skipped.
pub fn run_fixes(
    path: &str,
    bytes: impl Into<Vec<u8>>,
    rules: &RuleSet,
) -> Result<FixReport, ParseError> {
    let mut doc = parse(path, bytes)?;
    let mut outcomes = Vec::new();

    for fix in rules.fix_rules() {
        let outcome = match fix.fix(&doc) {
            Ok(content) if content == doc.raw_content => FixOutcome::Clean,
            Ok(content) => match parse(path, content) {
                Ok(fixed) => match changed_process(&doc, &fixed) {
                    None => {
                        doc = fixed;
                        FixOutcome::Applied
                    }
                    Some(name) => {
                        warn!("{}: discarding fix that changes process '{name}'", fix.name());
                        FixOutcome::Skipped(format!("fixed output changes process '{name}'"))
                    }
                },
                Err(e) => {
                    warn!("{}: discarding fix that does not parse: {e}", fix.name());
                    FixOutcome::Skipped(format!("fixed output does not parse: {e}"))
                }
            },
            Err(FixError::Unsafe { reason, .. }) => {
                warn!("{}: no change made: {reason}", fix.name());
                FixOutcome::Skipped(reason)
            }
        };
        debug!("{}: {:?}", fix.name(), outcome);
        outcomes.push((fix.name(), outcome));
    }

    Ok(FixReport {
        content: doc.raw_content,
        outcomes,
    })
}

/// Name of the first process that differs between the two documents, or
/// that only one of them declares.
fn changed_process(before: &Document, after: &Document) -> Option<String> {
    before
        .processes()
        .find(|p| after.process(&p.name) != Some(*p))
        .or_else(|| after.processes().find(|p| before.process(&p.name).is_none()))
        .map(|p| p.name.clone())
}

/// Processes the convention rules apply to.
fn enabled(doc: &Document) -> impl Iterator<Item = &Process> {
    doc.processes().filter(|p| p.is_enabled())
}
