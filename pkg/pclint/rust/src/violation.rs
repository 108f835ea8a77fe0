// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use crate::document::Position;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warn,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warn => write!(f, "warn"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One diagnostic finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub file: String,
    /// 1-based, 0 if unknown.
    pub line: usize,
    /// 1-based, 0 if unknown.
    pub column: usize,
    pub rule: &'static str,
    pub message: String,
    pub severity: Severity,
    pub fixable: bool,
}

impl Violation {
    pub fn new(
        file: &str,
        position: Position,
        rule: &'static str,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file: file.to_string(),
            line: position.line,
            column: position.column,
            rule,
            message: message.into(),
            severity,
            fixable: false,
        }
    }

    pub fn fixable(mut self) -> Self {
        self.fixable = true;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file)?;
        if self.line > 0 {
            write!(f, ":{}", self.line)?;
            if self.column > 0 {
                write!(f, ":{}", self.column)?;
            }
        }
        write!(f, ": {} [{}] {}", self.severity, self.rule, self.message)?;
        if self.fixable {
            write!(f, " (fixable)")?;
        }
        Ok(())
    }
}

/// Count of (errors, warnings).
pub fn tally(violations: &[Violation]) -> (usize, usize) {
    let errors = violations.iter().filter(|v| v.is_error()).count();
    (errors, violations.len() - errors)
}
