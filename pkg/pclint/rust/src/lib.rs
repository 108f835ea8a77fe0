// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

// Correctness
#![deny(clippy::indexing_slicing)]
#![deny(clippy::string_slice)]
#![deny(clippy::cast_possible_wrap)]
#![deny(clippy::undocumented_unsafe_blocks)]
// Panicking code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unimplemented)]
#![deny(clippy::todo)]
// Debug code that shouldn't be in production
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]

//! Static analysis for process-compose style configuration files: parsing
//! with source positions, convention rules with auto-fix, cron/duration
//! grammar validation, and dependency graph rendering.

pub mod document;
pub mod errors;
pub mod grammar;
pub mod graph;
pub mod parser;
pub mod rules;
pub mod violation;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export the public API
pub use document::{Document, Position, Process};
pub use errors::{FixError, ParseError};
pub use graph::{DependencyGraph, GraphFormat};
pub use parser::{parse, parse_file};
pub use rules::{FixReport, Rule, RuleSet, run_checks, run_fixes};
pub use violation::{Severity, Violation};
