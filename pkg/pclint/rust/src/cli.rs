// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use dd_pclint::GraphFormat;
use std::path::PathBuf;

/// Target file when no path argument is given.
pub const FILE_ENV: &str = "DD_PCLINT_FILE";
pub const LOG_LEVEL_ENV: &str = "DD_PCLINT_LOG_LEVEL";
pub const DEFAULT_FILE: &str = "process-compose.yaml";

#[derive(Parser, Debug)]
#[command(name = "dd-pclint")]
#[command(version, about = "Lint, fix and graph process-compose configuration files", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report every convention violation in a file
    Lint {
        #[command(flatten)]
        target: Target,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Apply the auto-fixable rules in place
    Fmt {
        #[command(flatten)]
        target: Target,

        /// Exit with status 1 instead of writing when the file would change
        #[arg(long)]
        check: bool,
    },

    /// Render the process dependency graph
    Graph {
        /// Configuration file [default: $DD_PCLINT_FILE or process-compose.yaml]
        file: Option<PathBuf>,

        /// ascii, mermaid, json or yaml
        #[arg(short, long, default_value_t = GraphFormat::Ascii)]
        format: GraphFormat,

        /// Only show the dependencies of this process
        #[arg(short, long)]
        process: Option<String>,
    },

    /// List the built-in rules
    Rules,
}

#[derive(Args, Debug)]
pub struct Target {
    /// Configuration file [default: $DD_PCLINT_FILE or process-compose.yaml]
    pub file: Option<PathBuf>,

    /// Disable a rule by identifier (repeatable)
    #[arg(long, value_name = "RULE")]
    pub disable: Vec<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Positional argument, then `DD_PCLINT_FILE`, then `process-compose.yaml`.
pub fn resolve_file(arg: Option<PathBuf>) -> PathBuf {
    arg.or_else(|| {
        std::env::var_os(FILE_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    })
    .unwrap_or_else(|| PathBuf::from(DEFAULT_FILE))
}

/// `-v` flags win over `DD_PCLINT_LOG_LEVEL`; warn otherwise.
pub fn log_level(verbose: u8) -> log::Level {
    match verbose {
        0 => std::env::var(LOG_LEVEL_ENV)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(log::Level::Warn),
        1 => log::Level::Info,
        _ => log::Level::Debug,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_lint_flags() {
        let cli = Cli::try_parse_from([
            "dd-pclint",
            "-vv",
            "lint",
            "--disable",
            "version",
            "--disable",
            "sort-processes",
            "--format",
            "json",
            "pc.yaml",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::Lint { target, format } = cli.command else {
            panic!("expected lint");
        };
        assert_eq!(target.file, Some(PathBuf::from("pc.yaml")));
        assert_eq!(target.disable, vec!["version", "sort-processes"]);
        assert_eq!(format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_graph_format() {
        let cli = Cli::try_parse_from(["dd-pclint", "graph", "-f", "mermaid"]).unwrap();
        let Command::Graph { file, format, .. } = cli.command else {
            panic!("expected graph");
        };
        assert_eq!(file, None);
        assert_eq!(format, GraphFormat::Mermaid);

        assert!(Cli::try_parse_from(["dd-pclint", "graph", "-f", "dot"]).is_err());
    }

    #[test]
    fn test_resolve_file() {
        temp_env::with_var(FILE_ENV, None::<&str>, || {
            assert_eq!(resolve_file(None), PathBuf::from(DEFAULT_FILE));
        });
        temp_env::with_var(FILE_ENV, Some("/etc/pc.yaml"), || {
            assert_eq!(resolve_file(None), PathBuf::from("/etc/pc.yaml"));
            assert_eq!(
                resolve_file(Some(PathBuf::from("local.yaml"))),
                PathBuf::from("local.yaml")
            );
        });
        temp_env::with_var(FILE_ENV, Some(""), || {
            assert_eq!(resolve_file(None), PathBuf::from(DEFAULT_FILE));
        });
    }

    #[test]
    fn test_log_level() {
        temp_env::with_var(LOG_LEVEL_ENV, None::<&str>, || {
            assert_eq!(log_level(0), log::Level::Warn);
            assert_eq!(log_level(1), log::Level::Info);
            assert_eq!(log_level(3), log::Level::Debug);
        });
        temp_env::with_var(LOG_LEVEL_ENV, Some("debug"), || {
            assert_eq!(log_level(0), log::Level::Debug);
            assert_eq!(log_level(1), log::Level::Info);
        });
        temp_env::with_var(LOG_LEVEL_ENV, Some("loud"), || {
            assert_eq!(log_level(0), log::Level::Warn);
        });
    }
}
