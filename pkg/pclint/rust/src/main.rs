// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command, OutputFormat, Target};
use dd_pclint::rules::FixOutcome;
use dd_pclint::violation::tally;
use dd_pclint::{DependencyGraph, GraphFormat, Rule, RuleSet, parse_file, run_checks, run_fixes};
use log::{debug, info};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Exit status for structural errors (unreadable or unparsable input).
const EXIT_STRUCTURAL: u8 = 2;

#[allow(clippy::print_stderr)]
fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = simple_logger::init_with_level(cli::log_level(cli.verbose)) {
        eprintln!("error: could not initialize logging: {e}");
    }

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(EXIT_STRUCTURAL)
        }
    }
}

fn run(command: Command) -> Result<ExitCode> {
    match command {
        Command::Lint { target, format } => lint(target, format),
        Command::Fmt { target, check } => fix(target, check),
        Command::Graph {
            file,
            format,
            process,
        } => graph(cli::resolve_file(file), format, process),
        Command::Rules => {
            list_rules();
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn rule_set(disable: &[String]) -> Result<RuleSet> {
    let rules = RuleSet::default().without(disable)?;
    debug!(
        "enabled rules: {}",
        rules
            .rules()
            .iter()
            .map(|r| r.name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(rules)
}

#[allow(clippy::print_stdout)]
fn lint(target: Target, format: OutputFormat) -> Result<ExitCode> {
    let rules = rule_set(&target.disable)?;
    let file = cli::resolve_file(target.file);
    let doc = parse_file(&file)?;
    info!("linting {} ({} processes)", doc.path, doc.len());

    let violations = run_checks(&doc, &rules);
    let (errors, warnings) = tally(&violations);
    match format {
        OutputFormat::Text => {
            for violation in &violations {
                println!("{violation}");
            }
            println!("{}: {errors} error(s), {warnings} warning(s)", doc.path);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&violations)
                .context("encoding violations as JSON")?;
            println!("{json}");
        }
    }

    Ok(if errors > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

#[allow(clippy::print_stdout)]
fn fix(target: Target, check: bool) -> Result<ExitCode> {
    let rules = rule_set(&target.disable)?;
    let file = cli::resolve_file(target.file);
    let path = file.display().to_string();
    let bytes = std::fs::read(&file).with_context(|| format!("reading {path}"))?;
    let report = run_fixes(&path, bytes, &rules)?;

    for (rule, outcome) in &report.outcomes {
        match outcome {
            FixOutcome::Applied if check => println!("{rule}: would fix"),
            FixOutcome::Applied => println!("{rule}: fixed"),
            FixOutcome::Clean => debug!("{rule}: nothing to fix"),
            FixOutcome::Skipped(reason) => println!("{rule}: no change made: {reason}"),
        }
    }

    if !report.changed() {
        println!("{path}: unchanged");
        return Ok(ExitCode::SUCCESS);
    }
    if check {
        println!("{path}: would be rewritten");
        return Ok(ExitCode::FAILURE);
    }
    write_file(&file, &report.content)?;
    info!("wrote {} bytes to {path}", report.content.len());
    println!("{path}: rewritten");
    Ok(ExitCode::SUCCESS)
}

fn write_file(file: &Path, content: &[u8]) -> Result<()> {
    std::fs::write(file, content).with_context(|| format!("writing {}", file.display()))
}

#[allow(clippy::print_stdout)]
fn graph(file: PathBuf, format: GraphFormat, process: Option<String>) -> Result<ExitCode> {
    let doc = parse_file(&file)?;
    let graph = match process {
        Some(name) => DependencyGraph::for_process(&doc, &name, &HashMap::new())
            .with_context(|| format!("no process named '{name}' in {}", doc.path))?,
        None => DependencyGraph::build(&doc),
    };
    print!("{}", graph.render(format)?);
    Ok(ExitCode::SUCCESS)
}

#[allow(clippy::print_stdout)]
fn list_rules() {
    for rule in Rule::ALL {
        let fix = if rule.is_fixable() { "fixable" } else { "" };
        println!(
            "{:<18} {:<5} {:<7} {}",
            rule.name(),
            rule.severity().to_string(),
            fix,
            rule.description()
        );
    }
}
