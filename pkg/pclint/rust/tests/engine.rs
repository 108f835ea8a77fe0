// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use dd_pclint::grammar::{validate_cron, validate_duration};
use dd_pclint::rules::FixOutcome;
use dd_pclint::{
    DependencyGraph, GraphFormat, RuleSet, Severity, Violation, parse, run_checks, run_fixes,
};

fn lint(yaml: &str) -> Vec<Violation> {
    let doc = parse("pc.yaml", yaml).unwrap();
    run_checks(&doc, &RuleSet::default())
}

fn of_rule<'a>(violations: &'a [Violation], rule: &str) -> Vec<&'a Violation> {
    violations.iter().filter(|v| v.rule == rule).collect()
}

#[test]
fn test_cron_grammar() {
    for expr in [
        "* * * * *",
        "0 0 1 1 0",
        "59 23 31 12 7",
        "*/5 0-23/2 1,15 1-12 1-5",
        "0,30 9-17 * * 1-5",
    ] {
        assert_eq!(validate_cron(expr), Ok(()), "{expr}");
    }
    for expr in ["", "* * * *", "* * * * * *", "0 0 0 0 0 0 0"] {
        assert!(validate_cron(expr).is_err(), "{expr}");
    }
}

#[test]
fn test_duration_grammar() {
    assert!(validate_duration("1h30m").is_ok());
    assert!(validate_duration("1d").is_err());
    assert!(validate_duration("30").is_err());
    assert!(validate_duration("").is_err());
}

#[test]
fn test_both_cron_and_interval_is_one_error() {
    let violations = lint(
        r#"
version: "0.5"
processes:
  job:
    command: task job:run
    schedule:
      cron: "61 * * * *"
      interval: 5x
"#,
    );
    let schedule = of_rule(&violations, "schedule-config");
    assert_eq!(schedule.len(), 1);
    assert_eq!(schedule[0].severity, Severity::Error);
}

#[test]
fn test_backup_minute_out_of_range() {
    let violations = lint(
        r#"
processes:
  backup:
    command: task backup:run
    schedule:
      cron: "60 * * * *"
"#,
    );
    let schedule = of_rule(&violations, "schedule-config");
    assert!(!schedule.is_empty());
    assert!(schedule.iter().all(|v| v.severity == Severity::Error));
}

#[test]
fn test_literal_secret_and_missing_env_file() {
    let secret_only = r#"
version: "0.5"
processes:
  api:
    command: task api:run
    environment:
      - "API_TOKEN=abc123"
"#;
    let violations = lint(secret_only);
    let env = of_rule(&violations, "env-substitution");
    assert_eq!(env.len(), 1);
    assert_eq!(env[0].severity, Severity::Warn);
    assert!(of_rule(&violations, "env-file").is_empty());

    let with_substitution = format!("{secret_only}      - \"OTHER=${{OTHER}}\"\n");
    let violations = lint(&with_substitution);
    assert_eq!(of_rule(&violations, "env-substitution").len(), 1);
    let env_file = of_rule(&violations, "env-file");
    assert_eq!(env_file.len(), 1);
    assert_eq!(env_file[0].severity, Severity::Error);
}

#[test]
fn test_version_fix_is_idempotent() {
    let input = "processes:\n  a:\n    command: task a:run\n";
    let rules = RuleSet::default().without(&["sort-processes"]).unwrap();
    let first = run_fixes("pc.yaml", input, &rules).unwrap();
    assert_eq!(first.outcomes, vec![("version", FixOutcome::Applied)]);
    assert!(!parse("pc.yaml", first.content.clone()).unwrap().version.is_empty());

    let second = run_fixes("pc.yaml", first.content.clone(), &rules).unwrap();
    assert_eq!(second.outcomes, vec![("version", FixOutcome::Clean)]);
    assert_eq!(second.content, first.content);
}

const CHAIN: &str = r#"
processes:
  a:
    depends_on:
      b:
  b:
    depends_on:
      c:
  c:
    depends_on:
      d:
  d:
    depends_on:
      e:
  e: {}
"#;

fn indent(line: &str) -> usize {
    line.chars().take_while(|c| !c.is_ascii_alphanumeric()).count()
}

#[test]
fn test_chain_renders_with_increasing_indent() {
    let doc = parse("pc.yaml", CHAIN).unwrap();
    let out = DependencyGraph::build(&doc)
        .render(GraphFormat::Ascii)
        .unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 5, "{out}");
    for pair in lines.windows(2) {
        assert!(indent(pair[0]) < indent(pair[1]), "{out}");
    }
    let names: Vec<&str> = lines
        .iter()
        .map(|l| l.trim_start_matches(|c: char| !c.is_ascii_alphanumeric()))
        .map(|l| l.split(' ').next().unwrap())
        .collect();
    assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
}

#[test]
fn test_chain_with_cycle_terminates() {
    let cyclic = CHAIN.replace("  e: {}\n", "  e:\n    depends_on:\n      a:\n");
    let doc = parse("pc.yaml", cyclic).unwrap();
    let out = DependencyGraph::build(&doc)
        .render(GraphFormat::Ascii)
        .unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 6, "{out}");
    assert!(lines[5].ends_with("a (process_started) (cycle)"));

    let mermaid = DependencyGraph::build(&doc)
        .render(GraphFormat::Mermaid)
        .unwrap();
    assert!(mermaid.contains("    e --> a\n"));
}

#[test]
fn test_every_rule_runs_to_completion() {
    let violations = lint(
        r#"
processes:
  z:
    command: run-z
  a:
    command: run-a
    schedule:
      interval: 1w
"#,
    );
    let rules: Vec<&str> = violations.iter().map(|v| v.rule).collect();
    assert_eq!(
        rules,
        vec![
            "task-command",
            "task-command",
            "shutdown-config",
            "shutdown-config",
            "restart-policy",
            "restart-policy",
            "readiness-probe",
            "readiness-probe",
            "schedule-config",
            "version",
            "sort-processes",
        ]
    );
}
