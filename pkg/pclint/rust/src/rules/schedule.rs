// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Schedule blocks: exactly one of `cron`/`interval`, each well formed.

use super::Rule;
use crate::document::{Document, Process, Schedule};
use crate::grammar::{validate_cron, validate_duration};
use crate::violation::Violation;

pub(super) fn check(doc: &Document) -> Vec<Violation> {
    doc.processes()
        .filter_map(|p| p.schedule.as_ref().map(|s| (p, s)))
        .flat_map(|(p, s)| check_schedule(doc, p, s))
        .collect()
}

fn check_schedule(doc: &Document, process: &Process, schedule: &Schedule) -> Vec<Violation> {
    let rule = Rule::ScheduleConfig;
    let name = &process.name;
    let mut violations = Vec::new();

    match (schedule.cron(), schedule.interval()) {
        (Some(_), Some(_)) => violations.push(rule.violation(
            doc,
            doc.position_of(name, &["schedule"]),
            format!("process '{name}': schedule sets both cron and interval; keep exactly one"),
        )),
        (None, None) => violations.push(rule.violation(
            doc,
            doc.position_of(name, &["schedule"]),
            format!("process '{name}': schedule sets neither cron nor interval"),
        )),
        (Some(cron), None) => {
            if let Err(e) = validate_cron(cron) {
                violations.push(rule.violation(
                    doc,
                    doc.position_of(name, &["schedule", "cron"]),
                    format!("process '{name}': invalid cron '{cron}': {e}"),
                ));
            }
        }
        (None, Some(interval)) => {
            if let Err(e) = validate_duration(interval) {
                violations.push(rule.violation(
                    doc,
                    doc.position_of(name, &["schedule", "interval"]),
                    format!("process '{name}': invalid interval '{interval}': {e}"),
                ));
            }
        }
    }

    if let Some(max) = schedule.max_concurrent.filter(|m| *m < 1) {
        violations.push(rule.violation(
            doc,
            doc.position_of(name, &["schedule", "max_concurrent"]),
            format!("process '{name}': max_concurrent must be at least 1, got {max}"),
        ));
    }

    violations
}
