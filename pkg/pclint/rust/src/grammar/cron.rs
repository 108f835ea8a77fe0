// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Five-field cron expression validation.
//!
//! Grammar per field: `*`, an integer, a range `a-b`, a step `*/n` or
//! `a-b/n`, or a comma-separated list of those. Names (`MON`, `JAN`) and
//! macros (`@daily`) are not accepted.

use std::fmt;
use thiserror::Error;

/// One of the five positional cron fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CronField {
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
}

impl CronField {
    const ALL: [CronField; 5] = [
        CronField::Minute,
        CronField::Hour,
        CronField::DayOfMonth,
        CronField::Month,
        CronField::DayOfWeek,
    ];

    /// Inclusive bounds. Day-of-week accepts both 0 and 7 for Sunday.
    pub fn bounds(self) -> (u32, u32) {
        match self {
            CronField::Minute => (0, 59),
            CronField::Hour => (0, 23),
            CronField::DayOfMonth => (1, 31),
            CronField::Month => (1, 12),
            CronField::DayOfWeek => (0, 7),
        }
    }
}

impl fmt::Display for CronField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CronField::Minute => "minute",
            CronField::Hour => "hour",
            CronField::DayOfMonth => "day-of-month",
            CronField::Month => "month",
            CronField::DayOfWeek => "day-of-week",
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CronError {
    #[error("expected 5 fields (minute hour day-of-month month day-of-week), got {0}")]
    FieldCount(usize),

    #[error("{field}: empty list element")]
    Empty { field: CronField },

    #[error("{field}: '{token}' is not a number")]
    NotANumber { field: CronField, token: String },

    #[error("{field}: {value} is out of range {min}-{max}")]
    OutOfRange {
        field: CronField,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("{field}: range start {start} is greater than end {end}")]
    InvertedRange { field: CronField, start: u32, end: u32 },

    #[error("{field}: step must be greater than zero")]
    ZeroStep { field: CronField },

    #[error("{field}: step '{token}' is not a positive integer")]
    BadStep { field: CronField, token: String },

    #[error("{field}: step base '{token}' must be '*' or a range")]
    StepBase { field: CronField, token: String },
}

/// Validate a cron expression. The first problem found is returned.
pub fn validate_cron(expr: &str) -> Result<(), CronError> {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    if fields.len() != CronField::ALL.len() {
        return Err(CronError::FieldCount(fields.len()));
    }
    for (field, text) in CronField::ALL.into_iter().zip(fields) {
        validate_field(field, text)?;
    }
    Ok(())
}

fn validate_field(field: CronField, text: &str) -> Result<(), CronError> {
    for item in text.split(',') {
        validate_item(field, item)?;
    }
    Ok(())
}

fn validate_item(field: CronField, item: &str) -> Result<(), CronError> {
    if item.is_empty() {
        return Err(CronError::Empty { field });
    }

    if let Some((base, step)) = item.split_once('/') {
        validate_step(field, step)?;
        if base == "*" {
            return Ok(());
        }
        if !base.contains('-') {
            return Err(CronError::StepBase {
                field,
                token: base.to_string(),
            });
        }
        return validate_range(field, base);
    }

    if item == "*" {
        return Ok(());
    }
    if item.contains('-') {
        return validate_range(field, item);
    }
    validate_value(field, item).map(|_| ())
}

fn validate_step(field: CronField, step: &str) -> Result<(), CronError> {
    let bad = || CronError::BadStep {
        field,
        token: step.to_string(),
    };
    if step.is_empty() || !step.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }
    match step.parse::<u32>() {
        Ok(0) => Err(CronError::ZeroStep { field }),
        Ok(_) => Ok(()),
        Err(_) => Err(bad()),
    }
}

fn validate_range(field: CronField, range: &str) -> Result<(), CronError> {
    let (start, end) = range.split_once('-').unwrap_or((range, ""));
    let start = validate_value(field, start)?;
    let end = validate_value(field, end)?;
    if start > end {
        return Err(CronError::InvertedRange { field, start, end });
    }
    Ok(())
}

fn validate_value(field: CronField, token: &str) -> Result<u32, CronError> {
    let not_a_number = || CronError::NotANumber {
        field,
        token: token.to_string(),
    };
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(not_a_number());
    }
    let (min, max) = field.bounds();
    // Digits only, so a parse failure means the value overflowed u32.
    let value = token.parse::<u32>().unwrap_or(u32::MAX);
    if value < min || value > max {
        return Err(CronError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(value)
}
