// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Micro-grammars used by the schedule rule.

pub mod cron;
pub mod duration;

pub use cron::{CronError, CronField, validate_cron};
pub use duration::{DurationError, validate_duration};
