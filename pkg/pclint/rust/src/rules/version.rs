// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use super::Rule;
use crate::document::Document;
use crate::errors::FixError;
use crate::violation::Violation;

/// Version written by the fix.
const DEFAULT_VERSION: &str = "0.5";

const EMPTY_VALUES: &[&str] = &["", "\"\"", "''", "~", "null", "Null", "NULL"];

pub(super) fn check(doc: &Document) -> Vec<Violation> {
    if !doc.version.is_empty() {
        return Vec::new();
    }
    let position = doc.position_of_key("version");
    let message = if position.line > 0 {
        "version is empty"
    } else {
        "document declares no version"
    };
    vec![Rule::Version.violation(doc, position, message)]
}

pub(super) fn fix(doc: &Document) -> Result<Vec<u8>, FixError> {
    if !doc.version.is_empty() {
        return Ok(doc.raw_content.clone());
    }
    let mut lines: Vec<String> = doc.line_index.clone();
    let eol = if lines.first().is_some_and(|l| l.ends_with('\r')) {
        "\r"
    } else {
        ""
    };

    let position = doc.position_of_key("version");
    if position.line > 0 {
        let idx = position.line - 1;
        let line = lines
            .get_mut(idx)
            .ok_or_else(|| unsafe_fix("version key is outside the document"))?;
        *line = replace_empty_value(line, eol)?;
    } else {
        let (idx, indent) = insertion_point(&lines)?;
        lines.insert(idx, format!("{indent}version: \"{DEFAULT_VERSION}\"{eol}"));
    }
    Ok(lines.join("\n").into_bytes())
}

/// Rewrite `version: <empty> [# comment]`, keeping the key and comment.
fn replace_empty_value(line: &str, eol: &str) -> Result<String, FixError> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let (key, rest) = line
        .split_once(':')
        .ok_or_else(|| unsafe_fix("version key line has no ':'"))?;
    let (value, comment) = match rest.find(" #") {
        Some(at) => rest.split_at(at),
        None if rest.trim_start().starts_with('#') => ("", rest),
        None => (rest, ""),
    };
    if !EMPTY_VALUES.contains(&value.trim()) {
        return Err(unsafe_fix(format!(
            "cannot rewrite version value '{}'",
            value.trim()
        )));
    }
    let comment = comment.trim_start();
    let comment = if comment.is_empty() {
        String::new()
    } else {
        format!(" {comment}")
    };
    Ok(format!("{key}: \"{DEFAULT_VERSION}\"{comment}{eol}"))
}

/// Line index before the first content line, after any directives, a
/// leading `---`, comments and blank lines. Also returns the indentation of
/// that content line.
fn insertion_point(lines: &[String]) -> Result<(usize, String), FixError> {
    for (idx, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('%') {
            continue;
        }
        if trimmed == "---" {
            continue;
        }
        if trimmed.starts_with("---") || trimmed.starts_with('{') {
            return Err(unsafe_fix("top-level mapping is not in block style"));
        }
        let indent: String = line.chars().take_while(|c| c.is_whitespace()).collect();
        return Ok((idx, indent));
    }
    // No content at all: append, keeping a trailing newline.
    let idx = match lines.last() {
        Some(last) if last.trim().is_empty() => lines.len() - 1,
        _ => lines.len(),
    };
    Ok((idx, String::new()))
}

fn unsafe_fix(reason: impl Into<String>) -> FixError {
    FixError::unsafe_fix(Rule::Version.name(), reason)
}
