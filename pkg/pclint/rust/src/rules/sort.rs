// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Alphabetical order of the `processes` mapping.
//!
//! The fix works on raw lines so comments and formatting survive: each entry
//! is cut out together with the comment lines directly above it (at the
//! key's own indentation), the pieces are reordered, and everything outside
//! the mapping is left untouched. Only block-style mappings with one key per
//! line are rewritten.

use super::Rule;
use crate::document::Document;
use crate::errors::FixError;
use crate::violation::Violation;
use std::ops::Range;

pub(super) fn check(doc: &Document) -> Vec<Violation> {
    let Some((before, after)) = first_inversion(doc.process_order()) else {
        return Vec::new();
    };
    vec![Rule::SortProcesses.violation(
        doc,
        doc.position_of(after, &[]),
        format!("'{after}' should come before '{before}'"),
    )]
}

fn first_inversion(order: &[String]) -> Option<(&String, &String)> {
    order.windows(2).find_map(|pair| match pair {
        [before, after] if before > after => Some((before, after)),
        _ => None,
    })
}

/// One process entry: its name and the line range it occupies.
struct Entry<'a> {
    name: &'a str,
    start: usize,
    end: usize,
}

pub(super) fn fix(doc: &Document) -> Result<Vec<u8>, FixError> {
    if first_inversion(doc.process_order()).is_none() {
        return Ok(doc.raw_content.clone());
    }

    let crlf = doc.line_index.first().is_some_and(|l| l.ends_with('\r'));
    let lines: Vec<&str> = doc
        .line_index
        .iter()
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();

    let header = header_line(doc, &lines)?;
    let keys = key_lines(doc, &lines, header)?;
    let mut entries = entries(&lines, header, &keys);

    let region_start = entries.first().map_or(header + 1, |e| e.start);
    let region_end = entries.last().map_or(header + 1, |e| e.end);
    let separator = entries
        .first()
        .map_or(0, |e| trailing_blanks(span(&lines, e.start..e.end)));

    entries.sort_by(|a, b| a.name.cmp(b.name));

    let mut out: Vec<&str> = span(&lines, 0..region_start).to_vec();
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            out.extend(std::iter::repeat_n("", separator));
        }
        let block = span(&lines, entry.start..entry.end);
        out.extend_from_slice(span(block, 0..block.len() - trailing_blanks(block)));
    }
    out.extend_from_slice(span(&lines, region_end..lines.len()));

    let eol = if crlf { "\r\n" } else { "\n" };
    Ok(out.join(eol).into_bytes())
}

/// Index of the `processes:` line. The mapping must start on the next line.
fn header_line(doc: &Document, lines: &[&str]) -> Result<usize, FixError> {
    let position = doc.position_of_key("processes");
    let line = position
        .line
        .checked_sub(1)
        .and_then(|idx| lines.get(idx).map(|l| (idx, *l)));
    let Some((idx, line)) = line else {
        return Err(unsafe_fix("processes key not found in source"));
    };
    let key_and_rest: String = line.chars().skip(position.column.saturating_sub(1)).collect();
    let rest = key_and_rest
        .split_once(':')
        .map(|(_, rest)| rest.trim())
        .ok_or_else(|| unsafe_fix("processes key line has no ':'"))?;
    if !rest.is_empty() && !rest.starts_with('#') {
        return Err(unsafe_fix("processes is not a block-style mapping"));
    }
    Ok(idx)
}

/// Line index of every process key, in declaration order. Keys must share
/// one column and each start its own line.
fn key_lines<'a>(
    doc: &'a Document,
    lines: &[&str],
    header: usize,
) -> Result<Vec<(&'a str, usize)>, FixError> {
    let mut keys = Vec::new();
    let mut column = None;
    let mut previous = header;
    for name in doc.process_order() {
        let position = doc
            .source_map
            .get(&["processes", name])
            .ok_or_else(|| unsafe_fix(format!("no source position for '{name}'")))?;
        let idx = position.line.saturating_sub(1);
        if idx <= previous {
            return Err(unsafe_fix(format!("'{name}' shares a line with another entry")));
        }
        if *column.get_or_insert(position.column) != position.column {
            return Err(unsafe_fix(format!("'{name}' is not aligned with the other entries")));
        }
        let line = lines.get(idx).copied().unwrap_or_default();
        if indent(line) + 1 != position.column {
            return Err(unsafe_fix(format!("'{name}' does not start its line")));
        }
        keys.push((name.as_str(), idx));
        previous = idx;
    }
    Ok(keys)
}

/// Split the mapping into entries. An entry starts at the comment lines
/// directly above its key and runs to the start of the next entry. Only
/// comments at the key's indentation belong to it: deeper ones are part of
/// the previous entry, possibly inside a block scalar. The last entry ends at
/// the first line indented less than the keys (or a non-comment at the same
/// indent), with trailing blank lines left outside.
fn entries<'a>(lines: &[&str], header: usize, keys: &[(&'a str, usize)]) -> Vec<Entry<'a>> {
    let starts: Vec<usize> = keys
        .iter()
        .map(|&(_, key)| {
            let key_indent = indent(line_at(lines, key));
            let mut start = key;
            while start > header + 1 {
                let above = line_at(lines, start - 1);
                if !is_comment(above) || indent(above) != key_indent {
                    break;
                }
                start -= 1;
            }
            start
        })
        .collect();

    let mut entries = Vec::with_capacity(keys.len());
    for (i, (&(name, key), &start)) in keys.iter().zip(&starts).enumerate() {
        let end = match starts.get(i + 1) {
            Some(next) => *next,
            None => last_entry_end(lines, key),
        };
        entries.push(Entry { name, start, end });
    }
    entries
}

fn last_entry_end(lines: &[&str], key: usize) -> usize {
    let key_indent = indent(line_at(lines, key));
    let mut end = lines.len();
    for (idx, line) in lines.iter().enumerate().skip(key + 1) {
        if line.trim().is_empty() {
            continue;
        }
        let line_indent = indent(line);
        if line_indent < key_indent || (line_indent == key_indent && !is_comment(line)) {
            end = idx;
            break;
        }
    }
    end - trailing_blanks(span(lines, key..end))
}

fn line_at<'s>(lines: &[&'s str], idx: usize) -> &'s str {
    lines.get(idx).copied().unwrap_or_default()
}

/// Lines in `range`; empty when out of bounds.
fn span<'l, 's>(lines: &'l [&'s str], range: Range<usize>) -> &'l [&'s str] {
    lines.get(range).unwrap_or_default()
}

fn indent(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

fn trailing_blanks(block: &[&str]) -> usize {
    block.iter().rev().take_while(|l| l.trim().is_empty()).count()
}

fn unsafe_fix(reason: impl Into<String>) -> FixError {
    FixError::unsafe_fix(Rule::SortProcesses.name(), reason)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::test_utils::{doc, testdata_path};

    fn fixed(yaml: &str) -> String {
        String::from_utf8(fix(&doc(yaml)).unwrap()).unwrap()
    }

    #[test]
    fn test_check_reports_first_inversion() {
        let d = doc("processes:\n  api: {}\n  web: {}\n  db: {}\n  cache: {}\n");
        let violations = check(&d);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].message, "'db' should come before 'web'");
        assert_eq!((violations[0].line, violations[0].column), (4, 3));

        assert!(check(&doc("processes:\n  a: {}\n  b: {}\n")).is_empty());
    }

    #[test]
    fn test_fix_unsorted_fixture() {
        let input = std::fs::read_to_string(testdata_path().join("unsorted.yaml")).unwrap();
        let expected = "\
version: \"0.5\"

processes:
  api:
    command: task api:run

  # Primary database.
  db:
    command: task db:run
    disabled: true

  # Web frontend.
  web:
    command: task web:run

# trailing notes stay put
";
        assert_eq!(fixed(&input), expected);
    }

    #[test]
    fn test_fix_keeps_following_sections() {
        let input = "\
processes:
  b:
    command: task b:run
  a:
    command: |
      task a:run

    environment:
      - X=1
# unrelated
extra: true
";
        let expected = "\
processes:
  a:
    command: |
      task a:run

    environment:
      - X=1
  b:
    command: task b:run
# unrelated
extra: true
";
        assert_eq!(fixed(input), expected);
    }

    #[test]
    fn test_fix_leaves_block_scalar_comments_in_place() {
        let input = "\
processes:
  z:
    command: |
      echo hi
      # literal text
  # Alpha process.
  a:
    command: task a:run
";
        let expected = "\
processes:
  # Alpha process.
  a:
    command: task a:run
  z:
    command: |
      echo hi
      # literal text
";
        let out = fixed(input);
        assert_eq!(out, expected);
        let d = doc(&out);
        assert_eq!(d.process("z").unwrap().command, "echo hi\n# literal text\n");
    }

    #[test]
    fn test_fix_crlf() {
        let input = "processes:\r\n  b: {}\r\n  a: {}\r\n";
        assert_eq!(fixed(input), "processes:\r\n  a: {}\r\n  b: {}\r\n");
    }

    #[test]
    fn test_sorted_is_unchanged() {
        let input = "processes:\n  a: {}\n\n  b: {}\n";
        assert_eq!(fixed(input), input);
    }

    #[test]
    fn test_flow_style_is_unsafe() {
        let err = fix(&doc("processes: {b: {}, a: {}}\n")).unwrap_err();
        assert!(matches!(
            err,
            FixError::Unsafe {
                rule: "sort-processes",
                ..
            }
        ));

        let err = fix(&doc("processes:\n  {b: {}, a: {}}\n")).unwrap_err();
        assert!(matches!(err, FixError::Unsafe { .. }));
    }
}
