// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Duration strings such as `1h30m45s` or `1.5s`.
//!
//! One or more `<number><unit>` pairs with no separators. A single leading
//! `-` or `+` is accepted.

use nom::{
    IResult, Parser,
    bytes::complete::take_while1,
    character::complete::{char, digit1},
    combinator::{opt, recognize},
    sequence::pair,
};
use thiserror::Error;

/// Units from nanoseconds up to hours. Day and week units are not supported
/// by the runtime.
pub const UNITS: &[&str] = &["ns", "us", "µs", "μs", "ms", "s", "m", "h"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurationError {
    #[error("duration is empty")]
    Empty,

    #[error("duration must not contain whitespace")]
    Whitespace,

    #[error("'{number}' is missing a unit (one of {})", UNITS.join(", "))]
    MissingUnit { number: String },

    #[error("unit '{unit}' is missing a number")]
    MissingNumber { unit: String },

    #[error("unsupported unit '{unit}' (expected one of {})", UNITS.join(", "))]
    UnsupportedUnit { unit: String },

    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
}

fn number(input: &str) -> IResult<&str, &str> {
    recognize(pair(digit1, opt(pair(char('.'), digit1)))).parse(input)
}

fn unit(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphabetic()).parse(input)
}

/// Validate a duration string.
pub fn validate_duration(input: &str) -> Result<(), DurationError> {
    if input.is_empty() {
        return Err(DurationError::Empty);
    }
    if input.chars().any(char::is_whitespace) {
        return Err(DurationError::Whitespace);
    }

    let mut rest = input
        .strip_prefix('-')
        .or_else(|| input.strip_prefix('+'))
        .unwrap_or(input);
    if rest.is_empty() {
        return Err(DurationError::Empty);
    }

    while !rest.is_empty() {
        let (after_number, value) = match number(rest) {
            Ok(parsed) => parsed,
            Err(_) => {
                return Err(match unit(rest) {
                    Ok((_, word)) => DurationError::MissingNumber {
                        unit: word.to_string(),
                    },
                    Err(_) => unexpected(rest),
                });
            }
        };
        let (after_unit, word) = match unit(after_number) {
            Ok(parsed) => parsed,
            Err(_) if after_number.is_empty() => {
                return Err(DurationError::MissingUnit {
                    number: value.to_string(),
                });
            }
            Err(_) => return Err(unexpected(after_number)),
        };
        if !UNITS.contains(&word) {
            return Err(DurationError::UnsupportedUnit {
                unit: word.to_string(),
            });
        }
        rest = after_unit;
    }
    Ok(())
}

fn unexpected(rest: &str) -> DurationError {
    // Callers only pass non-empty input.
    DurationError::UnexpectedCharacter(rest.chars().next().unwrap_or('?'))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_durations() {
        for input in [
            "1h", "1h30m", "1h30m45s", "30s", "500ms", "250us", "2µs", "2μs", "100ns", "1.5h",
            "0.25s", "10m0s", "0s",
        ] {
            assert_eq!(validate_duration(input), Ok(()), "expected {input:?} to be valid");
        }
    }

    #[test]
    fn test_every_unit_accepted() {
        for unit in UNITS {
            assert_eq!(validate_duration(&format!("3{unit}")), Ok(()), "unit {unit}");
        }
    }

    #[test]
    fn test_rejected_durations() {
        assert_eq!(validate_duration(""), Err(DurationError::Empty));
        assert_eq!(
            validate_duration("30"),
            Err(DurationError::MissingUnit {
                number: "30".to_string()
            })
        );
        assert_eq!(
            validate_duration("1d"),
            Err(DurationError::UnsupportedUnit {
                unit: "d".to_string()
            })
        );
        assert_eq!(
            validate_duration("2w"),
            Err(DurationError::UnsupportedUnit {
                unit: "w".to_string()
            })
        );
        assert_eq!(
            validate_duration("1h2d"),
            Err(DurationError::UnsupportedUnit {
                unit: "d".to_string()
            })
        );
        assert_eq!(
            validate_duration("h"),
            Err(DurationError::MissingNumber {
                unit: "h".to_string()
            })
        );
        assert_eq!(validate_duration("1h 30m"), Err(DurationError::Whitespace));
        assert_eq!(validate_duration(" 1h"), Err(DurationError::Whitespace));
        assert_eq!(
            validate_duration("1.h"),
            Err(DurationError::UnexpectedCharacter('.'))
        );
        assert_eq!(
            validate_duration("1h30"),
            Err(DurationError::MissingUnit {
                number: "30".to_string()
            })
        );
        assert_eq!(
            validate_duration("1mo"),
            Err(DurationError::UnsupportedUnit {
                unit: "mo".to_string()
            })
        );
    }

    #[test]
    fn test_leading_sign_is_tolerated() {
        assert_eq!(validate_duration("-5m"), Ok(()));
        assert_eq!(validate_duration("+5m"), Ok(()));
        assert_eq!(validate_duration("-"), Err(DurationError::Empty));
        assert_eq!(
            validate_duration("--5m"),
            Err(DurationError::UnexpectedCharacter('-'))
        );
    }
}
