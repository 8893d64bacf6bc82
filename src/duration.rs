//! Compound duration literals
//!
//! This module parses the compound time-magnitude grammar used by
//! duration-kinded options: a sequence of `<decimal magnitude><unit>`
//! terms such as `5h`, `300ms`, or `5h30m`, summed into one elapsed-time
//! value. Fractional magnitudes are accepted (`1.5h`), as is the literal
//! `0` with no unit. Recognized units:
//!
//! | unit        | meaning      |
//! |-------------|--------------|
//! | `ns`        | nanosecond   |
//! | `us` / `µs` | microsecond  |
//! | `ms`        | millisecond  |
//! | `s`         | second       |
//! | `m`         | minute       |
//! | `h`         | hour         |
//!
//! The result is a [`std::time::Duration`], which is unsigned; a leading
//! `-` is therefore rejected outright rather than wrapped or saturated. A
//! leading `+` is permitted and ignored.
//!
//! Accumulation is carried out in 128-bit nanoseconds, so the only
//! overflow that can be reported is one that the final `Duration` itself
//! could not represent.

use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

use lazy_static::lazy_static;

lazy_static! {
    /// Nanosecond multiplier per recognized unit suffix.
    static ref UNITS: HashMap<&'static str, u64> = {
        let mut table = HashMap::new();
        table.insert("ns", 1u64);
        table.insert("us", 1_000);
        table.insert("µs", 1_000);
        table.insert("ms", 1_000_000);
        table.insert("s", 1_000_000_000);
        table.insert("m", 60 * 1_000_000_000);
        table.insert("h", 3_600 * 1_000_000_000);
        table
    };
}

/// Enumeration over the failure modes of [`parse_duration`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DurationError {
    /// The input was empty (or consisted only of a sign).
    Empty,
    /// The input carried a leading `-`; elapsed time cannot be negative.
    Negative,
    /// A term began with something other than a decimal magnitude.
    MissingMagnitude {
        /// Unparsed remainder at the point of failure
        rest: String,
    },
    /// A magnitude was not followed by any unit suffix.
    MissingUnit {
        /// The full input, for context
        literal: String,
    },
    /// A unit suffix was present but not one of the recognized units.
    UnknownUnit {
        /// The offending suffix
        unit: String,
    },
    /// The summed terms exceed the representable range.
    Overflow,
}

impl Display for DurationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DurationError::Empty => write!(f, "empty duration literal"),
            DurationError::Negative => write!(f, "negative duration literal"),
            DurationError::MissingMagnitude { rest } => {
                write!(f, "expected decimal magnitude at {:?}", rest)
            }
            DurationError::MissingUnit { literal } => {
                write!(f, "missing unit in duration {:?}", literal)
            }
            DurationError::UnknownUnit { unit } => {
                write!(f, "unknown unit {:?} in duration", unit)
            }
            DurationError::Overflow => write!(f, "duration out of representable range"),
        }
    }
}

impl Error for DurationError {}

/// Counts the leading ASCII digits of `s`.
#[inline]
#[must_use]
fn digit_run(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}

/// Parses a compound duration literal into an elapsed-time value.
///
/// # Errors
///
/// Returns the [`DurationError`] case describing the first malformed
/// magnitude, missing or unknown unit, sign violation, or overflow.
///
/// # Examples
///
/// ```
/// # use taglia::duration::parse_duration;
/// use std::time::Duration;
/// assert_eq!(parse_duration("5h30m").unwrap(), Duration::from_secs(5 * 3600 + 30 * 60));
/// assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
/// assert!(parse_duration("5 hours").is_err());
/// ```
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    if input.is_empty() {
        return Err(DurationError::Empty);
    }
    if input.starts_with('-') {
        return Err(DurationError::Negative);
    }
    let mut rest = input.strip_prefix('+').unwrap_or(input);
    if rest.is_empty() {
        return Err(DurationError::Empty);
    }
    if rest == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        // <integer part> [ '.' <fraction> ]
        let int_len = digit_run(rest);
        let mut consumed = int_len;
        let mut frac = "";
        if rest[consumed..].starts_with('.') {
            let frac_len = digit_run(&rest[consumed + 1..]);
            frac = &rest[consumed + 1..consumed + 1 + frac_len];
            consumed += 1 + frac_len;
        }
        if int_len == 0 && frac.is_empty() {
            return Err(DurationError::MissingMagnitude {
                rest: rest.to_string(),
            });
        }
        let int_part: u128 = if int_len == 0 {
            0
        } else {
            rest[..int_len].parse().map_err(|_| DurationError::Overflow)?
        };
        rest = &rest[consumed..];

        // unit suffix: everything up to the next magnitude
        let unit_len = rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() || *c == '.')
            .map(|(at, _)| at)
            .unwrap_or(rest.len());
        if unit_len == 0 {
            return Err(DurationError::MissingUnit {
                literal: input.to_string(),
            });
        }
        let unit = &rest[..unit_len];
        let scale = *UNITS.get(unit).ok_or_else(|| DurationError::UnknownUnit {
            unit: unit.to_string(),
        })? as u128;
        rest = &rest[unit_len..];

        total = int_part
            .checked_mul(scale)
            .and_then(|nanos| total.checked_add(nanos))
            .ok_or(DurationError::Overflow)?;
        if !frac.is_empty() {
            let mut value: u128 = 0;
            let mut divisor: u128 = 1;
            for digit in frac.bytes() {
                if divisor >= 1_000_000_000_000_000_000 {
                    // remaining digits are beyond nanosecond precision
                    break;
                }
                value = value * 10 + u128::from(digit - b'0');
                divisor *= 10;
            }
            total = total
                .checked_add(value * scale / divisor)
                .ok_or(DurationError::Overflow)?;
        }
    }

    let secs = total / 1_000_000_000;
    if secs > u128::from(u64::MAX) {
        return Err(DurationError::Overflow);
    }
    Ok(Duration::new(secs as u64, (total % 1_000_000_000) as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_terms() {
        let cases: &[(&str, Duration)] = &[
            ("0", Duration::ZERO),
            ("5h", Duration::from_secs(5 * 3600)),
            ("30m", Duration::from_secs(30 * 60)),
            ("10s", Duration::from_secs(10)),
            ("300ms", Duration::from_millis(300)),
            ("250us", Duration::from_micros(250)),
            ("250µs", Duration::from_micros(250)),
            ("7ns", Duration::from_nanos(7)),
        ];
        for (literal, expected) in cases {
            assert_eq!(parse_duration(literal).unwrap(), *expected, "literal {:?}", literal);
        }
    }

    #[test]
    fn compound_terms_sum() {
        assert_eq!(
            parse_duration("5h30m").unwrap(),
            Duration::from_secs(5 * 3600 + 30 * 60)
        );
        assert_eq!(
            parse_duration("2h45m30s").unwrap(),
            Duration::from_secs(2 * 3600 + 45 * 60 + 30)
        );
    }

    #[test]
    fn fractional_magnitudes() {
        assert_eq!(parse_duration("1.5h").unwrap(), Duration::from_secs(90 * 60));
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration(".5s").unwrap(), Duration::from_millis(500));
    }

    #[test]
    fn leading_plus_is_ignored() {
        assert_eq!(parse_duration("+5h").unwrap(), Duration::from_secs(5 * 3600));
    }

    #[test]
    fn malformed_literals() {
        assert_eq!(parse_duration(""), Err(DurationError::Empty));
        assert_eq!(parse_duration("-1h"), Err(DurationError::Negative));
        assert_eq!(
            parse_duration("100"),
            Err(DurationError::MissingUnit {
                literal: "100".to_string()
            })
        );
        assert_eq!(
            parse_duration("5parsec"),
            Err(DurationError::UnknownUnit {
                unit: "parsec".to_string()
            })
        );
        assert!(matches!(
            parse_duration("h5"),
            Err(DurationError::MissingMagnitude { .. })
        ));
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(
            parse_duration("999999999999999999999999h"),
            Err(DurationError::Overflow)
        );
    }
}
