//! Poll intervals in Go `time.ParseDuration` syntax (`"30s"`, `"1m30s"`, `"1.5m"`).
//!
//! An optional leading sign applies to the whole value; every component is a
//! decimal number followed by a unit. Arithmetic is done in integer
//! nanoseconds and fails with [`ParseError::Overflow`] rather than wrapping.

use std::str::FromStr;
use std::time::Duration;

/// Fraction digits beyond this are below nanosecond precision for every unit.
const MAX_FRACTION_DIGITS: usize = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoDuration {
    magnitude: Duration,
    negative: bool,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    #[error("empty duration")]
    Empty,

    #[error("expected a number at {0:?}")]
    InvalidNumber(String),

    #[error("missing unit, expected one of ns, us, ms, s, m, h")]
    MissingUnit,

    #[error("unknown unit {0:?}, expected one of ns, us, ms, s, m, h")]
    UnknownUnit(String),

    #[error("duration out of range")]
    Overflow,
}

impl GoDuration {
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Absolute value; check [`is_negative`](Self::is_negative) separately.
    pub fn as_duration(&self) -> Duration {
        self.magnitude
    }
}

impl FromStr for GoDuration {
    type Err = ParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut rest = input.trim();
        if rest.is_empty() {
            return Err(ParseError::Empty);
        }

        let negative = rest.starts_with('-');
        if let Some(unsigned) = rest.strip_prefix(['-', '+']) {
            rest = unsigned;
        }

        if rest == "0" {
            return Ok(Self { magnitude: Duration::ZERO, negative });
        }
        if rest.is_empty() {
            return Err(ParseError::InvalidNumber(input.trim().to_string()));
        }

        let mut total: u128 = 0;
        while !rest.is_empty() {
            let (whole, after) = split_digits(rest);
            let (fraction, after) = match after.strip_prefix('.') {
                Some(after) => split_digits(after),
                None => ("", after),
            };
            if whole.is_empty() && fraction.is_empty() {
                return Err(ParseError::InvalidNumber(rest.to_string()));
            }

            let unit_len = after.find(|c: char| !c.is_alphabetic()).unwrap_or(after.len());
            let (unit, after) = after.split_at(unit_len);
            if unit.is_empty() {
                return Err(ParseError::MissingUnit);
            }
            let unit = unit_nanos(unit).ok_or_else(|| ParseError::UnknownUnit(unit.to_string()))?;

            total = total.checked_add(component_nanos(whole, fraction, unit)?).ok_or(ParseError::Overflow)?;
            rest = after;
        }

        let nanos = u64::try_from(total).map_err(|_| ParseError::Overflow)?;
        Ok(Self { magnitude: Duration::from_nanos(nanos), negative })
    }
}

fn split_digits(s: &str) -> (&str, &str) {
    s.split_at(s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len()))
}

fn unit_nanos(unit: &str) -> Option<u128> {
    Some(match unit {
        "ns" => 1,
        // micro sign U+00B5 and Greek mu U+03BC are both accepted
        "us" | "\u{00b5}s" | "\u{03bc}s" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60 * 1_000_000_000,
        "h" => 3_600 * 1_000_000_000,
        _ => return None,
    })
}

/// `whole.fraction` units in nanoseconds. Both strings are ASCII digits only.
fn component_nanos(whole: &str, fraction: &str, unit: u128) -> Result<u128, ParseError> {
    let mut nanos = if whole.is_empty() {
        0
    } else {
        let value = whole.parse::<u128>().map_err(|_| ParseError::Overflow)?;
        value.checked_mul(unit).ok_or(ParseError::Overflow)?
    };

    let fraction = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
    if !fraction.is_empty() {
        let digits = fraction.parse::<u128>().map_err(|_| ParseError::Overflow)?;
        let scale = 10_u128.pow(fraction.len() as u32);
        nanos = nanos.checked_add(digits * unit / scale).ok_or(ParseError::Overflow)?;
    }

    Ok(nanos)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Duration {
        s.parse::<GoDuration>().unwrap().as_duration()
    }

    #[test]
    fn test_common_intervals() {
        assert_eq!(parse("30s"), Duration::from_secs(30));
        assert_eq!(parse("5s"), Duration::from_secs(5));
        assert_eq!(parse("1m30s"), Duration::from_secs(90));
        assert_eq!(parse("1.5m"), Duration::from_secs(90));
        assert_eq!(parse(".5s"), Duration::from_millis(500));
        assert_eq!(parse("2h"), Duration::from_secs(7200));
        assert_eq!(parse("500ms"), Duration::from_millis(500));
        assert_eq!(parse("1500\u{00b5}s"), Duration::from_micros(1500));
        assert_eq!(parse("0"), Duration::ZERO);
        assert_eq!(parse(" 10s "), Duration::from_secs(10));
    }

    #[test]
    fn test_sign_applies_to_whole_value() {
        let d = "-5s".parse::<GoDuration>().unwrap();
        assert!(d.is_negative());
        assert_eq!(d.as_duration(), Duration::from_secs(5));
        assert!(!"+1m5s".parse::<GoDuration>().unwrap().is_negative());
    }

    #[test]
    fn test_malformed_values() {
        assert_eq!("".parse::<GoDuration>(), Err(ParseError::Empty));
        assert_eq!("5".parse::<GoDuration>(), Err(ParseError::MissingUnit));
        assert_eq!("5d".parse::<GoDuration>(), Err(ParseError::UnknownUnit("d".to_string())));
        assert_eq!("-".parse::<GoDuration>(), Err(ParseError::InvalidNumber("-".to_string())));
        assert_eq!(
            "invalid".parse::<GoDuration>(),
            Err(ParseError::InvalidNumber("invalid".to_string()))
        );
    }

    #[test]
    fn test_sign_inside_value_is_rejected() {
        assert_eq!("5s-3s".parse::<GoDuration>(), Err(ParseError::InvalidNumber("-3s".to_string())));
        assert_eq!("1m+3s".parse::<GoDuration>(), Err(ParseError::InvalidNumber("+3s".to_string())));
    }

    #[test]
    fn test_out_of_range_values() {
        assert_eq!("99999999999999999999999h".parse::<GoDuration>(), Err(ParseError::Overflow));
        assert_eq!(
            "9999999999999999999999999999999999999999999s".parse::<GoDuration>(),
            Err(ParseError::Overflow)
        );
        let chain = "5000000h".repeat(2000);
        assert_eq!(chain.parse::<GoDuration>(), Err(ParseError::Overflow));
    }

    #[test]
    fn test_long_fraction_is_truncated() {
        assert_eq!(parse("1.0000000000000000000000001s"), Duration::from_secs(1));
    }
}
