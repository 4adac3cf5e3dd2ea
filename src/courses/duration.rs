//! Course durations

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A course duration: free-form as authored, or an hour count once normalised.
///
/// Stored as a JSON number for [`CourseDuration::Hours`] and a JSON string for
/// [`CourseDuration::Label`], so a label such as `"10"` stays a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CourseDuration {
    /// Normalised hour count
    Hours(#[serde(with = "rust_decimal::serde::float")] Decimal),

    /// Free-form label such as `"52.5 hours"` or `"35h 20m"`
    Label(String),
}

impl CourseDuration {
    /// Hour count, parsing the label when not yet normalised.
    pub fn hours(&self) -> Decimal {
        match self {
            CourseDuration::Hours(hours) => *hours,
            CourseDuration::Label(label) => parse_duration_hours(label),
        }
    }

    /// The normalised form of this duration.
    #[must_use]
    pub fn normalized(&self) -> Self {
        CourseDuration::Hours(self.hours())
    }
}

impl Default for CourseDuration {
    fn default() -> Self {
        CourseDuration::Label(String::new())
    }
}

impl From<&str> for CourseDuration {
    fn from(value: &str) -> Self {
        CourseDuration::Label(value.to_string())
    }
}

impl From<Decimal> for CourseDuration {
    fn from(value: Decimal) -> Self {
        CourseDuration::Hours(value)
    }
}

/// Parse an hour count out of a free-form duration.
///
/// The first number followed (after optional whitespace) by an `h` marker
/// wins; `"35h 20m"` is 35 hours. Without a marker the longest numeric prefix
/// is used, sign, leading point and exponent included (`"-5"`, `".5"`,
/// `"1e2"`). Anything else is zero.
pub fn parse_duration_hours(input: &str) -> Decimal {
    hours_before_marker(input)
        .or_else(|| leading_number(input.trim_start()))
        .unwrap_or(Decimal::ZERO)
}

fn hours_before_marker(input: &str) -> Option<Decimal> {
    let bytes = input.as_bytes();

    (0..bytes.len())
        .filter(|&start| bytes.get(start).is_some_and(u8::is_ascii_digit))
        .find_map(|start| {
            let end = number_end(bytes, start);

            let marker = bytes
                .get(end..)?
                .iter()
                .position(|b| !b.is_ascii_whitespace())
                .and_then(|offset| bytes.get(end + offset))?;

            if marker.eq_ignore_ascii_case(&b'h') {
                Decimal::from_str(input.get(start..end)?.trim_end_matches('.')).ok()
            } else {
                None
            }
        })
}

/// `[+-][digits][.digits][e[+-]digits]` at the start of `input`, with at
/// least one mantissa digit.
fn leading_number(input: &str) -> Option<Decimal> {
    let bytes = input.as_bytes();
    let integer_start = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let integer_end = digits_end(bytes, integer_start);

    let fraction_end = if bytes.get(integer_end) == Some(&b'.') {
        digits_end(bytes, integer_end + 1)
    } else {
        integer_end
    };

    let integer = input.get(integer_start..integer_end)?;
    let fraction = input.get(integer_end..fraction_end)?.trim_start_matches('.');

    if integer.is_empty() && fraction.is_empty() {
        return None;
    }

    let mut mantissa = String::new();

    if bytes.first() == Some(&b'-') {
        mantissa.push('-');
    }

    mantissa.push_str(if integer.is_empty() { "0" } else { integer });

    if !fraction.is_empty() {
        mantissa.push('.');
        mantissa.push_str(fraction);
    }

    match exponent(input, fraction_end) {
        Some(exponent) => Decimal::from_scientific(&format!("{mantissa}e{exponent}")).ok(),
        None => Decimal::from_str(&mantissa).ok(),
    }
}

/// Exponent digits (with a `-` sign if present) of an `e` marker at `at`.
fn exponent(input: &str, at: usize) -> Option<&str> {
    let bytes = input.as_bytes();

    if !bytes.get(at).is_some_and(|b| b.eq_ignore_ascii_case(&b'e')) {
        return None;
    }

    let sign = at + 1;
    let digits_start = sign + usize::from(matches!(bytes.get(sign), Some(b'+' | b'-')));
    let end = digits_end(bytes, digits_start);

    if end == digits_start {
        return None;
    }

    let start = if bytes.get(sign) == Some(&b'-') { sign } else { digits_start };

    input.get(start..end)
}

/// End of the `digits[.digits]` run starting at `start`.
fn number_end(bytes: &[u8], start: usize) -> usize {
    let integer_end = digits_end(bytes, start);

    if bytes.get(integer_end) == Some(&b'.') {
        digits_end(bytes, integer_end + 1)
    } else {
        integer_end
    }
}

fn digits_end(bytes: &[u8], from: usize) -> usize {
    bytes
        .get(from..)
        .and_then(|rest| rest.iter().position(|b| !b.is_ascii_digit()))
        .map_or(bytes.len().max(from), |offset| from + offset)
}
