//! Decoders for the Romanian formatting used in the bank's exports.
//!
//! Both decoders carry their own tables and never consult the process
//! locale, so concurrent imports cannot interfere with each other.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::DecodeError;

const MONTHS: [(&str, u32); 12] = [
    ("ianuarie", 1),
    ("februarie", 2),
    ("martie", 3),
    ("aprilie", 4),
    ("mai", 5),
    ("iunie", 6),
    ("iulie", 7),
    ("august", 8),
    ("septembrie", 9),
    ("octombrie", 10),
    ("noiembrie", 11),
    ("decembrie", 12),
];

pub fn month_number(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    MONTHS.iter().find(|(m, _)| *m == name).map(|(_, n)| *n)
}

/// Decode a statement date such as `05 martie 2024`.
pub fn decode_date(raw: &str) -> Result<NaiveDate, DecodeError> {
    let raw = raw.trim();
    if let Some(date) = decode_date_strict(raw) {
        return Ok(date);
    }

    let parts: Vec<&str> = raw.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(DecodeError::date(raw, format!("expected 3 parts, found {}", parts.len())));
    }
    let day: u32 = parts[0]
        .parse()
        .map_err(|_| DecodeError::date(raw, format!("bad day '{}'", parts[0])))?;
    let month = month_number(parts[1])
        .ok_or_else(|| DecodeError::date(raw, format!("unknown month name '{}'", parts[1])))?;
    let year: i32 = parts[2]
        .parse()
        .map_err(|_| DecodeError::date(raw, format!("bad year '{}'", parts[2])))?;
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| DecodeError::date(raw, "no such calendar date"))
}

// `DD month YYYY` with single spaces and fixed-width numbers.
fn decode_date_strict(raw: &str) -> Option<NaiveDate> {
    let (day, rest) = raw.split_once(' ')?;
    let (month, year) = rest.split_once(' ')?;
    if day.len() != 2 || year.len() != 4 {
        return None;
    }
    if !day.bytes().chain(year.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month_number(month)?, day.parse().ok()?)
}

/// Decode an amount written with `.` for thousands and `,` for decimals,
/// e.g. `1.234,56`. The result always has a scale of 2.
pub fn decode_amount(raw: &str) -> Result<Decimal, DecodeError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DecodeError::amount(raw, "empty"));
    }
    let normalized = raw.replace('.', "").replace(',', ".");

    let (sign, unsigned) = match normalized.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", normalized.strip_prefix('+').unwrap_or(&normalized)),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let digits_only = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !digits_only(int_part) || !digits_only(frac_part) {
        return Err(DecodeError::amount(raw, "not a number"));
    }
    if frac_part.len() > 2 {
        return Err(DecodeError::amount(raw, "more than 2 decimal places"));
    }

    // `,50` means 0,50.
    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let canonical = if frac_part.is_empty() {
        format!("{sign}{int_part}")
    } else {
        format!("{sign}{int_part}.{frac_part}")
    };
    let mut value = Decimal::from_str(&canonical)
        .map_err(|e| DecodeError::amount(raw, e.to_string()))?;
    value.rescale(2);
    Ok(value)
}
