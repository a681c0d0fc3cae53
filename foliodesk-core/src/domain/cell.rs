//! Cell value cleaning and coercion for ingested tabular data

use std::fmt;

use chrono::{Duration, NaiveDate};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tokens treated as absent values regardless of case
const EMPTY_SENTINELS: [&str; 4] = ["null", "undefined", "n/a", "#n/a"];

/// First spreadsheet serial day that maps to 1970-01-01
const SERIAL_EPOCH_OFFSET: f64 = 25569.0;

/// First serial day past 9999-12-31
const SERIAL_UPPER_BOUND: f64 = 2958466.0;

/// Column-derived hint steering ambiguous coercions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnHint {
    #[default]
    None,
    Date,
    Number,
}

/// A raw cell as handed over by a format backend, before normalization
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Bool(bool),
}

/// A cleaned scalar cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(Decimal),
    Date(NaiveDate),
    Bool(bool),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Rendered form used when building candidate records
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Normalize one raw cell into a clean scalar.
///
/// Never panics; input that resists coercion degrades to `Empty` or to its
/// cleaned string form.
pub fn normalize_cell(raw: RawCell, hint: ColumnHint) -> CellValue {
    match raw {
        RawCell::Empty => CellValue::Empty,
        RawCell::Text(s) => normalize_text(&s, hint),
        RawCell::Number(n) => normalize_number(n, hint),
        // Native dates keep only the calendar day
        RawCell::Date(d) => CellValue::Date(d),
        RawCell::Bool(b) => CellValue::Bool(b),
    }
}

fn normalize_text(raw: &str, hint: ColumnHint) -> CellValue {
    let cleaned = clean_string(raw);
    if cleaned.is_empty() || is_empty_sentinel(&cleaned) {
        return CellValue::Empty;
    }

    match hint {
        ColumnHint::Date => {
            if let Some(date) = parse_flexible_date(&cleaned) {
                return CellValue::Date(date);
            }
        }
        ColumnHint::Number => {
            if let Some(amount) = parse_decimal(&cleaned) {
                return CellValue::Number(amount);
            }
        }
        ColumnHint::None => {}
    }

    CellValue::Text(cleaned)
}

fn normalize_number(n: f64, hint: ColumnHint) -> CellValue {
    // Only a date-hinted column may reinterpret a serial day count;
    // plain amounts routinely fall inside the serial range.
    if hint == ColumnHint::Date {
        if let Some(date) = serial_to_date(n) {
            return CellValue::Date(date);
        }
    }

    match Decimal::from_f64(n) {
        Some(d) => CellValue::Number(d.normalize()),
        None => CellValue::Text(n.to_string()),
    }
}

/// Trim, strip one layer of matching surrounding quotes, trim again
fn clean_string(raw: &str) -> String {
    let trimmed = raw.trim();
    let bytes = trimmed.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return trimmed[1..trimmed.len() - 1].trim().to_string();
        }
    }
    trimmed.to_string()
}

fn is_empty_sentinel(s: &str) -> bool {
    let lower = s.to_lowercase();
    EMPTY_SENTINELS.iter().any(|t| *t == lower)
}

/// Map a spreadsheet serial day count to a calendar date.
///
/// Accepts serials for calendar years 1970 through 9999; anything outside
/// that window is left alone. Fractional days (time of day) are discarded.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < SERIAL_EPOCH_OFFSET || serial >= SERIAL_UPPER_BOUND {
        return None;
    }
    let days = (serial - SERIAL_EPOCH_OFFSET).trunc() as i64;
    NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(Duration::days(days))
}

/// Parse a calendar date from the formats the upstream files actually use
pub fn parse_flexible_date(s: &str) -> Option<NaiveDate> {
    // Try common formats
    let formats = [
        "%Y-%m-%d",
        "%d/%m/%Y",
        "%m/%d/%Y",
        "%d-%m-%Y",
        "%m-%d-%Y",
        "%Y/%m/%d",
    ];

    for fmt in &formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }
    None
}

/// Parse a decimal amount, tolerating currency symbols, thousands
/// separators, and parentheses notation for negatives
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();

    // (100.00) -> -100.00
    let (is_negative, s) = if s.starts_with('(') && s.ends_with(')') && s.len() >= 2 {
        (true, &s[1..s.len() - 1])
    } else {
        (false, s)
    };

    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let mut amount: Decimal = cleaned.parse().ok()?;
    if is_negative && amount > Decimal::ZERO {
        amount = -amount;
    }

    Some(amount)
}
