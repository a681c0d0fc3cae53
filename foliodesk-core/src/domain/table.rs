//! Uniform parsed-table representation and header repair

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::cell::{CellValue, ColumnHint};

/// One data row keyed by sanitized header
pub type ParsedRow = HashMap<String, CellValue>;

/// Uniform output of every format backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedFile {
    /// Unique, non-empty column names after sanitization
    pub headers: Vec<String>,
    pub rows: Vec<ParsedRow>,
    /// Raw data-row count, independent of any materialization cap
    pub total_rows: usize,
    /// Non-fatal per-line problems collected during parsing
    pub errors: Vec<String>,
}

impl ParsedFile {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            errors: vec![error.into()],
            ..Default::default()
        }
    }

    /// Whole-file failure: nothing was parsed and an error was recorded.
    /// Per-line errors alongside parsed rows are not structural.
    pub fn is_structural_failure(&self) -> bool {
        self.headers.is_empty() && !self.errors.is_empty()
    }
}

/// Repair a raw header row: trim, name blank columns, deduplicate.
///
/// Output always has the same length as the input. Blank headers become
/// `Column_<n>` (1-based); a name already taken gets `_1`, `_2`, ...
/// suffixes, checked against everything assigned so far.
pub fn sanitize_headers(raw: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());

    for (idx, header) in raw.iter().enumerate() {
        let mut name = header.trim().to_string();
        if name.is_empty() {
            name = format!("Column_{}", idx + 1);
        }
        if seen.contains(&name) {
            let mut suffix = 1;
            loop {
                let candidate = format!("{}_{}", name, suffix);
                if !seen.contains(&candidate) {
                    name = candidate;
                    break;
                }
                suffix += 1;
            }
        }
        seen.insert(name.clone());
        out.push(name);
    }

    out
}

/// Guess the coercion hint for a column from its header text
pub fn column_hint(header: &str) -> ColumnHint {
    let date_patterns = ["date", "dob", "birth"];
    let number_patterns = [
        "amount", "amt", "units", "nav", "price", "value", "balance", "duty", "qty", "quantity",
    ];

    let lower = header.to_lowercase();
    if date_patterns.iter().any(|p| lower.contains(p)) {
        return ColumnHint::Date;
    }
    if number_patterns.iter().any(|p| lower.contains(p)) {
        return ColumnHint::Number;
    }
    ColumnHint::None
}

/// Per-column hints for a sanitized header row
pub fn column_hints(headers: &[String]) -> Vec<ColumnHint> {
    headers.iter().map(|h| column_hint(h)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sanitize_fills_blank_headers() {
        let out = sanitize_headers(&headers(&["Name", "", "  ", "Amount"]));
        assert_eq!(out, vec!["Name", "Column_2", "Column_3", "Amount"]);
    }

    #[test]
    fn test_sanitize_deduplicates() {
        let out = sanitize_headers(&headers(&["Name", "Name", "Name"]));
        assert_eq!(out, vec!["Name", "Name_1", "Name_2"]);
    }

    #[test]
    fn test_sanitize_handles_collision_with_generated_name() {
        // A literal header equal to a suffixed name must still end unique
        let out = sanitize_headers(&headers(&["Name", "Name_1", "Name"]));
        assert_eq!(out.len(), 3);
        let unique: HashSet<_> = out.iter().collect();
        assert_eq!(unique.len(), 3, "headers not unique: {:?}", out);
    }

    #[test]
    fn test_sanitize_all_empty_input() {
        let out = sanitize_headers(&headers(&["", "", ""]));
        assert_eq!(out, vec!["Column_1", "Column_2", "Column_3"]);
    }

    #[test]
    fn test_output_length_and_uniqueness_invariant() {
        let cases: Vec<Vec<String>> = vec![
            headers(&["a", "a", "a", "a"]),
            headers(&["", "", "a", "a", ""]),
            headers(&["Column_1", "", "Column_2"]),
        ];
        for raw in cases {
            let out = sanitize_headers(&raw);
            assert_eq!(out.len(), raw.len());
            let unique: HashSet<_> = out.iter().collect();
            assert_eq!(unique.len(), out.len(), "duplicates in {:?}", out);
            assert!(out.iter().all(|h| !h.is_empty()));
        }
    }

    #[test]
    fn test_column_hints() {
        assert_eq!(column_hint("Transaction Date"), ColumnHint::Date);
        assert_eq!(column_hint("Date of Birth"), ColumnHint::Date);
        assert_eq!(column_hint("Total Amount"), ColumnHint::Number);
        assert_eq!(column_hint("NAV"), ColumnHint::Number);
        assert_eq!(column_hint("Customer Name"), ColumnHint::None);
    }
}
