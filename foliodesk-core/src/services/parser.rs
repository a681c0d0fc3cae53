//! Tabular file parsing - delimited text and spreadsheets into one shape

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::IngestionLimits;
use crate::domain::cell::{normalize_cell, CellValue, ColumnHint, RawCell};
use crate::domain::result::{Error, Result};
use crate::domain::{column_hints, sanitize_headers, ParsedFile, ParsedRow};
use crate::ports::{SheetFormat, SpreadsheetReader};

/// File formats the pipeline accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
    Xls,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Parsing knobs; defaults match the upload endpoints
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub skip_empty_lines: bool,
    pub trim_headers: bool,
    /// Cap on materialized rows; `total_rows` keeps counting past it
    pub max_rows: Option<usize>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            skip_empty_lines: true,
            trim_headers: true,
            max_rows: None,
        }
    }
}

/// Quick metadata probe result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStats {
    pub total_rows: usize,
    pub total_columns: usize,
    pub file_size: u64,
}

/// Outcome of the cheap pre-upload format check
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatCheck {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Parses uploads into the uniform [`ParsedFile`] shape.
///
/// Per-line problems are collected in `ParsedFile::errors` and never abort
/// the parse; only whole-file problems (unreadable, unsupported format,
/// empty input) produce a structural failure.
pub struct TabularParser {
    reader: Arc<dyn SpreadsheetReader>,
    limits: IngestionLimits,
}

impl TabularParser {
    pub fn new(reader: Arc<dyn SpreadsheetReader>, limits: IngestionLimits) -> Self {
        Self { reader, limits }
    }

    /// Parse a file on disk, deriving the format from its extension
    pub fn parse_path(&self, path: &Path, options: &ParseOptions) -> ParsedFile {
        let Some(format) = FileFormat::from_path(path) else {
            return ParsedFile::failed(format!("Unsupported file format: {}", path.display()));
        };
        match std::fs::read(path) {
            Ok(data) => self.parse_bytes(&data, format, options),
            Err(e) => ParsedFile::failed(format!("Failed to read {}: {}", path.display(), e)),
        }
    }

    /// Parse an in-memory upload
    pub fn parse_bytes(&self, data: &[u8], format: FileFormat, options: &ParseOptions) -> ParsedFile {
        if data.is_empty() {
            return ParsedFile::failed("File is empty");
        }
        match format {
            FileFormat::Csv => self.parse_csv(data, options),
            FileFormat::Xlsx => self.parse_sheet(data, SheetFormat::Xlsx, options),
            FileFormat::Xls => self.parse_sheet(data, SheetFormat::Xls, options),
        }
    }

    /// Row/column/size probe without materializing any rows
    pub fn file_stats(&self, path: &Path) -> Result<FileStats> {
        let metadata = std::fs::metadata(path)?;
        let options = ParseOptions {
            max_rows: Some(0),
            ..Default::default()
        };
        let parsed = self.parse_path(path, &options);
        if parsed.is_structural_failure() {
            return Err(Error::parse(parsed.errors.join("; ")));
        }
        Ok(FileStats {
            total_rows: parsed.total_rows,
            total_columns: parsed.headers.len(),
            file_size: metadata.len(),
        })
    }

    /// Cheap pre-upload check: readable, supported, within the size
    /// ceiling, and structurally parseable
    pub fn validate_format(&self, path: &Path) -> FormatCheck {
        let mut errors = Vec::new();

        match std::fs::metadata(path) {
            Ok(meta) => {
                if meta.len() > self.limits.format_check_max_bytes {
                    errors.push(format!(
                        "File too large: {} bytes (max {})",
                        meta.len(),
                        self.limits.format_check_max_bytes
                    ));
                }
            }
            Err(e) => errors.push(format!("Cannot read {}: {}", path.display(), e)),
        }

        if FileFormat::from_path(path).is_none() {
            errors.push(format!("Unsupported file format: {}", path.display()));
        }

        if errors.is_empty() {
            // One-row sample parse; per-line problems are not format problems
            let options = ParseOptions {
                max_rows: Some(1),
                ..Default::default()
            };
            let parsed = self.parse_path(path, &options);
            if parsed.is_structural_failure() {
                errors.extend(parsed.errors);
            }
        }

        FormatCheck {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    fn parse_csv(&self, data: &[u8], options: &ParseOptions) -> ParsedFile {
        let text = String::from_utf8_lossy(data);
        let lines: Vec<&str> = text
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .collect();

        let Some(header_idx) = lines.iter().position(|l| !l.trim().is_empty()) else {
            return ParsedFile::failed("File is empty");
        };

        let header_cells = match split_delimited_line(lines[header_idx]) {
            Ok(cells) => cells,
            Err(e) => return ParsedFile::failed(format!("Line {}: {}", header_idx + 1, e)),
        };

        let mut file = ParsedFile {
            headers: sanitize_headers(&apply_header_trim(header_cells, options)),
            ..Default::default()
        };
        let hints = column_hints(&file.headers);

        for (offset, line) in lines[header_idx + 1..].iter().enumerate() {
            if options.skip_empty_lines && line.trim().is_empty() {
                continue;
            }
            file.total_rows += 1;
            if let Some(cap) = options.max_rows {
                if file.rows.len() >= cap {
                    continue;
                }
            }
            // 1-based line number in the source file
            let line_number = header_idx + 2 + offset;
            match split_delimited_line(line) {
                Ok(cells) => {
                    let raw: Vec<RawCell> = cells.into_iter().map(RawCell::Text).collect();
                    file.rows.push(build_row(&file.headers, &hints, raw));
                }
                Err(e) => {
                    debug!("skipping malformed line {}: {}", line_number, e);
                    file.errors.push(format!("Line {}: {}", line_number, e));
                }
            }
        }

        debug!(
            rows = file.total_rows,
            columns = file.headers.len(),
            errors = file.errors.len(),
            "parsed delimited file"
        );
        file
    }

    fn parse_sheet(&self, data: &[u8], format: SheetFormat, options: &ParseOptions) -> ParsedFile {
        let raw_rows = match self.reader.read_first_sheet(data, format) {
            Ok(rows) => rows,
            Err(e) => return ParsedFile::failed(e.to_string()),
        };

        let mut rows_iter = raw_rows.into_iter();
        let Some(header_row) = rows_iter.next() else {
            return ParsedFile::failed("File is empty");
        };

        let header_cells: Vec<String> = header_row
            .into_iter()
            .map(|c| normalize_cell(c, ColumnHint::None).render())
            .collect();

        let mut file = ParsedFile {
            headers: sanitize_headers(&apply_header_trim(header_cells, options)),
            ..Default::default()
        };
        let hints = column_hints(&file.headers);

        for raw_row in rows_iter {
            if options.skip_empty_lines && raw_row.iter().all(|c| matches!(c, RawCell::Empty)) {
                continue;
            }
            file.total_rows += 1;
            if let Some(cap) = options.max_rows {
                if file.rows.len() >= cap {
                    continue;
                }
            }
            file.rows.push(build_row(&file.headers, &hints, raw_row));
        }

        debug!(
            rows = file.total_rows,
            columns = file.headers.len(),
            "parsed spreadsheet"
        );
        file
    }
}

fn apply_header_trim(cells: Vec<String>, options: &ParseOptions) -> Vec<String> {
    if options.trim_headers {
        cells.into_iter().map(|h| h.trim().to_string()).collect()
    } else {
        cells
    }
}

/// Zip cells against headers; short rows pad with Empty, extras are dropped
fn build_row(headers: &[String], hints: &[ColumnHint], cells: Vec<RawCell>) -> ParsedRow {
    let mut row = ParsedRow::with_capacity(headers.len());
    let mut cells = cells.into_iter();
    for (header, hint) in headers.iter().zip(hints) {
        let cell = match cells.next() {
            Some(raw) => normalize_cell(raw, *hint),
            None => CellValue::Empty,
        };
        row.insert(header.clone(), cell);
    }
    row
}

/// Split one delimited line into fields.
///
/// Honors double-quote enclosure, commas inside quotes, and the `""`
/// escaped-quote convention. An unterminated quote fails the line.
fn split_delimited_line(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => fields.push(std::mem::take(&mut field)),
                _ => field.push(c),
            }
        }
    }

    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }
    fields.push(field);
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct NoSheets;

    impl SpreadsheetReader for NoSheets {
        fn read_first_sheet(&self, _data: &[u8], _format: SheetFormat) -> Result<Vec<Vec<RawCell>>> {
            Err(Error::parse("spreadsheet reading not wired in this test"))
        }
    }

    struct StaticSheet(Vec<Vec<RawCell>>);

    impl SpreadsheetReader for StaticSheet {
        fn read_first_sheet(&self, _data: &[u8], _format: SheetFormat) -> Result<Vec<Vec<RawCell>>> {
            Ok(self.0.clone())
        }
    }

    fn parser() -> TabularParser {
        TabularParser::new(Arc::new(NoSheets), IngestionLimits::default())
    }

    fn parse_csv_str(text: &str, options: &ParseOptions) -> ParsedFile {
        parser().parse_bytes(text.as_bytes(), FileFormat::Csv, options)
    }

    #[test]
    fn test_round_trip_plain_rows() {
        let parsed = parse_csv_str(
            "name,amount\nAlice,100\nBob,200\nCara,300\n",
            &ParseOptions::default(),
        );
        assert_eq!(parsed.headers, vec!["name", "amount"]);
        assert_eq!(parsed.total_rows, 3);
        assert_eq!(parsed.rows.len(), 3);
        assert!(parsed.errors.is_empty());
    }

    #[test]
    fn test_quoted_field_with_comma() {
        let parsed = parse_csv_str("h1,h2,h3\na,\"b,c\",d\n", &ParseOptions::default());
        let row = &parsed.rows[0];
        assert_eq!(row["h1"], CellValue::Text("a".to_string()));
        assert_eq!(row["h2"], CellValue::Text("b,c".to_string()));
        assert_eq!(row["h3"], CellValue::Text("d".to_string()));
    }

    #[test]
    fn test_escaped_quote() {
        assert_eq!(
            split_delimited_line("\"a\"\"b\"").unwrap(),
            vec!["a\"b".to_string()]
        );
    }

    #[test]
    fn test_unterminated_quote_skips_line_only() {
        let parsed = parse_csv_str(
            "name,amount\nAlice,100\n\"broken,200\nCara,300\n",
            &ParseOptions::default(),
        );
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.total_rows, 3);
        assert_eq!(parsed.errors.len(), 1);
        assert!(parsed.errors[0].contains("Line 3"), "got {:?}", parsed.errors);
        assert!(parsed.errors[0].contains("unterminated"));
    }

    #[test]
    fn test_blank_lines_skipped_by_default() {
        let parsed = parse_csv_str("name\n\nAlice\n\n\nBob\n", &ParseOptions::default());
        assert_eq!(parsed.total_rows, 2);
        assert_eq!(parsed.rows.len(), 2);
    }

    #[test]
    fn test_max_rows_caps_materialization_not_total() {
        let options = ParseOptions {
            max_rows: Some(1),
            ..Default::default()
        };
        let parsed = parse_csv_str("name\nAlice\nBob\nCara\n", &options);
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.total_rows, 3);
    }

    #[test]
    fn test_crlf_line_endings() {
        let parsed = parse_csv_str("name,amount\r\nAlice,100\r\n", &ParseOptions::default());
        assert_eq!(parsed.headers, vec!["name", "amount"]);
        assert_eq!(parsed.rows[0]["name"], CellValue::Text("Alice".to_string()));
    }

    #[test]
    fn test_short_rows_pad_with_empty() {
        let parsed = parse_csv_str("a,b,c\n1,2\n", &ParseOptions::default());
        assert_eq!(parsed.rows[0]["c"], CellValue::Empty);
    }

    #[test]
    fn test_empty_input_is_structural() {
        let parsed = parser().parse_bytes(b"", FileFormat::Csv, &ParseOptions::default());
        assert!(parsed.is_structural_failure());
        assert_eq!(parsed.errors, vec!["File is empty".to_string()]);

        let blank = parse_csv_str("\n\n  \n", &ParseOptions::default());
        assert!(blank.is_structural_failure());
    }

    #[test]
    fn test_unsupported_extension_is_structural() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();
        let parsed = parser().parse_path(&path, &ParseOptions::default());
        assert!(parsed.is_structural_failure());
        assert!(parsed.errors[0].contains("Unsupported file format"));
    }

    #[test]
    fn test_number_hinted_cells_coerce() {
        let parsed = parse_csv_str("name,Total Amount\nAlice,\"1,000.50\"\n", &ParseOptions::default());
        assert_eq!(
            parsed.rows[0]["Total Amount"],
            CellValue::Number(rust_decimal::Decimal::new(100050, 2))
        );
    }

    #[test]
    fn test_sheet_rows_and_cap() {
        let sheet = StaticSheet(vec![
            vec![
                RawCell::Text("Scheme Code".to_string()),
                RawCell::Text("Scheme Name".to_string()),
            ],
            vec![
                RawCell::Text("X100".to_string()),
                RawCell::Text("Index Fund".to_string()),
            ],
            vec![
                RawCell::Text("X200".to_string()),
                RawCell::Text("Bond Fund".to_string()),
            ],
        ]);
        let parser = TabularParser::new(Arc::new(sheet), IngestionLimits::default());
        let options = ParseOptions {
            max_rows: Some(1),
            ..Default::default()
        };
        let parsed = parser.parse_bytes(b"fake-xlsx", FileFormat::Xlsx, &options);
        assert_eq!(parsed.headers, vec!["Scheme Code", "Scheme Name"]);
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.total_rows, 2);
    }

    #[test]
    fn test_file_stats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(f, "name,amount\nAlice,100\nBob,200\n").unwrap();

        let stats = parser().file_stats(&path).unwrap();
        assert_eq!(stats.total_rows, 2);
        assert_eq!(stats.total_columns, 2);
        assert!(stats.file_size > 0);
    }

    #[test]
    fn test_validate_format() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("data.csv");
        std::fs::write(&good, "name\nAlice\n").unwrap();
        assert!(parser().validate_format(&good).is_valid);

        let bad_ext = dir.path().join("data.pdf");
        std::fs::write(&bad_ext, "x").unwrap();
        let check = parser().validate_format(&bad_ext);
        assert!(!check.is_valid);
        assert!(check.errors[0].contains("Unsupported"));

        let missing = dir.path().join("nope.csv");
        assert!(!parser().validate_format(&missing).is_valid);
    }

    #[test]
    fn test_validate_format_size_ceiling() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.csv");
        std::fs::write(&path, "name\nAlice\n").unwrap();

        let limits = IngestionLimits {
            format_check_max_bytes: 4,
            ..Default::default()
        };
        let parser = TabularParser::new(Arc::new(NoSheets), limits);
        let check = parser.validate_format(&path);
        assert!(!check.is_valid);
        assert!(check.errors[0].contains("File too large"));
    }
}
