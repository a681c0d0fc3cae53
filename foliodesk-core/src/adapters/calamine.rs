//! Spreadsheet reader adapter backed by calamine

use std::io::{Cursor, Read, Seek};

use calamine::{Data, Range, Reader, Xls, Xlsx};
use chrono::NaiveDate;

use crate::domain::cell::{serial_to_date, RawCell};
use crate::domain::result::{Error, Result};
use crate::ports::{SheetFormat, SpreadsheetReader};

/// Reads `.xlsx`/`.xls` workbooks from an in-memory buffer
pub struct CalamineReader;

impl SpreadsheetReader for CalamineReader {
    fn read_first_sheet(&self, data: &[u8], format: SheetFormat) -> Result<Vec<Vec<RawCell>>> {
        let cursor = Cursor::new(data);
        let range = match format {
            SheetFormat::Xlsx => {
                let mut workbook = Xlsx::new(cursor)
                    .map_err(|e| Error::parse(format!("Cannot open workbook: {}", e)))?;
                first_sheet_range(&mut workbook)?
            }
            SheetFormat::Xls => {
                let mut workbook = Xls::new(cursor)
                    .map_err(|e| Error::parse(format!("Cannot open workbook: {}", e)))?;
                first_sheet_range(&mut workbook)?
            }
        };

        Ok(range
            .rows()
            .map(|row| row.iter().map(to_raw_cell).collect())
            .collect())
    }
}

fn first_sheet_range<RS, R>(workbook: &mut R) -> Result<Range<Data>>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: std::fmt::Display,
{
    let Some(name) = workbook.sheet_names().first().cloned() else {
        return Err(Error::parse("Workbook has no worksheets"));
    };
    workbook
        .worksheet_range(&name)
        .map_err(|e| Error::parse(format!("Cannot read worksheet {}: {}", name, e)))
}

fn to_raw_cell(data: &Data) -> RawCell {
    match data {
        Data::Empty => RawCell::Empty,
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Float(f) => RawCell::Number(*f),
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Bool(b) => RawCell::Bool(*b),
        // Date-formatted cells carry a serial day count
        Data::DateTime(dt) => match serial_to_date(dt.as_f64()) {
            Some(date) => RawCell::Date(date),
            None => RawCell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map(RawCell::Date)
            .unwrap_or_else(|| RawCell::Text(s.clone())),
        Data::DurationIso(s) => RawCell::Text(s.clone()),
        // Cell errors ("#N/A", "#DIV/0!") render as their token; the
        // normalizer treats "#N/A" as absent
        Data::Error(e) => RawCell::Text(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn sample_workbook() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Scheme Code").unwrap();
        sheet.write_string(0, 1, "Units").unwrap();
        sheet.write_string(1, 0, "X100").unwrap();
        sheet.write_number(1, 1, 10.5).unwrap();
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_reads_first_sheet_cells() {
        let data = sample_workbook();
        let rows = CalamineReader
            .read_first_sheet(&data, SheetFormat::Xlsx)
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], RawCell::Text("Scheme Code".to_string()));
        assert_eq!(rows[1][0], RawCell::Text("X100".to_string()));
        assert_eq!(rows[1][1], RawCell::Number(10.5));
    }

    #[test]
    fn test_garbage_bytes_fail_cleanly() {
        let err = CalamineReader
            .read_first_sheet(b"not a workbook", SheetFormat::Xlsx)
            .unwrap_err();
        assert!(err.to_string().contains("Cannot open workbook"));
    }
}
