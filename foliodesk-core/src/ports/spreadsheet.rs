//! Spreadsheet reader port - workbook decoding abstraction

use crate::domain::cell::RawCell;
use crate::domain::result::Result;

/// Workbook container formats the pipeline accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Xlsx,
    Xls,
}

/// Decodes the first worksheet of an in-memory workbook into raw cells.
///
/// Returned rows are row-major and include the header row; empty trailing
/// cells inside the used range come back as `RawCell::Empty`. Decoding is
/// pure, so the trait stays synchronous.
pub trait SpreadsheetReader: Send + Sync {
    fn read_first_sheet(&self, data: &[u8], format: SheetFormat) -> Result<Vec<Vec<RawCell>>>;
}
