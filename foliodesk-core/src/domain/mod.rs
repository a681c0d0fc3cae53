//! Core domain entities
//!
//! Pure data structures plus the cell/header/identity logic attached to
//! them - no I/O or external dependencies.

pub mod cell;
mod customer;
mod import;
mod record;
pub mod result;
mod table;
mod transaction;
mod validation;

pub use cell::{normalize_cell, CellValue, ColumnHint, RawCell};
pub use customer::NewCustomer;
pub use import::{ImportFileMeta, ImportResult, RowError, TenantScope};
pub use record::{
    map_customer_row, map_transaction_row, CustomerDraft, RecordKind, TransactionDraft,
};
pub use table::{column_hint, column_hints, sanitize_headers, ParsedFile, ParsedRow};
pub use transaction::{IdentityKey, NewTransaction};
pub use validation::ValidationResult;
