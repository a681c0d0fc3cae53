//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The core domain
//! depends only on these traits, not on concrete implementations.

mod spreadsheet;
mod store;

pub use spreadsheet::{SheetFormat, SpreadsheetReader};
pub use store::{CommitOutcome, LedgerStore};
