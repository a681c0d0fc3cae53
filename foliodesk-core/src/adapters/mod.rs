//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - calamine for the SpreadsheetReader port
//! - In-memory store for the LedgerStore port (tests and rehearsals)

pub mod calamine;
pub mod memory;

pub use calamine::CalamineReader;
pub use memory::{MemoryLedger, PortfolioEntry};
