//! Foliodesk Core - Tabular ingestion for back-office ledgers
//!
//! This crate implements the ingestion pipeline following hexagonal
//! architecture:
//!
//! - **domain**: Cell normalization, header repair, record mapping,
//!   identity keys
//! - **ports**: Trait definitions for external dependencies
//!   (LedgerStore, SpreadsheetReader)
//! - **services**: Parsing, validation and import orchestration
//! - **adapters**: Concrete implementations (calamine, in-memory store)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use adapters::{CalamineReader, MemoryLedger};
use config::Config;
use ports::LedgerStore;
use services::{ImportService, TabularParser};

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult};
pub use domain::{
    ImportResult, NewCustomer, NewTransaction, ParsedFile, RecordKind, TenantScope,
    ValidationResult,
};

/// Main context for Foliodesk operations
///
/// This is the primary entry point for the pipeline. It holds the
/// configuration, the store, and the services wired against it.
pub struct FoliodeskContext {
    pub config: Config,
    pub store: Arc<MemoryLedger>,
    pub parser: Arc<TabularParser>,
    pub import_service: ImportService,
}

impl FoliodeskContext {
    /// Create a new Foliodesk context
    pub fn new(foliodesk_dir: &Path) -> Result<Self> {
        let config = Config::load(foliodesk_dir)?;

        let store = Arc::new(MemoryLedger::new());
        let parser = Arc::new(TabularParser::new(
            Arc::new(CalamineReader),
            config.limits.clone(),
        ));
        let import_service = ImportService::new(
            Arc::clone(&store) as Arc<dyn LedgerStore>,
            Arc::clone(&parser),
            config.limits.clone(),
        );

        Ok(Self {
            config,
            store,
            parser,
            import_service,
        })
    }
}
