//! Service layer - ingestion pipeline orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on one stage of the pipeline.

pub mod import;
pub mod parser;
pub mod validator;

pub use import::ImportService;
pub use parser::{FileFormat, FileStats, FormatCheck, ParseOptions, TabularParser};
pub use validator::{validate_customer, validate_transaction};
