//! CLI command implementations

pub mod check;
pub mod import;
pub mod inspect;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use foliodesk_core::{FoliodeskContext, RecordKind};

/// Get the foliodesk directory from environment or default
pub fn get_foliodesk_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("FOLIODESK_DIR") {
        PathBuf::from(dir)
    } else {
        PathBuf::from(".")
    }
}

/// Get or create foliodesk context
pub fn get_context() -> Result<FoliodeskContext> {
    let foliodesk_dir = get_foliodesk_dir();

    std::fs::create_dir_all(&foliodesk_dir)
        .with_context(|| format!("Failed to create foliodesk directory: {:?}", foliodesk_dir))?;

    FoliodeskContext::new(&foliodesk_dir).context("Failed to initialize foliodesk context")
}

/// Resolve a --kind argument
pub fn parse_kind(kind: &str) -> Result<RecordKind> {
    match kind.to_lowercase().as_str() {
        "customers" | "customer" => Ok(RecordKind::Customers),
        "transactions" | "transaction" | "txn" => Ok(RecordKind::Transactions),
        other => bail!(
            "Unknown record kind: {} (expected customers or transactions)",
            other
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind_accepts_common_spellings() {
        assert_eq!(parse_kind("customers").unwrap(), RecordKind::Customers);
        assert_eq!(parse_kind("Customer").unwrap(), RecordKind::Customers);
        assert_eq!(parse_kind("TRANSACTIONS").unwrap(), RecordKind::Transactions);
        assert_eq!(parse_kind("txn").unwrap(), RecordKind::Transactions);
        assert!(parse_kind("holdings").is_err());
    }
}
