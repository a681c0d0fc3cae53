//! Batch import outcome and upload bookkeeping

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::record::RecordKind;

/// Tenant scoping carried through every store interaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantScope {
    pub tenant_id: String,
    /// Live environment; false targets the rehearsal dataset
    pub is_live: bool,
}

impl TenantScope {
    pub fn new(tenant_id: impl Into<String>, is_live: bool) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            is_live,
        }
    }
}

/// Metadata registered for an uploaded file before row processing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportFileMeta {
    pub original_name: String,
    pub size_bytes: u64,
    /// SHA-256 of the upload, hex encoded
    pub checksum: String,
    pub kind: RecordKind,
}

impl ImportFileMeta {
    pub fn from_bytes(original_name: impl Into<String>, bytes: &[u8], kind: RecordKind) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self {
            original_name: original_name.into(),
            size_bytes: bytes.len() as u64,
            checksum: hex::encode(hasher.finalize()),
            kind,
        }
    }
}

/// One rejected row with its field messages and original data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    /// 1-based data row number
    pub row: usize,
    pub errors: Vec<String>,
    pub data: HashMap<String, String>,
}

/// Aggregated outcome of one import batch.
///
/// Built incrementally while rows are processed; immutable once returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub success: bool,
    pub total_rows: usize,
    pub processed: usize,
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
    pub errors: Vec<RowError>,
    pub file_id: Option<i64>,
    pub batch_id: Uuid,
}

impl ImportResult {
    pub fn new(total_rows: usize, batch_id: Uuid) -> Self {
        Self {
            success: false,
            total_rows,
            processed: 0,
            created: 0,
            updated: 0,
            failed: 0,
            errors: Vec::new(),
            file_id: None,
            batch_id,
        }
    }

    pub fn record_created(&mut self) {
        self.created += 1;
    }

    pub fn record_updated(&mut self) {
        self.updated += 1;
    }

    pub fn record_failure(&mut self, row: usize, errors: Vec<String>, data: HashMap<String, String>) {
        self.failed += 1;
        self.errors.push(RowError { row, errors, data });
    }

    /// Settle the derived fields once all rows are handled
    pub fn finalize(&mut self) {
        self.processed = self.created + self.updated + self.failed;
        self.success = self.failed == 0;
    }
}
