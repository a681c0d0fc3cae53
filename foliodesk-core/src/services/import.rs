//! Batch import orchestration - map, validate, flag duplicates, commit

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::IngestionLimits;
use crate::domain::cell::{parse_decimal, parse_flexible_date};
use crate::domain::result::{Error, Result};
use crate::domain::{
    map_customer_row, map_transaction_row, CustomerDraft, ImportFileMeta, ImportResult,
    NewCustomer, NewTransaction, ParsedFile, ParsedRow, RecordKind, TenantScope, TransactionDraft,
};
use crate::ports::{CommitOutcome, LedgerStore};
use crate::services::parser::{FileFormat, ParseOptions, TabularParser};
use crate::services::validator::{validate_customer, validate_transaction};

/// Drives parse -> validate -> duplicate-check -> per-row commit.
///
/// Rows are processed strictly in order and each commit is awaited before
/// the next row's duplicate probe runs, so a batch observes its own
/// earlier commits (intra-file duplicates are caught). One row's failure
/// never aborts the batch; only structural file problems do.
pub struct ImportService {
    store: Arc<dyn LedgerStore>,
    parser: Arc<TabularParser>,
    limits: IngestionLimits,
}

impl ImportService {
    pub fn new(store: Arc<dyn LedgerStore>, parser: Arc<TabularParser>, limits: IngestionLimits) -> Self {
        Self {
            store,
            parser,
            limits,
        }
    }

    /// Read, register and import a file on disk
    pub async fn import_file(
        &self,
        path: &Path,
        kind: RecordKind,
        scope: &TenantScope,
    ) -> Result<ImportResult> {
        let data = std::fs::read(path)
            .map_err(|e| Error::parse(format!("Failed to read {}: {}", path.display(), e)))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload");
        self.import_bytes(name, &data, kind, scope).await
    }

    /// Import an in-memory upload end to end.
    ///
    /// Structural problems (oversize, unsupported extension, unreadable or
    /// empty content) abort before any row is processed.
    pub async fn import_bytes(
        &self,
        original_name: &str,
        data: &[u8],
        kind: RecordKind,
        scope: &TenantScope,
    ) -> Result<ImportResult> {
        if data.len() as u64 > self.limits.upload_max_bytes {
            return Err(Error::validation(format!(
                "File exceeds the {} byte upload limit",
                self.limits.upload_max_bytes
            )));
        }

        let format = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(FileFormat::from_extension)
            .ok_or_else(|| Error::parse(format!("Unsupported file format: {}", original_name)))?;

        let parsed = self.parser.parse_bytes(data, format, &ParseOptions::default());
        if parsed.is_structural_failure() {
            return Err(Error::parse(parsed.errors.join("; ")));
        }

        let meta = ImportFileMeta::from_bytes(original_name, data, kind);
        let file_id = match self.store.register_file(scope, &meta).await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(error = %e, "file registration failed, continuing without file id");
                None
            }
        };

        self.import_batch(&parsed, kind, scope, file_id).await
    }

    /// Import already-parsed rows, sequentially and row-transactionally
    pub async fn import_batch(
        &self,
        parsed: &ParsedFile,
        kind: RecordKind,
        scope: &TenantScope,
        file_id: Option<i64>,
    ) -> Result<ImportResult> {
        let batch_id = Uuid::new_v4();
        let mut result = ImportResult::new(parsed.total_rows, batch_id);
        result.file_id = file_id;
        let today = Utc::now().date_naive();

        info!(
            kind = kind.as_str(),
            rows = parsed.rows.len(),
            tenant = %scope.tenant_id,
            %batch_id,
            "starting import batch"
        );

        for (index, row) in parsed.rows.iter().enumerate() {
            let row_number = index + 1;
            match kind {
                RecordKind::Transactions => {
                    self.import_transaction_row(
                        row,
                        row_number,
                        &parsed.headers,
                        scope,
                        batch_id,
                        file_id,
                        today,
                        &mut result,
                    )
                    .await;
                }
                RecordKind::Customers => {
                    self.import_customer_row(
                        row,
                        row_number,
                        &parsed.headers,
                        scope,
                        batch_id,
                        file_id,
                        today,
                        &mut result,
                    )
                    .await;
                }
            }
        }

        result.finalize();

        if kind == RecordKind::Transactions && result.created + result.updated > 0 {
            self.spawn_portfolio_refresh(scope.clone());
        }

        info!(
            processed = result.processed,
            created = result.created,
            updated = result.updated,
            failed = result.failed,
            "import batch finished"
        );
        Ok(result)
    }

    #[allow(clippy::too_many_arguments)]
    async fn import_transaction_row(
        &self,
        row: &ParsedRow,
        row_number: usize,
        headers: &[String],
        scope: &TenantScope,
        batch_id: Uuid,
        file_id: Option<i64>,
        today: NaiveDate,
        result: &mut ImportResult,
    ) {
        let draft = map_transaction_row(row, headers);
        let validation = validate_transaction(&draft, today);
        if !validation.is_valid {
            debug!(row = row_number, errors = ?validation.errors, "row failed validation");
            result.record_failure(row_number, validation.errors, render_row(row));
            return;
        }

        let mut tx = match build_transaction(&draft, batch_id, file_id) {
            Ok(tx) => tx,
            Err(e) => {
                result.record_failure(row_number, vec![e.to_string()], render_row(row));
                return;
            }
        };

        match self.store.count_matching(scope, &tx.identity_key()).await {
            Ok(0) => {}
            Ok(count) => {
                debug!(row = row_number, count, "duplicate key match");
                tx.is_potential_duplicate = true;
                tx.duplicate_reason = Some(format!(
                    "{} committed transaction(s) match key {}",
                    count,
                    tx.identity_key().as_str()
                ));
            }
            Err(e) => {
                result.record_failure(row_number, vec![e.to_string()], render_row(row));
                return;
            }
        }

        match self.store.commit_transaction(scope, &tx).await {
            Ok(CommitOutcome::Created(_)) => result.record_created(),
            Ok(CommitOutcome::Updated(_)) => result.record_updated(),
            Err(e) => {
                warn!(row = row_number, error = %e, "commit failed, row rolled back");
                result.record_failure(row_number, vec![e.to_string()], render_row(row));
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn import_customer_row(
        &self,
        row: &ParsedRow,
        row_number: usize,
        headers: &[String],
        scope: &TenantScope,
        batch_id: Uuid,
        file_id: Option<i64>,
        today: NaiveDate,
        result: &mut ImportResult,
    ) {
        let draft = map_customer_row(row, headers);
        let validation = validate_customer(&draft, today);
        if !validation.is_valid {
            debug!(row = row_number, errors = ?validation.errors, "row failed validation");
            result.record_failure(row_number, validation.errors, render_row(row));
            return;
        }

        let mut customer = match build_customer(&draft, batch_id, file_id) {
            Ok(c) => c,
            Err(e) => {
                result.record_failure(row_number, vec![e.to_string()], render_row(row));
                return;
            }
        };

        match self.store.count_matching(scope, &customer.identity_key()).await {
            Ok(0) => {}
            Ok(count) => {
                customer.is_potential_duplicate = true;
                customer.duplicate_reason = Some(format!(
                    "{} committed customer(s) match key {}",
                    count,
                    customer.identity_key().as_str()
                ));
            }
            Err(e) => {
                result.record_failure(row_number, vec![e.to_string()], render_row(row));
                return;
            }
        }

        match self.store.commit_customer(scope, &customer).await {
            Ok(CommitOutcome::Created(_)) => result.record_created(),
            Ok(CommitOutcome::Updated(_)) => result.record_updated(),
            Err(e) => {
                warn!(row = row_number, error = %e, "commit failed, row rolled back");
                result.record_failure(row_number, vec![e.to_string()], render_row(row));
            }
        }
    }

    /// Best-effort refresh of derived portfolio totals; failure is logged
    /// and swallowed, never surfaced to the import caller
    fn spawn_portfolio_refresh(&self, scope: TenantScope) {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            if let Err(e) = store.refresh_portfolio_totals(&scope).await {
                warn!(tenant = %scope.tenant_id, error = %e, "portfolio refresh failed");
            }
        });
    }
}

fn render_row(row: &ParsedRow) -> HashMap<String, String> {
    row.iter().map(|(k, v)| (k.clone(), v.render())).collect()
}

fn required_field(value: &Option<String>, label: &str) -> Result<String> {
    value
        .clone()
        .ok_or_else(|| Error::validation(format!("{} is missing", label)))
}

/// Convert a validated draft into the commit shape. Field parses here
/// mirror the validator's, so a draft that passed validation converts.
fn build_transaction(
    draft: &TransactionDraft,
    batch_id: Uuid,
    file_id: Option<i64>,
) -> Result<NewTransaction> {
    let txn_date = draft
        .txn_date
        .as_deref()
        .and_then(parse_flexible_date)
        .ok_or_else(|| Error::validation("transaction date failed to parse"))?;
    let amount = draft
        .amount
        .as_deref()
        .and_then(parse_decimal)
        .ok_or_else(|| Error::validation("amount failed to parse"))?;
    let units = draft
        .units
        .as_deref()
        .and_then(parse_decimal)
        .ok_or_else(|| Error::validation("units failed to parse"))?;
    let nav = draft
        .nav
        .as_deref()
        .and_then(parse_decimal)
        .ok_or_else(|| Error::validation("NAV failed to parse"))?;

    Ok(NewTransaction {
        customer_ref: required_field(&draft.customer_ref, "customer reference")?,
        folio_number: draft.folio_number.clone(),
        scheme_code: required_field(&draft.scheme_code, "scheme code")?,
        scheme_name: draft.scheme_name.clone(),
        txn_type: required_field(&draft.txn_type, "transaction type")?,
        txn_date,
        amount,
        units,
        nav,
        stamp_duty: draft.stamp_duty.as_deref().and_then(parse_decimal),
        is_potential_duplicate: false,
        duplicate_reason: None,
        portfolio_flag: true,
        batch_id,
        file_id,
    })
}

fn build_customer(
    draft: &CustomerDraft,
    batch_id: Uuid,
    file_id: Option<i64>,
) -> Result<NewCustomer> {
    Ok(NewCustomer {
        name: required_field(&draft.name, "name")?,
        email: draft.email.clone(),
        phone: draft.phone.clone(),
        pan: draft.pan.clone(),
        folio_number: draft.folio_number.clone(),
        address: draft.address.clone(),
        city: draft.city.clone(),
        state: draft.state.clone(),
        pincode: draft.pincode.clone(),
        date_of_birth: draft.date_of_birth.as_deref().and_then(parse_flexible_date),
        is_potential_duplicate: false,
        duplicate_reason: None,
        batch_id,
        file_id,
    })
}
