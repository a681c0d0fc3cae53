//! Ledger store port - persistence abstraction

use async_trait::async_trait;

use crate::domain::result::Result;
use crate::domain::{IdentityKey, ImportFileMeta, NewCustomer, NewTransaction, TenantScope};

/// How a commit landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// New record, with its store id
    Created(i64),
    /// Existing record revised, with its store id
    Updated(i64),
}

/// Persistence abstraction for committed ledger data.
///
/// Every method is one atomic store interaction; BEGIN/COMMIT/ROLLBACK
/// live inside the adapter, never in the core. The core hands a record
/// over at the commit boundary and only learns success or failure.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    // === Duplicate probing ===

    /// Count committed records matching an identity key
    async fn count_matching(&self, scope: &TenantScope, key: &IdentityKey) -> Result<u64>;

    // === Row commits ===

    /// Insert one transaction and upsert its (customer, scheme) portfolio
    /// entry, atomically
    async fn commit_transaction(
        &self,
        scope: &TenantScope,
        tx: &NewTransaction,
    ) -> Result<CommitOutcome>;

    /// Insert or revise one customer, keyed by identity
    async fn commit_customer(
        &self,
        scope: &TenantScope,
        customer: &NewCustomer,
    ) -> Result<CommitOutcome>;

    // === Upload bookkeeping ===

    /// Register an uploaded file, returning its store id
    async fn register_file(&self, scope: &TenantScope, meta: &ImportFileMeta) -> Result<i64>;

    // === Derived data ===

    /// Recompute derived portfolio totals for the tenant
    async fn refresh_portfolio_totals(&self, scope: &TenantScope) -> Result<()>;
}
