//! In-memory ledger store
//!
//! Backs tests and import rehearsals. Behaves like a real store at the
//! commit boundary: each call is atomic, customers upsert by identity
//! key, and every transaction commit revises its (customer, scheme)
//! portfolio entry.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::result::{Error, Result};
use crate::domain::{IdentityKey, ImportFileMeta, NewCustomer, NewTransaction, TenantScope};
use crate::ports::{CommitOutcome, LedgerStore};

type ScopeKey = (String, bool);

/// One (customer, scheme) holding line, revised on every commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioEntry {
    pub customer_ref: String,
    pub scheme_code: String,
    pub scheme_name: Option<String>,
    pub folio_number: Option<String>,
    pub txn_count: u64,
}

struct StoredCustomer {
    key: String,
    id: i64,
    record: NewCustomer,
}

#[derive(Default)]
struct LedgerState {
    transactions: HashMap<ScopeKey, Vec<NewTransaction>>,
    customers: HashMap<ScopeKey, Vec<StoredCustomer>>,
    portfolios: HashMap<ScopeKey, HashMap<(String, String), PortfolioEntry>>,
    files: HashMap<ScopeKey, Vec<ImportFileMeta>>,
    next_id: i64,
    fail_needle: Option<String>,
    fail_refresh: bool,
    refresh_calls: u64,
}

pub struct MemoryLedger {
    state: Mutex<LedgerState>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LedgerState::default()),
        }
    }

    // === Failure injection ===

    /// Make commits fail whenever the record's identity key contains `needle`
    pub fn fail_commits_matching(&self, needle: &str) {
        self.state.lock().unwrap().fail_needle = Some(needle.to_string());
    }

    /// Make portfolio refreshes fail
    pub fn fail_refresh(&self) {
        self.state.lock().unwrap().fail_refresh = true;
    }

    // === Inspection ===

    pub fn transaction_count(&self, scope: &TenantScope) -> usize {
        let state = self.state.lock().unwrap();
        state
            .transactions
            .get(&scope_key(scope))
            .map_or(0, Vec::len)
    }

    pub fn transactions(&self, scope: &TenantScope) -> Vec<NewTransaction> {
        let state = self.state.lock().unwrap();
        state
            .transactions
            .get(&scope_key(scope))
            .cloned()
            .unwrap_or_default()
    }

    pub fn customer_count(&self, scope: &TenantScope) -> usize {
        let state = self.state.lock().unwrap();
        state.customers.get(&scope_key(scope)).map_or(0, Vec::len)
    }

    pub fn customers(&self, scope: &TenantScope) -> Vec<NewCustomer> {
        let state = self.state.lock().unwrap();
        state
            .customers
            .get(&scope_key(scope))
            .map_or_else(Vec::new, |stored| {
                stored.iter().map(|c| c.record.clone()).collect()
            })
    }

    pub fn registered_files(&self, scope: &TenantScope) -> Vec<ImportFileMeta> {
        let state = self.state.lock().unwrap();
        state
            .files
            .get(&scope_key(scope))
            .cloned()
            .unwrap_or_default()
    }

    pub fn portfolio_entries(&self, scope: &TenantScope) -> Vec<PortfolioEntry> {
        let state = self.state.lock().unwrap();
        let mut entries: Vec<PortfolioEntry> = state
            .portfolios
            .get(&scope_key(scope))
            .map_or_else(Vec::new, |m| m.values().cloned().collect());
        entries.sort_by(|a, b| {
            (&a.customer_ref, &a.scheme_code).cmp(&(&b.customer_ref, &b.scheme_code))
        });
        entries
    }

    pub fn refresh_calls(&self) -> u64 {
        self.state.lock().unwrap().refresh_calls
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

fn scope_key(scope: &TenantScope) -> ScopeKey {
    (scope.tenant_id.clone(), scope.is_live)
}

impl LedgerState {
    fn alloc_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn check_needle(&self, key: &str) -> Result<()> {
        match &self.fail_needle {
            Some(needle) if key.contains(needle.as_str()) => {
                Err(Error::store(format!("injected commit failure for {}", key)))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn count_matching(&self, scope: &TenantScope, key: &IdentityKey) -> Result<u64> {
        let state = self.state.lock().unwrap();
        let sk = scope_key(scope);
        let count = match key {
            IdentityKey::Transaction(k) => state.transactions.get(&sk).map_or(0, |txs| {
                txs.iter()
                    .filter(|tx| tx.identity_key().as_str() == k)
                    .count()
            }),
            IdentityKey::Customer(k) => state.customers.get(&sk).map_or(0, |customers| {
                customers.iter().filter(|c| c.key == *k).count()
            }),
        };
        Ok(count as u64)
    }

    async fn commit_transaction(
        &self,
        scope: &TenantScope,
        tx: &NewTransaction,
    ) -> Result<CommitOutcome> {
        let mut state = self.state.lock().unwrap();
        let key = tx.identity_key();
        state.check_needle(key.as_str())?;

        let sk = scope_key(scope);
        let id = state.alloc_id();
        state.transactions.entry(sk.clone()).or_default().push(tx.clone());

        // Same atomic step as the insert: the holding line always
        // reflects the latest committed row
        let entry = state
            .portfolios
            .entry(sk)
            .or_default()
            .entry((tx.customer_ref.clone(), tx.scheme_code.clone()))
            .or_insert_with(|| PortfolioEntry {
                customer_ref: tx.customer_ref.clone(),
                scheme_code: tx.scheme_code.clone(),
                scheme_name: None,
                folio_number: None,
                txn_count: 0,
            });
        entry.txn_count += 1;
        if tx.scheme_name.is_some() {
            entry.scheme_name = tx.scheme_name.clone();
        }
        if tx.folio_number.is_some() {
            entry.folio_number = tx.folio_number.clone();
        }

        Ok(CommitOutcome::Created(id))
    }

    async fn commit_customer(
        &self,
        scope: &TenantScope,
        customer: &NewCustomer,
    ) -> Result<CommitOutcome> {
        let mut state = self.state.lock().unwrap();
        let key = customer.identity_key();
        state.check_needle(key.as_str())?;

        let sk = scope_key(scope);
        let revised = state
            .customers
            .get_mut(&sk)
            .and_then(|stored| stored.iter_mut().find(|c| c.key == key.as_str()))
            .map(|existing| {
                existing.record = customer.clone();
                existing.id
            });
        if let Some(id) = revised {
            return Ok(CommitOutcome::Updated(id));
        }

        let id = state.alloc_id();
        state.customers.entry(sk).or_default().push(StoredCustomer {
            key: key.as_str().to_string(),
            id,
            record: customer.clone(),
        });
        Ok(CommitOutcome::Created(id))
    }

    async fn register_file(&self, scope: &TenantScope, meta: &ImportFileMeta) -> Result<i64> {
        let mut state = self.state.lock().unwrap();
        let sk = scope_key(scope);
        let id = state.alloc_id();
        state.files.entry(sk).or_default().push(meta.clone());
        Ok(id)
    }

    async fn refresh_portfolio_totals(&self, scope: &TenantScope) -> Result<()> {
        let _ = scope;
        let mut state = self.state.lock().unwrap();
        state.refresh_calls += 1;
        if state.fail_refresh {
            return Err(Error::store("injected refresh failure"));
        }
        Ok(())
    }
}
