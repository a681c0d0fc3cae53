//! Transaction records bound for the ledger store

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity key used for duplicate probing.
///
/// Keys stay human-readable so duplicate reasons can quote them; the two
/// classes are prefixed and can never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentityKey {
    Transaction(String),
    Customer(String),
}

impl IdentityKey {
    pub fn as_str(&self) -> &str {
        match self {
            IdentityKey::Transaction(k) | IdentityKey::Customer(k) => k,
        }
    }
}

/// A validated transaction ready to commit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    pub customer_ref: String,
    pub folio_number: Option<String>,
    pub scheme_code: String,
    pub scheme_name: Option<String>,
    pub txn_type: String,
    pub txn_date: NaiveDate,
    pub amount: Decimal,
    pub units: Decimal,
    pub nav: Decimal,
    pub stamp_duty: Option<Decimal>,

    // === Duplicate annotation ===
    /// A committed record with the same identity key already existed
    pub is_potential_duplicate: bool,
    pub duplicate_reason: Option<String>,

    // === Import tracking ===
    /// Include this holding in portfolio aggregation
    pub portfolio_flag: bool,
    pub batch_id: Uuid,
    pub file_id: Option<i64>,
}

impl NewTransaction {
    /// Identity key: customer, scheme, date, amount (2dp), type joined
    /// with `|`. Exact match only.
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey::Transaction(format!(
            "{}|{}|{}|{:.2}|{}",
            self.customer_ref,
            self.scheme_code,
            self.txn_date.format("%Y-%m-%d"),
            self.amount,
            self.txn_type
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewTransaction {
        NewTransaction {
            customer_ref: "alice@example.com".to_string(),
            folio_number: Some("F-100".to_string()),
            scheme_code: "HDFCTOP100".to_string(),
            scheme_name: Some("HDFC Top 100".to_string()),
            txn_type: "Purchase".to_string(),
            txn_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            amount: Decimal::new(100050, 2),
            units: Decimal::new(10, 0),
            nav: Decimal::new(10005, 2),
            stamp_duty: None,
            is_potential_duplicate: false,
            duplicate_reason: None,
            portfolio_flag: true,
            batch_id: Uuid::new_v4(),
            file_id: None,
        }
    }

    #[test]
    fn test_identity_key_fields_and_order() {
        let key = sample().identity_key();
        assert_eq!(
            key.as_str(),
            "alice@example.com|HDFCTOP100|2024-01-15|1000.50|Purchase"
        );
    }

    #[test]
    fn test_identity_key_fixes_amount_scale() {
        let mut tx = sample();
        tx.amount = Decimal::new(1000, 0);
        let a = tx.identity_key();
        tx.amount = Decimal::new(100000, 2); // 1000.00
        let b = tx.identity_key();
        assert_eq!(a, b, "1000 and 1000.00 must produce the same key");
    }

    #[test]
    fn test_identity_key_ignores_non_key_fields() {
        let mut tx = sample();
        let a = tx.identity_key();
        tx.scheme_name = None;
        tx.units = Decimal::new(99, 0);
        tx.batch_id = Uuid::new_v4();
        let b = tx.identity_key();
        assert_eq!(a, b);
    }
}
