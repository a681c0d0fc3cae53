//! Customer records bound for the ledger store

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::transaction::IdentityKey;

/// A validated customer ready to commit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub pan: Option<String>,
    pub folio_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub date_of_birth: Option<NaiveDate>,

    // === Duplicate annotation ===
    pub is_potential_duplicate: bool,
    pub duplicate_reason: Option<String>,

    // === Import tracking ===
    pub batch_id: Uuid,
    pub file_id: Option<i64>,
}

impl NewCustomer {
    /// Identity key: PAN when present, else lowercased email, else
    /// name plus phone digits. Each class carries its own prefix.
    pub fn identity_key(&self) -> IdentityKey {
        if let Some(pan) = self.pan.as_deref().filter(|p| !p.is_empty()) {
            return IdentityKey::Customer(format!("pan:{}", pan.to_uppercase()));
        }
        if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty()) {
            return IdentityKey::Customer(format!("email:{}", email.to_lowercase()));
        }
        let phone_digits: String = self
            .phone
            .as_deref()
            .unwrap_or("")
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();
        IdentityKey::Customer(format!("name:{}|{}", self.name.to_lowercase(), phone_digits))
    }
}
