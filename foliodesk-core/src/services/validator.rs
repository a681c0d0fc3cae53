//! Domain-rule validation for candidate records

use std::sync::OnceLock;

use chrono::{Months, NaiveDate};
use regex::Regex;
use rust_decimal::Decimal;

use crate::domain::cell::{parse_decimal, parse_flexible_date};
use crate::domain::{CustomerDraft, TransactionDraft, ValidationResult};

/// Warn when |units x NAV - amount| reaches this many currency units
const AMOUNT_TOLERANCE: Decimal = Decimal::ONE;

/// Transaction dates older than this draw a warning
const STALE_YEARS: u32 = 10;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

fn pan_regex() -> &'static Regex {
    static PAN: OnceLock<Regex> = OnceLock::new();
    PAN.get_or_init(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").unwrap())
}

/// Validate a transaction candidate against the frozen rule set.
///
/// `today` anchors the date-plausibility rules so outcomes are
/// reproducible in tests.
pub fn validate_transaction(draft: &TransactionDraft, today: NaiveDate) -> ValidationResult {
    let mut result = ValidationResult::new();

    // Presence rules, one message per missing field
    let required = [
        (&draft.customer_ref, "Customer reference is required"),
        (&draft.scheme_code, "Scheme code is required"),
        (&draft.txn_type, "Transaction type is required"),
        (&draft.txn_date, "Transaction date is required"),
        (&draft.amount, "Total amount is required"),
        (&draft.units, "Units is required"),
        (&draft.nav, "NAV is required"),
    ];
    for (value, message) in required {
        if is_blank(value) {
            result.add_error(message);
        }
    }

    // Field rules
    if let Some(raw) = draft.txn_date.as_deref() {
        match parse_flexible_date(raw) {
            None => result.add_error(format!("Invalid transaction date: {}", raw)),
            Some(date) => {
                if date > today {
                    result.add_warning(format!("Transaction date {} is in the future", date));
                } else if date < stale_cutoff(today) {
                    result.add_warning(format!(
                        "Transaction date {} is more than {} years old",
                        date, STALE_YEARS
                    ));
                }
            }
        }
    }

    if let Some(raw) = draft.amount.as_deref() {
        match parse_decimal(raw) {
            None => result.add_error(format!("Total amount is not a number: {}", raw)),
            Some(v) if v < Decimal::ZERO => result.add_error("Total amount cannot be negative"),
            _ => {}
        }
    }

    if let Some(raw) = draft.units.as_deref() {
        match parse_decimal(raw) {
            None => result.add_error(format!("Units is not a number: {}", raw)),
            Some(v) if v < Decimal::ZERO => result.add_error("Units cannot be negative"),
            _ => {}
        }
    }

    if let Some(raw) = draft.nav.as_deref() {
        match parse_decimal(raw) {
            None => result.add_error(format!("NAV is not a number: {}", raw)),
            Some(v) if v <= Decimal::ZERO => result.add_error("NAV must be greater than zero"),
            _ => {}
        }
    }

    if let Some(raw) = draft.stamp_duty.as_deref() {
        match parse_decimal(raw) {
            None => result.add_warning(format!("Stamp duty is not a number: {}", raw)),
            Some(v) if v < Decimal::ZERO => result.add_warning("Stamp duty is negative"),
            _ => {}
        }
    }

    // Cross-field consistency: units x NAV against the stated amount.
    // The tolerance absorbs sub-unit rounding upstream; it never blocks.
    if let (Some(units), Some(nav), Some(amount)) = (
        draft.units.as_deref().and_then(parse_decimal),
        draft.nav.as_deref().and_then(parse_decimal),
        draft.amount.as_deref().and_then(parse_decimal),
    ) {
        let computed = (units * nav).round_dp(2);
        let delta = (computed - amount).abs();
        if delta >= AMOUNT_TOLERANCE {
            result.add_warning(format!(
                "Stated amount {} differs from units x NAV = {} by {}",
                amount, computed, delta
            ));
        }
    }

    result
}

/// Validate a customer candidate against the frozen rule set
pub fn validate_customer(draft: &CustomerDraft, today: NaiveDate) -> ValidationResult {
    let mut result = ValidationResult::new();

    if is_blank(&draft.name) {
        result.add_error("Name is required");
    }

    if let Some(email) = draft.email.as_deref() {
        if !email_regex().is_match(email) {
            result.add_error(format!("Invalid email address: {}", email));
        }
    }

    if let Some(pan) = draft.pan.as_deref() {
        if !pan_regex().is_match(&pan.to_uppercase()) {
            result.add_error(format!("Invalid PAN: {}", pan));
        }
    }

    if let Some(phone) = draft.phone.as_deref() {
        let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
        let plausible = digits.len() == 10 || (digits.len() == 12 && digits.starts_with("91"));
        if !plausible {
            result.add_warning(format!("Phone number looks invalid: {}", phone));
        }
    }

    if let Some(raw) = draft.date_of_birth.as_deref() {
        match parse_flexible_date(raw) {
            None => result.add_error(format!("Invalid date of birth: {}", raw)),
            Some(dob) if dob > today => {
                result.add_error(format!("Date of birth {} is in the future", dob))
            }
            _ => {}
        }
    }

    if let Some(pin) = draft.pincode.as_deref() {
        if pin.len() != 6 || !pin.chars().all(|c| c.is_ascii_digit()) {
            result.add_warning(format!("Pincode looks invalid: {}", pin));
        }
    }

    result
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |s| s.trim().is_empty())
}

fn stale_cutoff(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_months(Months::new(12 * STALE_YEARS))
        .unwrap_or(today)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn valid_txn() -> TransactionDraft {
        TransactionDraft {
            customer_ref: Some("alice@example.com".to_string()),
            scheme_code: Some("HDFCTOP100".to_string()),
            txn_type: Some("Purchase".to_string()),
            txn_date: Some("2024-01-15".to_string()),
            amount: Some("1000".to_string()),
            units: Some("10".to_string()),
            nav: Some("100".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_transaction_has_no_errors_or_warnings() {
        let result = validate_transaction(&valid_txn(), today());
        assert!(result.is_valid, "errors: {:?}", result.errors);
        assert!(result.warnings.is_empty(), "warnings: {:?}", result.warnings);
    }

    #[test]
    fn test_one_message_per_missing_field() {
        let result = validate_transaction(&TransactionDraft::default(), today());
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 7);
        assert!(result.errors.iter().any(|e| e == "NAV is required"));
    }

    #[test]
    fn test_supplying_a_field_never_removes_other_errors() {
        let mut draft = valid_txn();
        draft.units = None;
        draft.nav = None;
        let before = validate_transaction(&draft, today());

        draft.units = Some("10".to_string());
        let after = validate_transaction(&draft, today());

        for error in &after.errors {
            assert!(
                before.errors.contains(error),
                "new unrelated error appeared: {}",
                error
            );
        }
        assert!(after.errors.iter().all(|e| e != "Units is required"));
        assert!(after.errors.iter().any(|e| e == "NAV is required"));
    }

    #[test]
    fn test_zero_amount_is_valid_but_absent_is_not() {
        let mut draft = valid_txn();
        draft.amount = Some("0".to_string());
        draft.units = Some("0".to_string());
        let result = validate_transaction(&draft, today());
        assert!(result.is_valid, "errors: {:?}", result.errors);

        draft.amount = None;
        let result = validate_transaction(&draft, today());
        assert!(result.errors.iter().any(|e| e == "Total amount is required"));
    }

    #[test]
    fn test_negative_amount_and_units_are_errors() {
        let mut draft = valid_txn();
        draft.amount = Some("-100".to_string());
        draft.units = Some("-1".to_string());
        let result = validate_transaction(&draft, today());
        assert!(result.errors.iter().any(|e| e == "Total amount cannot be negative"));
        assert!(result.errors.iter().any(|e| e == "Units cannot be negative"));
    }

    #[test]
    fn test_nav_must_be_positive() {
        let mut draft = valid_txn();
        draft.nav = Some("0".to_string());
        let result = validate_transaction(&draft, today());
        assert!(result.errors.iter().any(|e| e == "NAV must be greater than zero"));
    }

    #[test]
    fn test_non_numeric_amount_cites_the_value() {
        let mut draft = valid_txn();
        draft.amount = Some("abc".to_string());
        let result = validate_transaction(&draft, today());
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.contains("abc")), "{:?}", result.errors);
    }

    #[test]
    fn test_future_and_stale_dates_warn_without_blocking() {
        let mut draft = valid_txn();
        draft.txn_date = Some("2024-12-31".to_string());
        let result = validate_transaction(&draft, today());
        assert!(result.is_valid);
        assert!(result.warnings.iter().any(|w| w.contains("future")));

        draft.txn_date = Some("2010-01-01".to_string());
        let result = validate_transaction(&draft, today());
        assert!(result.is_valid);
        assert!(result.warnings.iter().any(|w| w.contains("10 years")));
    }

    #[test]
    fn test_amount_tolerance_boundary() {
        // units=10, NAV=100, computed 1000
        let cases = [
            ("1001", true),
            ("1000.99", false),
            ("1001.01", true),
            ("999", true),
            ("999.01", false),
            ("998.99", true),
            ("1000", false),
        ];
        for (stated, expect_warning) in cases {
            let mut draft = valid_txn();
            draft.amount = Some(stated.to_string());
            let result = validate_transaction(&draft, today());
            assert!(result.is_valid, "amount {} must stay valid", stated);
            let warned = result.warnings.iter().any(|w| w.contains("differs"));
            assert_eq!(
                warned, expect_warning,
                "amount {} warning mismatch: {:?}",
                stated, result.warnings
            );
        }
    }

    #[test]
    fn test_negative_stamp_duty_is_only_a_warning() {
        let mut draft = valid_txn();
        draft.stamp_duty = Some("-5".to_string());
        let result = validate_transaction(&draft, today());
        assert!(result.is_valid);
        assert!(result.warnings.iter().any(|w| w.contains("Stamp duty")));
    }

    #[test]
    fn test_customer_requires_name() {
        let result = validate_customer(&CustomerDraft::default(), today());
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec!["Name is required".to_string()]);
    }

    #[test]
    fn test_customer_email_and_pan_patterns() {
        let draft = CustomerDraft {
            name: Some("Alice".to_string()),
            email: Some("not-an-email".to_string()),
            pan: Some("WRONG".to_string()),
            ..Default::default()
        };
        let result = validate_customer(&draft, today());
        assert!(result.errors.iter().any(|e| e.contains("email")));
        assert!(result.errors.iter().any(|e| e.contains("PAN")));

        let draft = CustomerDraft {
            name: Some("Alice".to_string()),
            email: Some("alice@example.com".to_string()),
            pan: Some("ABCDE1234F".to_string()),
            ..Default::default()
        };
        assert!(validate_customer(&draft, today()).is_valid);
    }

    #[test]
    fn test_customer_dob_rules() {
        let draft = CustomerDraft {
            name: Some("Alice".to_string()),
            date_of_birth: Some("2099-01-01".to_string()),
            ..Default::default()
        };
        let result = validate_customer(&draft, today());
        assert!(result.errors.iter().any(|e| e.contains("future")));

        let draft = CustomerDraft {
            name: Some("Alice".to_string()),
            date_of_birth: Some("15/01/1980".to_string()),
            ..Default::default()
        };
        assert!(validate_customer(&draft, today()).is_valid);
    }

    #[test]
    fn test_customer_phone_and_pincode_warn_only() {
        let draft = CustomerDraft {
            name: Some("Alice".to_string()),
            phone: Some("12345".to_string()),
            pincode: Some("ABC".to_string()),
            ..Default::default()
        };
        let result = validate_customer(&draft, today());
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 2);
    }
}
