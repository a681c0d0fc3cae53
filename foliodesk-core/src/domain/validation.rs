//! Per-record validation outcome

use serde::{Deserialize, Serialize};

/// Outcome of validating one candidate record.
///
/// Errors block commit; warnings never do. The duplicate flag is filled in
/// by the orchestrator after the store probe, not by the validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub is_duplicate: bool,
    pub duplicate_reason: Option<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            is_duplicate: false,
            duplicate_reason: None,
        }
    }

    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
        self.is_valid = false;
    }

    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn mark_duplicate(&mut self, reason: impl Into<String>) {
        self.is_duplicate = true;
        self.duplicate_reason = Some(reason.into());
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_invalidate_warnings_do_not() {
        let mut r = ValidationResult::new();
        assert!(r.is_valid);

        r.add_warning("date is in the future");
        assert!(r.is_valid);
        assert_eq!(r.warnings.len(), 1);

        r.add_error("NAV is required");
        assert!(!r.is_valid);
        assert_eq!(r.errors.len(), 1);
    }

    #[test]
    fn test_duplicate_flag_does_not_invalidate() {
        let mut r = ValidationResult::new();
        r.mark_duplicate("1 committed record matches this key");
        assert!(r.is_valid);
        assert!(r.is_duplicate);
        assert!(r.duplicate_reason.unwrap().contains("1 committed"));
    }
}
