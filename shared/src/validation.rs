//! Input validation helpers
//!
//! Centralized text length constants and validation functions, run before a
//! payload leaves the console. Failures are field-bound validation errors.

use rust_decimal::Decimal;

use crate::error::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: product, category, brand, branch, etc.
pub const MAX_NAME_LEN: usize = 200;

/// Notes, descriptions, report details
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone, barcode, username
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Passwords (before hashing)
pub const MIN_PASSWORD_LEN: usize = 4;
pub const MAX_PASSWORD_LEN: usize = 128;

/// Addresses / branch locations
pub const MAX_ADDRESS_LEN: usize = 500;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::field(field, format!("{field} must not be empty")));
    }
    validate_len(value, field, max_len)
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    match value {
        Some(v) => validate_len(v, field, max_len),
        None => Ok(()),
    }
}

fn validate_len(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    let len = value.chars().count();
    if len > max_len {
        return Err(AppError::field(
            field,
            format!("{field} is too long ({len} chars, max {max_len})"),
        ));
    }
    Ok(())
}

/// Validate a password's length bounds.
pub fn validate_password(value: &str, field: &str) -> Result<(), AppError> {
    let len = value.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(AppError::field(
            field,
            format!("{field} must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    validate_len(value, field, MAX_PASSWORD_LEN)
}

/// Validate that an amount is zero or positive.
pub fn validate_non_negative(value: Decimal, field: &str) -> Result<(), AppError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AppError::field(field, format!("{field} must not be negative")));
    }
    Ok(())
}

/// Validate that an optional amount, if present, is zero or positive.
pub fn validate_optional_non_negative(value: Option<Decimal>, field: &str) -> Result<(), AppError> {
    match value {
        Some(v) => validate_non_negative(v, field),
        None => Ok(()),
    }
}

/// Validate that a count is zero or positive.
pub fn validate_count(value: i64, field: &str) -> Result<(), AppError> {
    if value < 0 {
        return Err(AppError::field(field, format!("{field} must not be negative")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::Value;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Cola", "name", MAX_NAME_LEN).is_ok());

        let err = validate_required_text("   ", "name", MAX_NAME_LEN).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.detail("field"), Some(&Value::from("name")));

        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(validate_required_text(&long, "name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        let name = "é".repeat(MAX_SHORT_TEXT_LEN);
        assert!(validate_required_text(&name, "name", MAX_SHORT_TEXT_LEN).is_ok());
    }

    #[test]
    fn test_optional_text() {
        assert!(validate_optional_text(&None, "phone", 3).is_ok());
        assert!(validate_optional_text(&Some("1234".into()), "phone", 3).is_err());
    }

    #[test]
    fn test_password_bounds() {
        assert!(validate_password("abc", "password").is_err());
        assert!(validate_password("abcd", "password").is_ok());
    }

    #[test]
    fn test_amounts() {
        assert!(validate_non_negative(Decimal::ZERO, "salary").is_ok());
        assert!(validate_non_negative(Decimal::from(-1), "salary").is_err());
        assert!(validate_optional_non_negative(None, "salary").is_ok());
        assert!(validate_count(-3, "quantity").is_err());
    }
}
