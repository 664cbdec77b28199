//! Internal helpers for input validation and normalization.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every engine entry point enforces the same field rules.

use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, MoneyCents, ResultEngine};

/// Trim, NFC-normalize and require at least `min_chars` characters.
pub(crate) fn normalize_required_text(
    value: &str,
    label: &str,
    min_chars: usize,
) -> ResultEngine<String> {
    let normalized: String = value.trim().nfc().collect();
    if normalized.chars().count() < min_chars {
        return Err(EngineError::Validation(if min_chars <= 1 {
            format!("{label} must not be empty")
        } else {
            format!("{label} must have at least {min_chars} characters")
        }));
    }
    Ok(normalized)
}

/// Blank optional text becomes `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.nfc().collect())
}

/// Lowercase and check the `local@domain.tld` shape.
pub(crate) fn normalize_email(value: &str) -> ResultEngine<String> {
    let email = value.trim().to_lowercase();
    let invalid = || EngineError::Validation("email is not a valid address".to_string());

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let mut labels = domain.split('.');
    let valid_domain = domain.contains('.') && labels.all(|label| !label.is_empty());
    if !valid_domain {
        return Err(invalid());
    }
    Ok(email)
}

/// At least 8 characters with an uppercase, a lowercase and a digit.
pub(crate) fn validate_password_strength(password: &str) -> ResultEngine<()> {
    let long_enough = password.chars().count() >= 8;
    let has_upper = password.chars().any(char::is_uppercase);
    let has_lower = password.chars().any(char::is_lowercase);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(long_enough && has_upper && has_lower && has_digit) {
        return Err(EngineError::BusinessRule(
            "password must have at least 8 characters, including uppercase, lowercase and digits"
                .to_string(),
        ));
    }
    Ok(())
}

/// Validates price and quantity, returning the quantity as stored.
pub(crate) fn validate_line_item(unit_price: MoneyCents, quantity: i64) -> ResultEngine<i32> {
    if unit_price.is_negative() {
        return Err(EngineError::InvalidAmount(
            "unit price must be >= 0".to_string(),
        ));
    }
    if quantity < 1 {
        return Err(EngineError::Validation("quantity must be >= 1".to_string()));
    }
    let quantity = i32::try_from(quantity)
        .map_err(|_| EngineError::Validation("quantity too large".to_string()))?;
    unit_price
        .checked_mul(i64::from(quantity))
        .ok_or_else(|| EngineError::InvalidAmount("line total too large".to_string()))?;
    Ok(quantity)
}
