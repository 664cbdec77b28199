//! The module contains the errors the engine can throw.
//!
//! Every variant corresponds to one class of failure a caller must handle:
//!
//! - [`Validation`] and [`InvalidAmount`]: malformed input fields.
//! - [`KeyNotFound`]: the referenced entity does not exist.
//! - [`Forbidden`]: the entity exists but belongs to another user.
//! - [`ExistingKey`]: a uniqueness rule (email, barcode) would be broken.
//! - [`Unauthorized`]: bad credentials or an invalid/expired/revoked token.
//! - [`BusinessRule`]: the request is well formed but not allowed right now
//!   (weak password, finalizing an empty purchase, ...).
//!
//!  [`Validation`]: EngineError::Validation
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`Unauthorized`]: EngineError::Unauthorized
//!  [`BusinessRule`]: EngineError::BusinessRule
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("{0}")]
    BusinessRule(String),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Maps a unique-constraint violation to [`EngineError::ExistingKey`].
    ///
    /// Covers the race where two requests pass the existence check before
    /// either one inserts.
    pub(crate) fn from_insert(err: DbErr, key: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::ExistingKey(key.to_string()),
            _ => Self::Database(err),
        }
    }

    /// Stable machine readable code for this error class.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::InvalidAmount(_) => "validation_error",
            Self::KeyNotFound(_) => "not_found",
            Self::Forbidden(_) => "forbidden",
            Self::ExistingKey(_) => "conflict",
            Self::Unauthorized(_) => "unauthorized",
            Self::BusinessRule(_) => "business_rule_violation",
            Self::Internal(_) | Self::Database(_) => "internal_error",
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::BusinessRule(a), Self::BusinessRule(b)) => a == b,
            (Self::Internal(a), Self::Internal(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
