//! Unified error type for the crate.

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: Decimal },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Import error: {message}")]
    Import { message: String },
}

impl Error {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub(crate) const fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }
}

/// Reports the first failing field, by field name, so the error is stable.
impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by_key(|(field, _)| *field);

        let Some((field, failures)) = fields.into_iter().next() else {
            return Self::validation("form", "is invalid");
        };
        let message = failures.first().map_or_else(
            || "is invalid".to_string(),
            |failure| {
                failure
                    .message
                    .as_ref()
                    .map_or_else(|| failure.code.to_string(), ToString::to_string)
            },
        );
        Self::validation(field, message)
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
