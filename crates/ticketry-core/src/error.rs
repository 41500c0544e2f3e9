//! Error types for Ticketry

use thiserror::Error;

/// Result type alias using Ticketry's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Ticketry error types
///
/// Every error raised inside a module operation aborts the surrounding unit
/// of work; none of them are retried.
#[derive(Error, Debug)]
pub enum Error {
    // Input errors (E001-E099)
    #[error("Validation failed: {0}")]
    Validation(String),

    // Entity errors (E100-E199)
    #[error("{entity} with ID '{id}' not found")]
    NotFound { entity: &'static str, id: i64 },

    // Cross-module / invariant errors (E200-E299)
    #[error("{0}")]
    InvalidOperation(String),

    // Database errors (E400-E499)
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Corrupt stored data: {0}")]
    Parse(String),

    #[error("Unit of work is no longer active (already committed or rolled back)")]
    TransactionClosed,

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl Error {
    /// Build a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Build a not-found error for an entity kind and raw id
    pub fn not_found(entity: &'static str, id: impl Into<i64>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Build a referential-integrity / invariant error
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    /// Build the error raised when a foreign reference does not exist in its owning module
    pub fn missing_reference(entity: &'static str, id: impl Into<i64>) -> Self {
        Self::InvalidOperation(format!("{} with ID '{}' does not exist", entity, id.into()))
    }

    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E001",
            Self::NotFound { .. } => "E100",
            Self::InvalidOperation(_) => "E200",
            Self::DatabaseError(_) => "E400",
            Self::Parse(_) => "E401",
            Self::TransactionClosed => "E402",
            Self::ConfigError(_) => "E600",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::NotFound { entity, .. } => Some(format!(
                "ticketry {} list",
                entity.to_lowercase()
            )),
            Self::ConfigError(_) => Some("ticketry config show".to_string()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, Self::InvalidOperation(_))
    }
}
