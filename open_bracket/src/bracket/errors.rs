//! Bracket error types.

use thiserror::Error;

/// Errors produced by bracket operations
#[derive(Debug, Error)]
pub enum BracketError {
    /// Malformed input: too few participants, bad seed permutation,
    /// equal or negative scores
    #[error("validation failed: {0}")]
    Validation(String),

    /// Operation conflicts with current bracket state: regeneration over
    /// live results, double completion without a correction flag,
    /// propagation precondition violated
    #[error("conflict: {0}")]
    Conflict(String),

    /// Unknown bracket or match id
    #[error("not found: {0}")]
    NotFound(String),

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BracketError {
    /// Get a client-safe error message that doesn't leak internals
    ///
    /// Database and serialization failures are collapsed to a generic
    /// message; the domain errors already name the violated invariant and
    /// are safe to expose.
    pub fn client_message(&self) -> String {
        match self {
            BracketError::Database(_) | BracketError::Serialization(_) => {
                "internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for bracket operations
pub type BracketResult<T> = Result<T, BracketError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_pass_through_client_message() {
        let err = BracketError::Validation("seed numbers not a permutation of 1..7".to_string());
        assert!(err.client_message().contains("permutation of 1..7"));

        let err = BracketError::Conflict("match already completed".to_string());
        assert!(err.client_message().contains("already completed"));
    }

    #[test]
    fn test_database_error_is_sanitized() {
        let err = BracketError::Database(sqlx::Error::PoolClosed);
        assert_eq!(err.client_message(), "internal server error");
    }
}
