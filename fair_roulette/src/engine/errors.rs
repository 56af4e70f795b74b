//! Engine error types.

use crate::game::entities::Amount;
use crate::ledger::LedgerError;
use thiserror::Error;

/// Errors surfaced by spin processing
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// Malformed bet or batch
    #[error("{0}")]
    Validation(String),

    /// Unrecognized bet category
    #[error("Unknown bet type: {0}")]
    InvalidBetType(String),

    /// Stake exceeds the balance
    #[error("Total bet amount ({required}) exceeds balance ({available})")]
    InsufficientBalance { required: Amount, available: Amount },

    /// Failure after a spin started; details are for logs only
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Validation(_) => "INVALID_BET",
            EngineError::InvalidBetType(_) => "INVALID_BET_TYPE",
            EngineError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            EngineError::Internal(_) => "SERVER_ERROR",
        }
    }

    /// Get a client-safe error message that doesn't leak internal details
    pub fn client_message(&self) -> String {
        match self {
            EngineError::Internal(_) => "An unexpected error occurred".to_string(),
            _ => self.to_string(),
        }
    }

    /// Whether the caller is at fault (a 4xx-class error).
    pub fn is_client_error(&self) -> bool {
        !matches!(self, EngineError::Internal(_))
    }
}

impl From<LedgerError> for EngineError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientBalance {
                available,
                required,
            } => EngineError::InsufficientBalance {
                required,
                available,
            },
            other => EngineError::Internal(other.to_string()),
        }
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
