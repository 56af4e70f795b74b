//! Ledger error types.

use crate::game::entities::Amount;
use thiserror::Error;

/// Ledger errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The ledger worker has stopped
    #[error("Ledger is closed")]
    Closed,

    /// Insufficient balance for a debit
    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: Amount, required: Amount },

    /// Negative amount passed to a checked operation
    #[error("Invalid amount: {0}")]
    InvalidAmount(Amount),

    /// Settlement closure failed; the debit was rolled back
    #[error("Settlement failed: {0}")]
    SettlementFailed(String),

    /// Balance arithmetic left the representable range; nothing changed
    #[error("Balance overflow: {balance} {op} {amount}")]
    Overflow {
        balance: Amount,
        op: char,
        amount: Amount,
    },

    /// Reseed closure failed; balance and history were left as they were
    #[error("Reset failed: {0}")]
    ResetFailed(String),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
