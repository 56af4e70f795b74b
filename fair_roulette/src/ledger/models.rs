//! Ledger data models.

use crate::game::entities::{Amount, Color, Number};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of one settled spin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,

    #[serde(rename = "winningNumber")]
    pub outcome: Number,

    #[serde(rename = "winningColor")]
    pub color: Color,

    #[serde(rename = "totalBetAmount")]
    pub total_stake: Amount,

    #[serde(rename = "totalWinAmount")]
    pub total_return: Amount,

    pub net_profit: Amount,

    /// Client seed the outcome was drawn with
    pub client_seed: String,

    /// Nonce the outcome was drawn with
    pub nonce: u64,

    /// Commitment of the server seed the outcome was drawn with
    pub server_seed_hash: String,
}

/// What a settlement closure hands back to the ledger: the amount to credit
/// and the history entry to record, applied together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub total_return: Amount,
    pub entry: HistoryEntry,
}

/// Work run by the ledger between the debit and the credit of a folded
/// settlement. An `Err` rolls the debit back.
pub type SettleFn = Box<dyn FnOnce() -> Result<Settlement, String> + Send>;

/// Work run by the ledger as part of a reset, before balance and history are
/// restored. An `Err` leaves the ledger untouched.
pub type ResetFn = Box<dyn FnOnce() -> Result<(), String> + Send>;
