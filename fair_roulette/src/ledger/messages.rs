//! Ledger actor message types.

use super::errors::LedgerResult;
use super::models::{HistoryEntry, ResetFn, SettleFn};
use crate::game::entities::Amount;
use tokio::sync::oneshot;

/// Messages that can be sent to a LedgerActor
pub enum LedgerMessage {
    /// Read the balance in queue order
    GetBalance { response: oneshot::Sender<Amount> },

    /// Overwrite the balance
    SetBalance {
        amount: Amount,
        response: oneshot::Sender<()>,
    },

    /// Credit without a funds check
    AddToBalance {
        amount: Amount,
        response: oneshot::Sender<LedgerResult<Amount>>,
    },

    /// Debit without a funds check; may leave the balance negative
    SubtractFromBalance {
        amount: Amount,
        response: oneshot::Sender<LedgerResult<Amount>>,
    },

    /// Check and debit as one step
    DebitIfSufficient {
        amount: Amount,
        response: oneshot::Sender<LedgerResult<Amount>>,
    },

    /// Credit and append a history entry as one step
    CreditAndRecord {
        amount: Amount,
        entry: HistoryEntry,
        response: oneshot::Sender<LedgerResult<Amount>>,
    },

    /// Append a history entry
    AppendHistory {
        entry: HistoryEntry,
        response: oneshot::Sender<()>,
    },

    /// Most recent entries, newest first
    GetHistory {
        limit: usize,
        response: oneshot::Sender<Vec<HistoryEntry>>,
    },

    /// Debit, run the settlement, then credit and record, as one step
    Settle {
        stake: Amount,
        settlement: SettleFn,
        response: oneshot::Sender<LedgerResult<Amount>>,
    },

    /// Run `reseed`, then restore the initial balance and clear history, as
    /// one step
    Reset {
        reseed: ResetFn,
        response: oneshot::Sender<LedgerResult<Amount>>,
    },
}

impl std::fmt::Debug for LedgerMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GetBalance { .. } => write!(f, "GetBalance"),
            Self::SetBalance { amount, .. } => write!(f, "SetBalance({amount})"),
            Self::AddToBalance { amount, .. } => write!(f, "AddToBalance({amount})"),
            Self::SubtractFromBalance { amount, .. } => write!(f, "SubtractFromBalance({amount})"),
            Self::DebitIfSufficient { amount, .. } => write!(f, "DebitIfSufficient({amount})"),
            Self::CreditAndRecord { amount, .. } => write!(f, "CreditAndRecord({amount})"),
            Self::AppendHistory { .. } => write!(f, "AppendHistory"),
            Self::GetHistory { limit, .. } => write!(f, "GetHistory({limit})"),
            Self::Settle { stake, .. } => write!(f, "Settle({stake})"),
            Self::Reset { .. } => write!(f, "Reset"),
        }
    }
}
