//! Ledger configuration.

use crate::game::entities::Amount;
use serde::{Deserialize, Serialize};

/// Ledger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Balance on creation and after reset (default: 1000)
    pub initial_balance: Amount,

    /// Ceiling for a single history read (default: 100)
    pub max_history_limit: usize,

    /// Entries kept in memory; older ones are dropped (default: 10,000)
    pub history_retention: usize,

    /// Bounded inbox size (default: 100)
    pub queue_capacity: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            initial_balance: 1000,
            max_history_limit: 100,
            history_retention: 10_000,
            queue_capacity: 100,
        }
    }
}
