//! Engine data models.

use crate::game::entities::{Amount, BetResult, Color, Number};
use serde::{Deserialize, Serialize};

/// Result of one settled spin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinResult {
    #[serde(rename = "winningNumber")]
    pub outcome: Number,

    #[serde(rename = "winningColor")]
    pub color: Color,

    #[serde(rename = "totalBetAmount")]
    pub total_stake: Amount,

    #[serde(rename = "totalWinAmount")]
    pub total_return: Amount,

    /// `total_return - total_stake`
    pub net_profit: Amount,

    /// Balance right after this spin was applied
    pub new_balance: Amount,

    #[serde(rename = "bets")]
    pub bet_results: Vec<BetResult>,

    pub client_seed: String,
    pub nonce: u64,

    /// Commitment to the seed this outcome was drawn from
    pub server_seed_hash: String,
}

/// Public fairness state: the current commitment and the next nonce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FairnessCommitment {
    pub server_seed_hash: String,
    pub nonce: u64,
}
