//! Roulette table rules.
//!
//! This module holds everything that is a pure function of its inputs:
//! - The wheel layout and color resolution
//! - Bet entities and per-category constructors
//! - Bet validation, including the untyped JSON wire parser
//! - Payout multipliers and per-bet settlement

pub mod entities;
pub mod payout;
pub mod validation;
pub mod wheel;

pub use entities::{Amount, Bet, BetResult, BetType, Color, MAX_BET_AMOUNT, Number};
pub use payout::{multiplier, payout, settle_bets, wins};
pub use validation::{parse_bet, parse_bets, total_stake, validate_bet, validate_bets};
pub use wheel::color_of;
