//! # Fair Roulette
//!
//! A provably fair, single-zero roulette settlement engine.
//!
//! Bets are validated, an outcome is drawn from a committed server seed, and
//! every bet is paid against it. Balance and history live in a ledger actor
//! that applies all mutations in one total order, so concurrent spins can
//! never jointly overdraw the balance.
//!
//! ## Core Modules
//!
//! - [`game`]: Wheel layout, bet entities, validation and payouts
//! - [`rng`]: Seed and nonce driven outcome generation with reveal-based verification
//! - [`ledger`]: Actor owning the balance and the spin history
//! - [`engine`]: Spin orchestration, configuration and errors
//!
//! ## Provable Fairness
//!
//! The hash of the server seed is published before play. Each draw hashes
//! `"{server_seed}-{client_seed}-{nonce}"`, and the seed is revealed on
//! reset so players can recompute every outcome with [`rng::verify_draw`].

/// Spin orchestration, configuration and errors.
pub mod engine;
pub use engine::{
    ConfigError, EngineConfig, EngineError, EngineResult, FairnessCommitment, RouletteEngine,
    SpinIsolation, SpinResult,
};

/// Table rules: wheel, bets, validation and payouts.
pub mod game;
pub use game::{Amount, Bet, BetResult, BetType, Color, Number};

/// Balance and history actor.
pub mod ledger;
pub use ledger::{HistoryEntry, LedgerActor, LedgerConfig, LedgerError, LedgerHandle};

/// Provably fair outcome generation.
pub mod rng;
pub use rng::{DrawProof, ProvablyFairRng, SeedReveal, verify_draw};
