//! Spin engine composing the table rules, the outcome generator and the
//! ledger into one settlement per request.
//!
//! ## Example
//!
//! ```
//! use fair_roulette::engine::{EngineConfig, RouletteEngine};
//! use fair_roulette::game::Bet;
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = RouletteEngine::new(EngineConfig::default());
//!
//!     let result = engine
//!         .process_spin(vec![Bet::red(10).unwrap(), Bet::straight(17, 5).unwrap()])
//!         .await
//!         .unwrap();
//!
//!     assert_eq!(result.new_balance, 1000 - 15 + result.total_return);
//! }
//! ```

pub mod config;
pub mod errors;
pub mod models;
pub mod spin;

pub use config::{ConfigError, EngineConfig, SpinIsolation, parse_env_or};
pub use errors::{EngineError, EngineResult};
pub use models::{FairnessCommitment, SpinResult};
pub use spin::{MAX_CLIENT_SEED_LEN, RouletteEngine};
