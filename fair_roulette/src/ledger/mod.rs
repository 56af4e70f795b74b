//! Ledger module owning the balance and the spin history.
//!
//! This module implements:
//! - LedgerActor: a Tokio task that owns the balance and history log
//! - LedgerHandle: a cloneable handle that queues requests to the actor
//! - Checked primitives (`debit_if_sufficient`, `credit_and_record`)
//! - A fully folded `settle` unit of work with rollback
//!
//! ## Architecture
//!
//! All mutations travel through one bounded mpsc inbox and are applied in
//! arrival order. Replies come back on oneshot channels. The latest balance
//! is also published on a watch channel so callers can take a snapshot
//! without queueing behind pending work.
//!
//! ## Example
//!
//! ```
//! use fair_roulette::ledger::{LedgerActor, LedgerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let ledger = LedgerActor::spawn(LedgerConfig::default());
//!
//!     let balance = ledger.debit_if_sufficient(250).await.unwrap();
//!     assert_eq!(balance, 750);
//!     assert!(ledger.debit_if_sufficient(1000).await.is_err());
//! }
//! ```

pub mod actor;
pub mod config;
pub mod errors;
pub mod messages;
pub mod models;

pub use actor::{LedgerActor, LedgerHandle};
pub use config::LedgerConfig;
pub use errors::{LedgerError, LedgerResult};
pub use messages::LedgerMessage;
pub use models::{HistoryEntry, ResetFn, SettleFn, Settlement};
