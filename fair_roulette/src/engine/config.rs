//! Engine configuration.
//!
//! Consolidates the environment variables the engine reads and validates
//! them as a whole.

use crate::game::entities::{Amount, MAX_BET_AMOUNT};
use crate::ledger::LedgerConfig;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How a spin touches the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpinIsolation {
    /// Debit, draw, credit and history append run as one ledger operation.
    #[default]
    Atomic,
    /// Separate balance read, debit, credit, re-read and append. Two
    /// concurrent spins can overdraw the balance in this mode.
    Legacy,
}

impl std::fmt::Display for SpinIsolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpinIsolation::Atomic => write!(f, "atomic"),
            SpinIsolation::Legacy => write!(f, "legacy"),
        }
    }
}

impl FromStr for SpinIsolation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "atomic" => Ok(SpinIsolation::Atomic),
            "legacy" => Ok(SpinIsolation::Legacy),
            other => Err(ConfigError::Invalid {
                var: "SPIN_ISOLATION".to_string(),
                reason: format!("Unknown mode '{other}' (expected atomic or legacy)"),
            }),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Starting balance, restored on reset
    pub initial_balance: Amount,
    /// Ceiling for a single history read
    pub max_history_limit: usize,
    /// History limit used when the caller gives none
    pub default_history_limit: usize,
    /// Entries kept in memory
    pub history_retention: usize,
    /// Spin isolation mode
    pub isolation: SpinIsolation,
    /// Ledger inbox capacity
    pub ledger_queue_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_balance: 1000,
            max_history_limit: 100,
            default_history_limit: 10,
            history_retention: 10_000,
            isolation: SpinIsolation::Atomic,
            ledger_queue_capacity: 100,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to
    /// [`EngineConfig::default`] for anything unset.
    ///
    /// # Errors
    ///
    /// Returns error if `SPIN_ISOLATION` is set to an unknown mode
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let isolation = match std::env::var("SPIN_ISOLATION") {
            Ok(value) => value.parse()?,
            Err(_) => defaults.isolation,
        };

        Ok(Self {
            initial_balance: parse_env_or("INITIAL_BALANCE", defaults.initial_balance),
            max_history_limit: parse_env_or("MAX_HISTORY_LIMIT", defaults.max_history_limit),
            default_history_limit: parse_env_or(
                "DEFAULT_HISTORY_LIMIT",
                defaults.default_history_limit,
            ),
            history_retention: parse_env_or("HISTORY_RETENTION", defaults.history_retention),
            isolation,
            ledger_queue_capacity: parse_env_or(
                "LEDGER_QUEUE_CAPACITY",
                defaults.ledger_queue_capacity,
            ),
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0..=MAX_BET_AMOUNT).contains(&self.initial_balance) {
            return Err(ConfigError::Invalid {
                var: "INITIAL_BALANCE".to_string(),
                reason: format!("Must be between 0 and {MAX_BET_AMOUNT}"),
            });
        }

        if self.max_history_limit == 0 {
            return Err(ConfigError::Invalid {
                var: "MAX_HISTORY_LIMIT".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.default_history_limit == 0 || self.default_history_limit > self.max_history_limit
        {
            return Err(ConfigError::Invalid {
                var: "DEFAULT_HISTORY_LIMIT".to_string(),
                reason: format!("Must be between 1 and {}", self.max_history_limit),
            });
        }

        if self.history_retention < self.max_history_limit {
            return Err(ConfigError::Invalid {
                var: "HISTORY_RETENTION".to_string(),
                reason: format!(
                    "Must be at least max history limit ({})",
                    self.max_history_limit
                ),
            });
        }

        if self.ledger_queue_capacity == 0 {
            return Err(ConfigError::Invalid {
                var: "LEDGER_QUEUE_CAPACITY".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// The slice of this configuration the ledger needs.
    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            initial_balance: self.initial_balance,
            max_history_limit: self.max_history_limit,
            history_retention: self.history_retention,
            queue_capacity: self.ledger_queue_capacity,
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
pub fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 6] = [
        "INITIAL_BALANCE",
        "MAX_HISTORY_LIMIT",
        "DEFAULT_HISTORY_LIMIT",
        "HISTORY_RETENTION",
        "SPIN_ISOLATION",
        "LEDGER_QUEUE_CAPACITY",
    ];

    fn clear_env() {
        for var in VARS {
            // SAFETY: env-mutating tests are serialized with #[serial]
            unsafe { std::env::remove_var(var) };
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.initial_balance, 1000);
        assert_eq!(config.max_history_limit, 100);
        assert_eq!(config.default_history_limit, 10);
        assert_eq!(config.isolation, SpinIsolation::Atomic);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_from_env_uses_defaults_when_unset() {
        clear_env();
        assert_eq!(EngineConfig::from_env().unwrap(), EngineConfig::default());
    }

    #[test]
    #[serial]
    fn test_from_env_reads_overrides() {
        clear_env();
        // SAFETY: env-mutating tests are serialized with #[serial]
        unsafe {
            std::env::set_var("INITIAL_BALANCE", "5000");
            std::env::set_var("MAX_HISTORY_LIMIT", "50");
            std::env::set_var("SPIN_ISOLATION", "Legacy");
            std::env::set_var("LEDGER_QUEUE_CAPACITY", "not-a-number");
        }

        let config = EngineConfig::from_env().unwrap();
        clear_env();

        assert_eq!(config.initial_balance, 5000);
        assert_eq!(config.max_history_limit, 50);
        assert_eq!(config.isolation, SpinIsolation::Legacy);
        assert_eq!(config.ledger_queue_capacity, 100);
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_unknown_isolation() {
        clear_env();
        // SAFETY: env-mutating tests are serialized with #[serial]
        unsafe { std::env::set_var("SPIN_ISOLATION", "optimistic") };

        let result = EngineConfig::from_env();
        clear_env();

        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_validation_failures() {
        let invalid = [
            EngineConfig {
                initial_balance: -1,
                ..Default::default()
            },
            EngineConfig {
                initial_balance: MAX_BET_AMOUNT + 1,
                ..Default::default()
            },
            EngineConfig {
                initial_balance: Amount::MAX - 5,
                ..Default::default()
            },
            EngineConfig {
                max_history_limit: 0,
                ..Default::default()
            },
            EngineConfig {
                default_history_limit: 101,
                ..Default::default()
            },
            EngineConfig {
                history_retention: 99,
                ..Default::default()
            },
            EngineConfig {
                ledger_queue_capacity: 0,
                ..Default::default()
            },
        ];

        for config in invalid {
            assert!(
                matches!(config.validate(), Err(ConfigError::Invalid { .. })),
                "{config:?}"
            );
        }
    }

    #[test]
    fn test_initial_balance_bounds_accepted() {
        for initial_balance in [0, MAX_BET_AMOUNT] {
            let config = EngineConfig {
                initial_balance,
                ..Default::default()
            };
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn test_ledger_config_slice() {
        let ledger = EngineConfig::default().ledger_config();
        assert_eq!(ledger, LedgerConfig::default());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Invalid {
            var: "MAX_HISTORY_LIMIT".to_string(),
            reason: "Must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("MAX_HISTORY_LIMIT"));
    }
}
