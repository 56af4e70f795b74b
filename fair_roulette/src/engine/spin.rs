//! Spin orchestration.

use super::{
    config::{EngineConfig, SpinIsolation},
    errors::{EngineError, EngineResult},
    models::{FairnessCommitment, SpinResult},
};
use crate::{
    game::{
        self, Amount, Bet, BetResult, Color,
        validation::{parse_bets, validate_bets},
    },
    ledger::{HistoryEntry, LedgerActor, LedgerHandle, Settlement},
    rng::{DEFAULT_CLIENT_SEED, DrawProof, ProvablyFairRng, SeedReveal},
};
use chrono::Utc;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};

/// Longest client seed accepted, in characters.
pub const MAX_CLIENT_SEED_LEN: usize = 128;

/// Drawn and settled spin, before it is applied to the ledger.
struct SpinOutcome {
    proof: DrawProof,
    color: Color,
    bet_results: Vec<BetResult>,
    total_return: Amount,
}

impl SpinOutcome {
    fn history_entry(&self, total_stake: Amount) -> HistoryEntry {
        HistoryEntry {
            timestamp: Utc::now(),
            outcome: self.proof.outcome,
            color: self.color,
            total_stake,
            total_return: self.total_return,
            net_profit: self.total_return - total_stake,
            client_seed: self.proof.client_seed.clone(),
            nonce: self.proof.nonce,
            server_seed_hash: self.proof.server_seed_hash.clone(),
        }
    }

    fn into_result(self, total_stake: Amount, new_balance: Amount) -> SpinResult {
        SpinResult {
            outcome: self.proof.outcome,
            color: self.color,
            total_stake,
            total_return: self.total_return,
            net_profit: self.total_return - total_stake,
            new_balance,
            bet_results: self.bet_results,
            client_seed: self.proof.client_seed,
            nonce: self.proof.nonce,
            server_seed_hash: self.proof.server_seed_hash,
        }
    }
}

fn lock_rng(rng: &Mutex<ProvablyFairRng>) -> EngineResult<MutexGuard<'_, ProvablyFairRng>> {
    rng.lock()
        .map_err(|_| EngineError::Internal("outcome generator lock poisoned".to_string()))
}

/// Draw an outcome and settle every bet against it.
fn draw_and_settle(
    rng: &Mutex<ProvablyFairRng>,
    bets: &[Bet],
    client_seed: &str,
) -> EngineResult<SpinOutcome> {
    let proof = lock_rng(rng)?.draw_with_proof(client_seed);
    let (bet_results, total_return) = game::settle_bets(bets, proof.outcome)?;

    Ok(SpinOutcome {
        color: game::color_of(proof.outcome),
        proof,
        bet_results,
        total_return,
    })
}

fn resolve_client_seed(client_seed: Option<&str>) -> EngineResult<String> {
    match client_seed {
        None => Ok(DEFAULT_CLIENT_SEED.to_string()),
        Some(seed) if (1..=MAX_CLIENT_SEED_LEN).contains(&seed.chars().count()) => {
            Ok(seed.to_string())
        }
        Some(_) => Err(EngineError::Validation(format!(
            "Client seed must be 1-{MAX_CLIENT_SEED_LEN} characters"
        ))),
    }
}

/// Roulette engine owning a ledger and an outcome generator.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct RouletteEngine {
    config: EngineConfig,
    ledger: LedgerHandle,
    rng: Arc<Mutex<ProvablyFairRng>>,
}

impl RouletteEngine {
    /// Create an engine with a freshly seeded generator.
    ///
    /// Spawns the ledger worker, so this must run inside a Tokio runtime.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_rng(config, ProvablyFairRng::new())
    }

    /// Create an engine around an existing generator.
    pub fn with_rng(config: EngineConfig, rng: ProvablyFairRng) -> Self {
        let ledger = LedgerActor::spawn(config.ledger_config());
        log::info!(
            "Roulette engine ready: balance {}, isolation {}, commitment {}",
            config.initial_balance,
            config.isolation,
            rng.server_seed_hash()
        );

        Self {
            config,
            ledger,
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn ledger(&self) -> &LedgerHandle {
        &self.ledger
    }

    /// Settle one spin with the default client seed.
    pub async fn process_spin(&self, bets: Vec<Bet>) -> EngineResult<SpinResult> {
        self.process_spin_with_seed(bets, None).await
    }

    /// Settle one spin.
    ///
    /// Validation and funds failures return before anything changes, and no
    /// nonce is consumed.
    ///
    /// # Arguments
    ///
    /// * `bets` - Wagers placed on this spin
    /// * `client_seed` - Player-chosen seed mixed into the draw
    ///
    /// # Errors
    ///
    /// * `Validation` / `InvalidBetType` - malformed bets or client seed
    /// * `InsufficientBalance` - total stake exceeds the balance
    /// * `Internal` - the spin failed after it started
    pub async fn process_spin_with_seed(
        &self,
        bets: Vec<Bet>,
        client_seed: Option<&str>,
    ) -> EngineResult<SpinResult> {
        let result = self.settle_spin(bets, client_seed).await;

        match &result {
            Ok(spin) => log::debug!(
                "Spin settled: outcome {} ({}), stake {}, return {}, balance {}",
                spin.outcome,
                spin.color,
                spin.total_stake,
                spin.total_return,
                spin.new_balance
            ),
            Err(err) if err.is_client_error() => log::info!("Spin rejected: {err}"),
            Err(err) => log::error!("Spin failed: {err}"),
        }

        result
    }

    /// Parse bets from untyped JSON and settle them.
    pub async fn process_spin_json(
        &self,
        bets: &Value,
        client_seed: Option<&str>,
    ) -> EngineResult<SpinResult> {
        let bets = match parse_bets(bets) {
            Ok(bets) => bets,
            Err(err) => {
                log::info!("Spin rejected: {err}");
                return Err(err);
            }
        };
        self.process_spin_with_seed(bets, client_seed).await
    }

    async fn settle_spin(
        &self,
        bets: Vec<Bet>,
        client_seed: Option<&str>,
    ) -> EngineResult<SpinResult> {
        validate_bets(&bets)?;
        let total_stake = game::total_stake(&bets)?;
        let client_seed = resolve_client_seed(client_seed)?;

        match self.config.isolation {
            SpinIsolation::Atomic => self.settle_atomic(bets, total_stake, client_seed).await,
            SpinIsolation::Legacy => self.settle_legacy(bets, total_stake, client_seed).await,
        }
    }

    /// Debit, draw, credit and record inside one ledger operation.
    async fn settle_atomic(
        &self,
        bets: Vec<Bet>,
        total_stake: Amount,
        client_seed: String,
    ) -> EngineResult<SpinResult> {
        let rng = Arc::clone(&self.rng);

        let (new_balance, outcome) = self
            .ledger
            .settle(total_stake, move || {
                let outcome =
                    draw_and_settle(&rng, &bets, &client_seed).map_err(|e| e.to_string())?;
                let settlement = Settlement {
                    total_return: outcome.total_return,
                    entry: outcome.history_entry(total_stake),
                };
                Ok((settlement, outcome))
            })
            .await?;

        Ok(outcome.into_result(total_stake, new_balance))
    }

    /// Each step is its own ledger operation, with an unqueued balance read
    /// for the funds check. Concurrent spins can interleave between the
    /// check and the debit and overdraw the balance.
    async fn settle_legacy(
        &self,
        bets: Vec<Bet>,
        total_stake: Amount,
        client_seed: String,
    ) -> EngineResult<SpinResult> {
        let available = self.ledger.balance_snapshot();
        if total_stake > available {
            return Err(EngineError::InsufficientBalance {
                required: total_stake,
                available,
            });
        }

        self.ledger.subtract_from_balance(total_stake).await?;

        // No rollback here: a failure leaves the stake debited.
        let outcome = draw_and_settle(&self.rng, &bets, &client_seed)?;

        self.ledger.add_to_balance(outcome.total_return).await?;
        let new_balance = self.ledger.balance_snapshot();
        self.ledger
            .append_history(outcome.history_entry(total_stake))
            .await?;

        Ok(outcome.into_result(total_stake, new_balance))
    }

    /// Balance after every operation queued so far.
    pub async fn balance(&self) -> EngineResult<Amount> {
        Ok(self.ledger.get_balance().await?)
    }

    /// Most recent spins, newest first.
    ///
    /// `None` uses the configured default; any limit is clamped to
    /// `[1, max_history_limit]`.
    pub async fn history(&self, limit: Option<usize>) -> EngineResult<Vec<HistoryEntry>> {
        let limit = limit.unwrap_or(self.config.default_history_limit);
        Ok(self.ledger.get_history(limit).await?)
    }

    /// Restore the initial balance, clear history and reseed. Returns the
    /// new balance.
    pub async fn reset(&self) -> EngineResult<Amount> {
        let (balance, _) = self.reset_and_reveal().await?;
        Ok(balance)
    }

    /// Like [`RouletteEngine::reset`], also returning the retired seed.
    ///
    /// The reseed runs inside the ledger's reset step, so every spin is
    /// either settled and recorded under the retired seed before the reset,
    /// or drawn with the new seed after it.
    pub async fn reset_and_reveal(&self) -> EngineResult<(Amount, SeedReveal)> {
        let rng = Arc::clone(&self.rng);
        let (balance, reveal) = self
            .ledger
            .reset_with(move || {
                lock_rng(&rng)
                    .map(|mut rng| rng.reset())
                    .map_err(|e| e.to_string())
            })
            .await?;

        log::info!(
            "Engine reset to balance {}; retired seed {} after {} draws",
            balance,
            reveal.server_seed_hash,
            reveal.final_nonce
        );

        Ok((balance, reveal))
    }

    /// Current seed commitment and the nonce of the next draw.
    pub fn fairness(&self) -> EngineResult<FairnessCommitment> {
        let rng = lock_rng(&self.rng)?;
        Ok(FairnessCommitment {
            server_seed_hash: rng.server_seed_hash(),
            nonce: rng.current_nonce(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::BetType;
    use crate::rng::hash_seed;

    fn engine(seed: &str, isolation: SpinIsolation) -> RouletteEngine {
        let config = EngineConfig {
            isolation,
            ..Default::default()
        };
        RouletteEngine::with_rng(config, ProvablyFairRng::with_seed(seed))
    }

    fn poison(engine: &RouletteEngine) {
        let rng = Arc::clone(&engine.rng);
        let _ = std::thread::spawn(move || {
            let _guard = rng.lock().unwrap();
            panic!("poisoning generator lock");
        })
        .join();
    }

    #[tokio::test]
    async fn test_straight_win_pays_thirty_five_to_one() {
        // "seed-14" draws 17 on nonce 0.
        let engine = engine("seed-14", SpinIsolation::Atomic);

        let result = engine
            .process_spin(vec![Bet::straight(17, 10).unwrap()])
            .await
            .unwrap();

        assert_eq!(result.outcome, 17);
        assert_eq!(result.color, Color::Black);
        assert_eq!(result.total_stake, 10);
        assert_eq!(result.total_return, 360);
        assert_eq!(result.net_profit, 350);
        assert_eq!(result.new_balance, 1350);
        assert!(result.bet_results[0].won);
        assert_eq!(engine.balance().await.unwrap(), 1350);
    }

    #[tokio::test]
    async fn test_straight_loss_costs_the_stake() {
        // "test-seed" draws 32 on nonce 0.
        let engine = engine("test-seed", SpinIsolation::Atomic);

        let result = engine
            .process_spin(vec![Bet::straight(17, 10).unwrap()])
            .await
            .unwrap();

        assert_eq!(result.outcome, 32);
        assert_eq!(result.color, Color::Red);
        assert_eq!(result.total_return, 0);
        assert_eq!(result.net_profit, -10);
        assert_eq!(result.new_balance, 990);
        assert_eq!(result.nonce, 0);
        assert_eq!(result.client_seed, DEFAULT_CLIENT_SEED);
        assert_eq!(result.server_seed_hash, hash_seed("test-seed"));
    }

    #[tokio::test]
    async fn test_rejections_leave_no_trace() {
        let engine = engine("test-seed", SpinIsolation::Atomic);

        let err = engine
            .process_spin(vec![Bet::red(1500).unwrap()])
            .await
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::InsufficientBalance {
                required: 1500,
                available: 1000
            }
        );

        let err = engine
            .process_spin(vec![Bet::new(BetType::Straight, vec![40], 10)])
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_BET");

        assert!(engine.process_spin(vec![]).await.is_err());

        assert_eq!(engine.balance().await.unwrap(), 1000);
        assert!(engine.history(None).await.unwrap().is_empty());
        assert_eq!(engine.fairness().unwrap().nonce, 0);
    }

    #[tokio::test]
    async fn test_client_seed_is_used_and_checked() {
        let engine = engine("test-seed", SpinIsolation::Atomic);

        let result = engine
            .process_spin_with_seed(vec![Bet::red(10).unwrap()], Some("player-1"))
            .await
            .unwrap();
        assert_eq!(result.outcome, 18);
        assert_eq!(result.client_seed, "player-1");

        let too_long = "x".repeat(MAX_CLIENT_SEED_LEN + 1);
        for seed in ["", too_long.as_str()] {
            let err = engine
                .process_spin_with_seed(vec![Bet::red(10).unwrap()], Some(seed))
                .await
                .unwrap_err();
            assert!(matches!(err, EngineError::Validation(_)));
        }
        assert_eq!(engine.fairness().unwrap().nonce, 1);
    }

    #[tokio::test]
    async fn test_process_spin_json() {
        let engine = engine("seed-14", SpinIsolation::Atomic);
        let bets = serde_json::json!([
            {"type": "straight", "numbers": [17], "amount": 10},
            {"type": "red", "numbers": [1, 3, 5], "amount": 5},
        ]);

        let result = engine.process_spin_json(&bets, None).await.unwrap();

        assert_eq!(result.total_stake, 15);
        assert_eq!(result.total_return, 360);
        assert_eq!(result.new_balance, 1345);

        let err = engine
            .process_spin_json(&serde_json::json!({"type": "red"}), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Bets must be an array");
    }

    #[tokio::test]
    async fn test_history_records_spins_newest_first() {
        let engine = engine("test-seed", SpinIsolation::Atomic);
        for _ in 0..3 {
            engine
                .process_spin(vec![Bet::even(10).unwrap()])
                .await
                .unwrap();
        }

        let history = engine.history(Some(2)).await.unwrap();
        let nonces: Vec<_> = history.iter().map(|e| e.nonce).collect();
        assert_eq!(nonces, vec![2, 1]);
        // Draws for nonces 2 and 1 are 18 and 23.
        assert_eq!(history[0].outcome, 18);
        assert_eq!(history[1].outcome, 23);
        assert_eq!(engine.history(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_reset_restores_balance_and_reseeds() {
        let engine = engine("test-seed", SpinIsolation::Atomic);
        engine
            .process_spin(vec![Bet::straight(5, 100).unwrap()])
            .await
            .unwrap();

        let (balance, reveal) = engine.reset_and_reveal().await.unwrap();

        assert_eq!(balance, 1000);
        assert_eq!(reveal.server_seed, "test-seed");
        assert_eq!(reveal.final_nonce, 1);
        let fairness = engine.fairness().unwrap();
        assert_eq!(fairness.nonce, 0);
        assert_ne!(fairness.server_seed_hash, reveal.server_seed_hash);
        assert!(engine.history(None).await.unwrap().is_empty());
        assert_eq!(engine.reset().await.unwrap(), 1000);
    }

    #[tokio::test]
    async fn test_legacy_sequential_spin_matches_atomic() {
        let engine = engine("test-seed", SpinIsolation::Legacy);

        let result = engine
            .process_spin(vec![Bet::straight(17, 10).unwrap()])
            .await
            .unwrap();

        assert_eq!(result.outcome, 32);
        assert_eq!(result.new_balance, 990);
        assert_eq!(engine.history(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_atomic_failure_rolls_back_debit() {
        let engine = engine("test-seed", SpinIsolation::Atomic);
        poison(&engine);

        let err = engine
            .process_spin(vec![Bet::red(100).unwrap()])
            .await
            .unwrap_err();

        assert_eq!(err.code(), "SERVER_ERROR");
        assert_eq!(err.client_message(), "An unexpected error occurred");
        assert_eq!(engine.balance().await.unwrap(), 1000);
        assert!(engine.history(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_legacy_failure_keeps_debit() {
        let engine = engine("test-seed", SpinIsolation::Legacy);
        poison(&engine);

        let err = engine
            .process_spin(vec![Bet::red(100).unwrap()])
            .await
            .unwrap_err();

        assert_eq!(err.code(), "SERVER_ERROR");
        assert_eq!(engine.balance().await.unwrap(), 900);
    }

    #[tokio::test]
    async fn test_credit_overflow_fails_the_spin_and_keeps_the_stake() {
        let config = EngineConfig {
            initial_balance: Amount::MAX - 5,
            ..Default::default()
        };
        // "seed-14" draws 17 on nonce 0, so the straight bet wins 360.
        let engine = RouletteEngine::with_rng(config, ProvablyFairRng::with_seed("seed-14"));

        let err = engine
            .process_spin(vec![Bet::straight(17, 10).unwrap()])
            .await
            .unwrap_err();

        assert_eq!(err.code(), "SERVER_ERROR");
        assert_eq!(engine.balance().await.unwrap(), Amount::MAX - 5);
        assert!(engine.history(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_reseed_leaves_ledger_untouched() {
        let engine = engine("test-seed", SpinIsolation::Atomic);
        engine
            .process_spin(vec![Bet::straight(5, 100).unwrap()])
            .await
            .unwrap();
        poison(&engine);

        let err = engine.reset_and_reveal().await.unwrap_err();

        assert_eq!(err.code(), "SERVER_ERROR");
        assert_eq!(engine.balance().await.unwrap(), 900);
        assert_eq!(engine.history(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_history_entry_names_its_seed_commitment() {
        let engine = engine("test-seed", SpinIsolation::Atomic);
        engine
            .process_spin(vec![Bet::red(10).unwrap()])
            .await
            .unwrap();

        let entry = &engine.history(None).await.unwrap()[0];
        assert_eq!(entry.server_seed_hash, hash_seed("test-seed"));
    }
}
