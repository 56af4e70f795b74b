//! Ledger actor implementation with async message handling.

use super::{
    config::LedgerConfig,
    errors::{LedgerError, LedgerResult},
    messages::LedgerMessage,
    models::{HistoryEntry, ResetFn, SettleFn, Settlement},
};
use crate::game::entities::Amount;
use std::collections::VecDeque;
use tokio::sync::{mpsc, oneshot, watch};

/// Ledger actor handle for sending messages
#[derive(Clone, Debug)]
pub struct LedgerHandle {
    sender: mpsc::Sender<LedgerMessage>,
    balance: watch::Receiver<Amount>,
}

impl LedgerHandle {
    /// Send a request and wait for its reply.
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> LedgerMessage,
    ) -> LedgerResult<T> {
        let (response, reply) = oneshot::channel();
        self.sender
            .send(build(response))
            .await
            .map_err(|_| LedgerError::Closed)?;
        reply.await.map_err(|_| LedgerError::Closed)
    }

    /// Balance as of the last completed operation, read without queueing.
    ///
    /// Operations already enqueued but not yet applied are not reflected.
    pub fn balance_snapshot(&self) -> Amount {
        *self.balance.borrow()
    }

    /// Balance after every operation enqueued before this one.
    pub async fn get_balance(&self) -> LedgerResult<Amount> {
        self.request(|response| LedgerMessage::GetBalance { response })
            .await
    }

    pub async fn set_balance(&self, amount: Amount) -> LedgerResult<()> {
        self.request(|response| LedgerMessage::SetBalance { amount, response })
            .await
    }

    /// Credit without a funds check. Returns the new balance.
    ///
    /// # Errors
    ///
    /// * `Overflow` - the sum does not fit; the balance is unchanged
    pub async fn add_to_balance(&self, amount: Amount) -> LedgerResult<Amount> {
        self.request(|response| LedgerMessage::AddToBalance { amount, response })
            .await?
    }

    /// Debit without a funds check. Returns the new balance, which may be
    /// negative.
    ///
    /// # Errors
    ///
    /// * `Overflow` - the difference does not fit; the balance is unchanged
    pub async fn subtract_from_balance(&self, amount: Amount) -> LedgerResult<Amount> {
        self.request(|response| LedgerMessage::SubtractFromBalance { amount, response })
            .await?
    }

    /// Debit `amount` only if the balance covers it.
    ///
    /// # Errors
    ///
    /// * `InsufficientBalance` - balance is below `amount`; nothing changes
    /// * `InvalidAmount` - `amount` is negative
    /// * `Closed` - the worker has stopped
    pub async fn debit_if_sufficient(&self, amount: Amount) -> LedgerResult<Amount> {
        self.request(|response| LedgerMessage::DebitIfSufficient { amount, response })
            .await?
    }

    /// Credit `amount` and append `entry` in one step.
    pub async fn credit_and_record(
        &self,
        amount: Amount,
        entry: HistoryEntry,
    ) -> LedgerResult<Amount> {
        self.request(|response| LedgerMessage::CreditAndRecord {
            amount,
            entry,
            response,
        })
        .await?
    }

    pub async fn append_history(&self, entry: HistoryEntry) -> LedgerResult<()> {
        self.request(|response| LedgerMessage::AppendHistory { entry, response })
            .await
    }

    /// Up to `limit` most recent entries, newest first. `limit` is clamped
    /// to `[1, max_history_limit]`.
    pub async fn get_history(&self, limit: usize) -> LedgerResult<Vec<HistoryEntry>> {
        self.request(|response| LedgerMessage::GetHistory { limit, response })
            .await
    }

    /// Run a whole settlement as one queued operation.
    ///
    /// The ledger debits `stake` if the balance covers it, runs `work`,
    /// credits the returned amount and records the returned entry. No other
    /// operation can observe the balance in between. If `work` fails the
    /// debit is rolled back.
    ///
    /// # Returns
    ///
    /// * `(Amount, T)` - Balance after the credit and the extra output of `work`
    ///
    /// # Errors
    ///
    /// * `InsufficientBalance` - `work` never ran and nothing changed
    /// * `SettlementFailed` - `work` failed; balance and history are unchanged
    /// * `Overflow` - the credit does not fit; the debit was rolled back
    pub async fn settle<T, F>(&self, stake: Amount, work: F) -> LedgerResult<(Amount, T)>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<(Settlement, T), String> + Send + 'static,
    {
        let (output_tx, output_rx) = oneshot::channel();
        let settlement: SettleFn = Box::new(move || {
            let (settlement, output) = work()?;
            let _ = output_tx.send(output);
            Ok(settlement)
        });

        let new_balance = self
            .request(|response| LedgerMessage::Settle {
                stake,
                settlement,
                response,
            })
            .await??;
        let output = output_rx.await.map_err(|_| LedgerError::Closed)?;

        Ok((new_balance, output))
    }

    /// Restore the initial balance and clear history. Returns the balance.
    pub async fn reset(&self) -> LedgerResult<Amount> {
        let (balance, ()) = self.reset_with(|| Ok(())).await?;
        Ok(balance)
    }

    /// Run `work` and reset the ledger as one queued operation.
    ///
    /// Operations enqueued before this one complete first; operations
    /// enqueued after it see both the restored ledger and whatever `work`
    /// changed.
    ///
    /// # Errors
    ///
    /// * `ResetFailed` - `work` failed; balance and history are unchanged
    pub async fn reset_with<T, F>(&self, work: F) -> LedgerResult<(Amount, T)>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, String> + Send + 'static,
    {
        let (output_tx, output_rx) = oneshot::channel();
        let reseed: ResetFn = Box::new(move || {
            let _ = output_tx.send(work()?);
            Ok(())
        });

        let balance = self
            .request(|response| LedgerMessage::Reset { reseed, response })
            .await??;
        let output = output_rx.await.map_err(|_| LedgerError::Closed)?;

        Ok((balance, output))
    }
}

/// Ledger actor owning the balance and the history log
///
/// Messages are applied one at a time in arrival order, so every operation
/// sees the effects of everything enqueued before it.
pub struct LedgerActor {
    /// Ledger configuration
    config: LedgerConfig,

    /// Current balance
    balance: Amount,

    /// Settled spins, oldest first
    history: VecDeque<HistoryEntry>,

    /// Message inbox
    inbox: mpsc::Receiver<LedgerMessage>,

    /// Published balance for lock-free snapshots
    balance_tx: watch::Sender<Amount>,
}

impl LedgerActor {
    /// Create a new ledger actor
    ///
    /// # Returns
    ///
    /// * `(LedgerActor, LedgerHandle)` - Actor and handle for sending messages
    pub fn new(config: LedgerConfig) -> (Self, LedgerHandle) {
        let (sender, inbox) = mpsc::channel(config.queue_capacity.max(1));
        let (balance_tx, balance_rx) = watch::channel(config.initial_balance);

        let actor = Self {
            balance: config.initial_balance,
            history: VecDeque::new(),
            config,
            inbox,
            balance_tx,
        };

        let handle = LedgerHandle {
            sender,
            balance: balance_rx,
        };

        (actor, handle)
    }

    /// Create the actor and run it on the current Tokio runtime.
    pub fn spawn(config: LedgerConfig) -> LedgerHandle {
        let (actor, handle) = Self::new(config);
        tokio::spawn(actor.run());
        handle
    }

    /// Run the ledger event loop until every handle is dropped
    pub async fn run(mut self) {
        log::info!("Ledger starting with balance {}", self.balance);

        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message);
        }

        log::info!(
            "Ledger closed with balance {} and {} history entries",
            self.balance,
            self.history.len()
        );
    }

    fn handle_message(&mut self, message: LedgerMessage) {
        match message {
            LedgerMessage::GetBalance { response } => {
                let _ = response.send(self.balance);
            }

            LedgerMessage::SetBalance { amount, response } => {
                self.set(amount);
                let _ = response.send(());
            }

            LedgerMessage::AddToBalance { amount, response } => {
                let _ = response.send(self.credit(amount));
            }

            LedgerMessage::SubtractFromBalance { amount, response } => {
                let _ = response.send(self.debit(amount));
            }

            LedgerMessage::DebitIfSufficient { amount, response } => {
                let _ = response.send(self.debit_if_sufficient(amount));
            }

            LedgerMessage::CreditAndRecord {
                amount,
                entry,
                response,
            } => {
                let result = self.credit_and_record(amount, entry);
                let _ = response.send(result);
            }

            LedgerMessage::AppendHistory { entry, response } => {
                self.append(entry);
                let _ = response.send(());
            }

            LedgerMessage::GetHistory { limit, response } => {
                let _ = response.send(self.history(limit));
            }

            LedgerMessage::Settle {
                stake,
                settlement,
                response,
            } => {
                let _ = response.send(self.settle(stake, settlement));
            }

            LedgerMessage::Reset { reseed, response } => {
                let _ = response.send(self.reset(reseed));
            }
        }
    }

    fn set(&mut self, balance: Amount) {
        self.balance = balance;
        self.balance_tx.send_replace(balance);
    }

    fn credit(&mut self, amount: Amount) -> LedgerResult<Amount> {
        let balance = self
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::Overflow {
                balance: self.balance,
                op: '+',
                amount,
            })?;
        self.set(balance);
        Ok(balance)
    }

    fn debit(&mut self, amount: Amount) -> LedgerResult<Amount> {
        let balance = self
            .balance
            .checked_sub(amount)
            .ok_or(LedgerError::Overflow {
                balance: self.balance,
                op: '-',
                amount,
            })?;
        self.set(balance);
        Ok(balance)
    }

    fn debit_if_sufficient(&mut self, amount: Amount) -> LedgerResult<Amount> {
        if amount < 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }
        if amount > self.balance {
            return Err(LedgerError::InsufficientBalance {
                available: self.balance,
                required: amount,
            });
        }
        self.set(self.balance - amount);
        Ok(self.balance)
    }

    fn credit_and_record(&mut self, amount: Amount, entry: HistoryEntry) -> LedgerResult<Amount> {
        if amount < 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }
        let balance = self.credit(amount)?;
        self.append(entry);
        Ok(balance)
    }

    fn settle(&mut self, stake: Amount, settlement: SettleFn) -> LedgerResult<Amount> {
        self.debit_if_sufficient(stake)?;

        let result = settlement()
            .map_err(LedgerError::SettlementFailed)
            .and_then(|Settlement { total_return, entry }| {
                self.credit_and_record(total_return, entry)
            });

        if let Err(err) = &result {
            // The debit just succeeded, so adding the stake back cannot overflow.
            self.set(self.balance + stake);
            log::error!("Settlement of {stake} failed, debit rolled back: {err}");
        }
        result
    }

    fn reset(&mut self, reseed: ResetFn) -> LedgerResult<Amount> {
        if let Err(reason) = reseed() {
            log::error!("Reset aborted, ledger unchanged: {reason}");
            return Err(LedgerError::ResetFailed(reason));
        }

        self.history.clear();
        self.set(self.config.initial_balance);
        log::debug!("Ledger reset to {}", self.balance);
        Ok(self.balance)
    }

    fn append(&mut self, entry: HistoryEntry) {
        self.history.push_back(entry);
        let retention = self.config.history_retention.max(1);
        while self.history.len() > retention {
            self.history.pop_front();
        }
    }

    fn history(&self, limit: usize) -> Vec<HistoryEntry> {
        let limit = limit.clamp(1, self.config.max_history_limit.max(1));
        self.history.iter().rev().take(limit).cloned().collect()
    }
}
