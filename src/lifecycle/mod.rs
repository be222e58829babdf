//! Transaction lifecycle controller
//!
//! One controller per panel drives a user action through
//! `Idle → Validating → AwaitingSignature → Confirming → {Confirmed | Failed}`.
//! Failures before a hash exists go straight back to `Idle`. Terminal side
//! effects (notification, input reset, counter refresh) run at most once per
//! transaction hash. Nothing is retried automatically.

pub mod errors;
pub mod panel;

pub use errors::{LifecycleError, Rejection, MAX_MESSAGE_CHARS};
pub use panel::Panel;

use crate::contracts::ContractCall;
use crate::gateway::{ChainGateway, GatewayError};
use crate::metrics::{metrics, Timer};
use crate::notify::NotificationSink;
use crate::state_cache::ChainStateCache;
use crate::structured_logging::LifecycleLogger;
use crate::types::ReceiptSummary;
use alloy::primitives::TxHash;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Where a panel is in its current action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleState<O> {
    Idle,
    Validating,
    AwaitingSignature,
    Confirming { tx: TxHash },
    Confirmed { tx: TxHash, outcome: O },
    Failed { tx: TxHash, reason: String },
}

impl<O> LifecycleState<O> {
    /// An action is in flight and a new one must wait
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Validating | Self::AwaitingSignature | Self::Confirming { .. }
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed { .. } | Self::Failed { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::AwaitingSignature => "awaiting_signature",
            Self::Confirming { .. } => "confirming",
            Self::Confirmed { .. } => "confirmed",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Status of a transaction that has a hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    Submitted,
    Confirming,
    Confirmed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction<O> {
    pub tx: TxHash,
    pub status: TxStatus,
    pub outcome: Option<O>,
}

#[derive(Debug, Clone)]
enum Terminal<O> {
    Confirmed(O),
    Reverted,
    Unobserved(GatewayError),
}

struct Inner<P: Panel> {
    state: LifecycleState<P::Outcome>,
    pending: Option<PendingTransaction<P::Outcome>>,
    input: P::Input,
    logger: Option<LifecycleLogger>,
    handled: HashMap<TxHash, Terminal<P::Outcome>>,
    observing: HashSet<TxHash>,
}

pub struct TransactionController<P: Panel> {
    panel: P,
    gateway: Arc<dyn ChainGateway>,
    cache: Arc<ChainStateCache>,
    notifier: Arc<dyn NotificationSink>,
    inner: Mutex<Inner<P>>,
}

impl<P: Panel> TransactionController<P> {
    pub fn new(
        panel: P,
        gateway: Arc<dyn ChainGateway>,
        cache: Arc<ChainStateCache>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            panel,
            gateway,
            cache,
            notifier,
            inner: Mutex::new(Inner {
                state: LifecycleState::Idle,
                pending: None,
                input: P::Input::default(),
                logger: None,
                handled: HashMap::new(),
                observing: HashSet::new(),
            }),
        }
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn state(&self) -> LifecycleState<P::Outcome> {
        self.inner.lock().state.clone()
    }

    pub fn pending(&self) -> Option<PendingTransaction<P::Outcome>> {
        self.inner.lock().pending.clone()
    }

    pub fn input(&self) -> P::Input {
        self.inner.lock().input.clone()
    }

    pub fn set_input(&self, input: P::Input) {
        self.inner.lock().input = input;
    }

    /// Edit the draft input in place
    pub fn update_input(&self, edit: impl FnOnce(&mut P::Input)) {
        edit(&mut self.inner.lock().input);
    }

    /// Return to `Idle` after a terminal state.
    ///
    /// An unresolved transaction stays tracked; dropping interest in it does
    /// not cancel it on-chain.
    pub fn reset(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.state.is_busy() {
            return false;
        }
        inner.state = LifecycleState::Idle;
        inner.pending = None;
        true
    }

    /// Run the panel's precondition check against the cached counters
    pub fn validate(&self) -> Result<ContractCall, Rejection> {
        let input = self.inner.lock().input.clone();
        let snapshot = self.cache.snapshot(self.gateway.connected_account());
        self.panel.precheck(&snapshot, &input)
    }

    /// Check preconditions and hand the write to the wallet.
    ///
    /// Returns the transaction hash once the node accepted it. Rejections and
    /// wallet errors are reported through the notifier and leave the
    /// controller `Idle`.
    pub async fn submit(&self) -> Result<TxHash, LifecycleError> {
        let logger = LifecycleLogger::new(self.panel.name());
        {
            let mut inner = self.inner.lock();
            if inner.state.is_busy() {
                return Err(LifecycleError::Busy);
            }
            inner.state = LifecycleState::Validating;
            inner.pending = None;
            inner.logger = Some(logger.clone());
        }

        // a caller that drops this future before a hash exists must not leave
        // the panel busy
        let _abandon = scopeguard::guard((), |_| {
            let mut inner = self.inner.lock();
            if matches!(
                inner.state,
                LifecycleState::Validating | LifecycleState::AwaitingSignature
            ) {
                inner.state = LifecycleState::Idle;
                logger.log_abandoned();
            }
        });

        let call = match self.validate() {
            Ok(call) => call,
            Err(rejection) => {
                logger.log_rejected(rejection.reason_code());
                metrics()
                    .precheck_rejections
                    .with_label_values(&[rejection.reason_code()])
                    .inc();
                self.inner.lock().state = LifecycleState::Idle;
                self.notifier.error(None, &rejection.to_string());
                return Err(rejection.into());
            }
        };

        self.inner.lock().state = LifecycleState::AwaitingSignature;
        logger.log_signature_requested(call.function);

        match self.gateway.request_signature_and_submit(call).await {
            Ok(tx) => {
                metrics().tx_submitted.inc();
                logger.log_submitted(&tx);
                let mut inner = self.inner.lock();
                inner.state = LifecycleState::Confirming { tx };
                inner.pending = Some(PendingTransaction {
                    tx,
                    status: TxStatus::Submitted,
                    outcome: None,
                });
                Ok(tx)
            }
            Err(e) => {
                metrics().wallet_rejections.inc();
                logger.log_wallet_error(&e.to_string());
                self.inner.lock().state = LifecycleState::Idle;
                self.notifier.error(None, &e.to_string());
                Err(LifecycleError::Wallet(e))
            }
        }
    }

    /// Wait for `tx` to be mined and apply its terminal side effects
    pub async fn observe(&self, tx: TxHash) -> Result<P::Outcome, LifecycleError> {
        {
            let mut inner = self.inner.lock();
            if let Some(terminal) = inner.handled.get(&tx) {
                return Self::replay(tx, terminal);
            }
            if let Some(pending) = inner.pending.as_mut().filter(|p| p.tx == tx) {
                pending.status = TxStatus::Confirming;
            }
            // shown under the lock so it always precedes the terminal dismiss
            if inner.observing.insert(tx) {
                self.notifier
                    .loading(&tx.to_string(), self.panel.confirming_message());
            }
        }

        let timer = Timer::new();
        let result = self.gateway.wait_for_receipt(tx).await;
        timer.observe_duration(&metrics().confirmation_latency);

        self.handle_terminal(tx, result).await
    }

    /// Submit then observe
    pub async fn run(&self) -> Result<P::Outcome, LifecycleError> {
        let tx = self.submit().await?;
        self.observe(tx).await
    }

    /// Apply the terminal state of `tx`.
    ///
    /// The first call for a hash notifies, clears the draft input and
    /// refreshes the dependent counters; later calls only return the recorded
    /// result.
    pub async fn handle_terminal(
        &self,
        tx: TxHash,
        result: Result<ReceiptSummary, GatewayError>,
    ) -> Result<P::Outcome, LifecycleError> {
        let block = result.as_ref().ok().and_then(|r| r.block_number);
        let terminal = match &result {
            Ok(receipt) if receipt.success => Terminal::Confirmed(self.panel.decode_outcome(receipt)),
            Ok(_) => Terminal::Reverted,
            Err(e) => Terminal::Unobserved(e.clone()),
        };

        let logger = {
            let mut inner = self.inner.lock();
            let logger = inner
                .logger
                .clone()
                .unwrap_or_else(|| LifecycleLogger::new(self.panel.name()));
            if let Some(previous) = inner.handled.get(&tx) {
                logger.log_duplicate_terminal(&tx);
                return Self::replay(tx, previous);
            }
            inner.handled.insert(tx, terminal.clone());
            inner.observing.remove(&tx);

            let tracked = inner.pending.as_ref().is_some_and(|p| p.tx == tx);
            if tracked {
                let (state, status, outcome) = match &terminal {
                    Terminal::Confirmed(outcome) => (
                        LifecycleState::Confirmed { tx, outcome: outcome.clone() },
                        TxStatus::Confirmed,
                        Some(outcome.clone()),
                    ),
                    Terminal::Reverted => (
                        LifecycleState::Failed { tx, reason: "reverted".to_string() },
                        TxStatus::Failed,
                        None,
                    ),
                    Terminal::Unobserved(e) => (
                        LifecycleState::Failed { tx, reason: e.to_string() },
                        TxStatus::Failed,
                        None,
                    ),
                };
                inner.state = state;
                inner.pending = Some(PendingTransaction { tx, status, outcome });
            }
            if matches!(terminal, Terminal::Confirmed(_)) {
                inner.input = P::Input::default();
            }
            logger
        };

        let key = tx.to_string();
        self.notifier.dismiss(&key);

        match terminal {
            Terminal::Confirmed(outcome) => {
                metrics().tx_confirmed.inc();
                logger.log_confirmed(&tx, block);
                self.notifier
                    .success(Some(key.as_str()), &self.panel.success_message(&outcome));

                if let Some(account) = self.gateway.connected_account() {
                    let keys = self.panel.dependent_keys(account);
                    self.cache.invalidate(&keys);
                    self.cache.refresh_many(&keys).await;
                }
                Ok(outcome)
            }
            Terminal::Reverted => {
                metrics().tx_failed.inc();
                logger.log_failed(&tx, "reverted");
                self.notifier
                    .error(Some(key.as_str()), &format!("Transaction failed: {tx}"));
                Err(LifecycleError::Reverted { tx })
            }
            Terminal::Unobserved(source) => {
                metrics().tx_failed.inc();
                logger.log_failed(&tx, &source.to_string());
                let err = LifecycleError::Observe { tx, source };
                self.notifier.error(Some(key.as_str()), &err.to_string());
                Err(err)
            }
        }
    }

    fn replay(tx: TxHash, terminal: &Terminal<P::Outcome>) -> Result<P::Outcome, LifecycleError> {
        match terminal {
            Terminal::Confirmed(outcome) => Ok(outcome.clone()),
            Terminal::Reverted => Err(LifecycleError::Reverted { tx }),
            Terminal::Unobserved(source) => Err(LifecycleError::Observe {
                tx,
                source: source.clone(),
            }),
        }
    }
}
