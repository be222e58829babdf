//! Structured logging for lifecycle events

use crate::observability::CorrelationId;
use alloy::primitives::TxHash;

/// Logger bound to one lifecycle run
#[derive(Debug, Clone)]
pub struct LifecycleLogger {
    context_id: CorrelationId,
    panel: &'static str,
}

impl LifecycleLogger {
    pub fn new(panel: &'static str) -> Self {
        Self {
            context_id: CorrelationId::new(),
            panel,
        }
    }

    pub fn context_id(&self) -> &CorrelationId {
        &self.context_id
    }

    pub fn log_rejected(&self, reason: &str) {
        tracing::info!(
            context_id = %self.context_id,
            panel = %self.panel,
            reason = %reason,
            "Action rejected before submission"
        );
    }

    pub fn log_signature_requested(&self, function: &str) {
        tracing::debug!(
            context_id = %self.context_id,
            panel = %self.panel,
            function = %function,
            "Requesting signature"
        );
    }

    pub fn log_submitted(&self, tx: &TxHash) {
        tracing::info!(
            context_id = %self.context_id,
            panel = %self.panel,
            tx = %tx,
            "Transaction submitted"
        );
    }

    pub fn log_wallet_error(&self, error: &str) {
        tracing::warn!(
            context_id = %self.context_id,
            panel = %self.panel,
            error = %error,
            "Wallet refused transaction"
        );
    }

    pub fn log_abandoned(&self) {
        tracing::info!(
            context_id = %self.context_id,
            panel = %self.panel,
            "Submission dropped before a hash was returned"
        );
    }

    pub fn log_confirmed(&self, tx: &TxHash, block: Option<u64>) {
        tracing::info!(
            context_id = %self.context_id,
            panel = %self.panel,
            tx = %tx,
            block = ?block,
            "Transaction confirmed"
        );
    }

    pub fn log_failed(&self, tx: &TxHash, error: &str) {
        tracing::warn!(
            context_id = %self.context_id,
            panel = %self.panel,
            tx = %tx,
            error = %error,
            "Transaction failed"
        );
    }

    pub fn log_duplicate_terminal(&self, tx: &TxHash) {
        tracing::debug!(
            context_id = %self.context_id,
            panel = %self.panel,
            tx = %tx,
            "Terminal state already handled"
        );
    }
}
