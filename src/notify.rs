//! Transient user-facing notifications
//!
//! The lifecycle controller reports progress through a [`NotificationSink`]
//! and never waits on it. Loading notifications are keyed by transaction hash
//! and stay up until the same key is dismissed.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    Success,
    Error,
    Loading,
}

/// Fire-and-forget sink for user messages
pub trait NotificationSink: Send + Sync {
    fn success(&self, key: Option<&str>, message: &str);
    fn error(&self, key: Option<&str>, message: &str);
    /// Non-dismissable progress message, replaced once `key` is dismissed
    fn loading(&self, key: &str, message: &str);
    fn dismiss(&self, key: &str);
}

/// Sink that renders notifications as log lines
#[derive(Debug, Default)]
pub struct TracingNotifier {
    active: DashMap<String, Instant>,
}

impl TracingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys of loading notifications still on screen
    pub fn active_keys(&self) -> Vec<String> {
        self.active.iter().map(|entry| entry.key().clone()).collect()
    }
}

impl NotificationSink for TracingNotifier {
    fn success(&self, key: Option<&str>, message: &str) {
        tracing::info!(key = key.unwrap_or("-"), "✅ {}", message);
    }

    fn error(&self, key: Option<&str>, message: &str) {
        tracing::error!(key = key.unwrap_or("-"), "❌ {}", message);
    }

    fn loading(&self, key: &str, message: &str) {
        self.active.insert(key.to_string(), Instant::now());
        tracing::info!(key = %key, "⏳ {}", message);
    }

    fn dismiss(&self, key: &str) {
        if let Some((_, shown_at)) = self.active.remove(key) {
            tracing::debug!(
                key = %key,
                shown_ms = shown_at.elapsed().as_millis() as u64,
                "Dismissed notification"
            );
        }
    }
}
