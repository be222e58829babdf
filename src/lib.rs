//! Base Dropper - NFT drop, message vault and tip jar client for Base
//!
//! This library exposes the core modules used by the `dropper` binary:
//!
//! - **Transaction lifecycle**: precheck, submit, observe and post-confirmation
//!   refresh for every write ([`lifecycle`])
//! - **Panels**: mint, message vault and tip jar ([`panels`])
//! - **Chain access**: alloy-backed gateway behind a trait seam ([`gateway`])
//! - **State cache**: shared polled counters ([`state_cache`])

pub mod app;
pub mod chain;
pub mod config;
pub mod contracts;
pub mod endpoints;
pub mod gateway;
pub mod lifecycle;
pub mod metadata;
pub mod metrics;
pub mod notify;
pub mod observability;
pub mod panels;
pub mod state_cache;
pub mod structured_logging;
pub mod types;
pub mod wallet;

pub mod test_utils;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use app::Dropper;
pub use chain::SupportedChain;
pub use config::AppConfig;
pub use lifecycle::{LifecycleError, LifecycleState, Rejection, TransactionController};
