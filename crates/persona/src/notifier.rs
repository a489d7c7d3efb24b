//! Push notifications to the owner of the persona
//!
//! Notifications are fire-and-forget: a [`Notifier`] never reports failure to its caller,
//! it logs it instead.
use async_trait::async_trait;

mod pushover;

#[cfg(test)]
pub mod mock;

pub use pushover::{PushoverConfig, PushoverNotifier, PUSHOVER_ENDPOINT};

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a short text, at most once, swallowing any failure
    async fn notify(&self, text: &str);
}

/// Writes notifications to the log, used when no push service is configured
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, text: &str) {
        tracing::info!(notification = text, "Push notifications are not configured");
    }
}
