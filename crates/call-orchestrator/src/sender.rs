//! Notification channel decorators.

use std::sync::Arc;

use async_trait::async_trait;
use call_core::{DeliveryOutcome, NotificationChannel, PlatformError, UserId};
use tracing::info;

/// A notification channel that discards all messages.
#[derive(Debug, Clone, Default)]
pub struct NoOpNotifier;

#[async_trait]
impl NotificationChannel for NoOpNotifier {
    async fn send(&self, _user: UserId, _text: &str) -> Result<DeliveryOutcome, PlatformError> {
        Ok(DeliveryOutcome::Delivered)
    }
}

/// Logs every notification, then forwards it to the inner channel.
#[derive(Clone)]
pub struct LoggingNotifier {
    inner: Arc<dyn NotificationChannel>,
}

impl LoggingNotifier {
    pub fn new(inner: Arc<dyn NotificationChannel>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl NotificationChannel for LoggingNotifier {
    async fn send(&self, user: UserId, text: &str) -> Result<DeliveryOutcome, PlatformError> {
        let outcome = self.inner.send(user, text).await;
        match &outcome {
            Ok(DeliveryOutcome::Delivered) => info!("[notify] {} <- {}", user, text),
            Ok(DeliveryOutcome::Blocked) => info!("[notify] {} blocked: {}", user, text),
            Err(err) => info!("[notify] {} failed: {}", user, err),
        }
        outcome
    }
}
