//! Background delivery of checkout confirmations.
//!
//! The request path hands a [`PaymentConfirmation`] to a
//! [`NotificationQueue`] and moves on; a worker task owns the actual
//! delivery. Delivery failures are logged by the worker and never rejoin
//! the request path.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tokio::sync::mpsc;

use bistro_core::Email;

use crate::config::NotifierConfig;

/// A checkout confirmation waiting for delivery.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmation {
    pub recipient: Email,
    pub external_transaction_id: String,
    pub amount: Decimal,
}

/// Errors from confirmation delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Delivery endpoint returned a non-success status.
    #[error("delivery endpoint returned {status}")]
    Endpoint { status: u16 },

    /// Client could not be constructed.
    #[error("client setup error: {0}")]
    Setup(String),
}

/// Delivery mechanism for confirmations.
///
/// The production implementation posts to an HTTP endpoint; tests swap in
/// recording or failing senders.
#[async_trait]
pub trait ConfirmationSender: Send + Sync + 'static {
    async fn send(&self, confirmation: &PaymentConfirmation) -> Result<(), NotifierError>;
}

/// HTTP delivery client for an external notification service.
pub struct HttpConfirmationSender {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpConfirmationSender {
    /// Create a delivery client for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError::Setup`] if the API key cannot be used as a
    /// header value or the HTTP client fails to build.
    pub fn new(endpoint: &str, api_key: Option<&SecretString>) -> Result<Self, NotifierError> {
        let mut headers = HeaderMap::new();

        if let Some(key) = api_key {
            let auth_value = format!("Bearer {}", key.expose_secret());
            let mut value = HeaderValue::from_str(&auth_value)
                .map_err(|e| NotifierError::Setup(format!("invalid API key format: {e}")))?;
            value.set_sensitive(true);
            headers.insert("Authorization", value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| NotifierError::Setup(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_owned(),
        })
    }
}

#[async_trait]
impl ConfirmationSender for HttpConfirmationSender {
    async fn send(&self, confirmation: &PaymentConfirmation) -> Result<(), NotifierError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(confirmation)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifierError::Endpoint {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

/// Fallback sender used when no delivery endpoint is configured.
pub struct LogOnlySender;

#[async_trait]
impl ConfirmationSender for LogOnlySender {
    async fn send(&self, confirmation: &PaymentConfirmation) -> Result<(), NotifierError> {
        tracing::info!(
            recipient = %confirmation.recipient,
            transaction_id = %confirmation.external_transaction_id,
            amount = %confirmation.amount,
            "confirmation (no delivery endpoint configured)"
        );
        Ok(())
    }
}

/// Cheaply cloneable handle to the notification worker.
#[derive(Clone)]
pub struct NotificationQueue {
    tx: mpsc::UnboundedSender<PaymentConfirmation>,
}

impl NotificationQueue {
    /// Spawn a worker task that drains the queue through `sender`.
    #[must_use]
    pub fn spawn<S: ConfirmationSender>(sender: S) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<PaymentConfirmation>();

        tokio::spawn(async move {
            while let Some(confirmation) = rx.recv().await {
                if let Err(e) = sender.send(&confirmation).await {
                    tracing::warn!(
                        error = %e,
                        recipient = %confirmation.recipient,
                        transaction_id = %confirmation.external_transaction_id,
                        "confirmation delivery failed"
                    );
                }
            }
        });

        Self { tx }
    }

    /// Build the worker from configuration: HTTP delivery when an endpoint
    /// is configured, log-only otherwise.
    #[must_use]
    pub fn from_config(config: &NotifierConfig) -> Self {
        match &config.endpoint {
            Some(endpoint) => {
                match HttpConfirmationSender::new(endpoint, config.api_key.as_ref()) {
                    Ok(sender) => Self::spawn(sender),
                    Err(e) => {
                        tracing::warn!(error = %e, "notifier setup failed; logging confirmations instead");
                        Self::spawn(LogOnlySender)
                    }
                }
            }
            None => Self::spawn(LogOnlySender),
        }
    }

    /// Submit a confirmation for delivery. Fire-and-forget: never blocks,
    /// never fails the caller.
    pub fn dispatch(&self, confirmation: PaymentConfirmation) {
        if self.tx.send(confirmation).is_err() {
            tracing::warn!("notification worker is gone; dropping confirmation");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;

    /// Sender that records what it was asked to deliver.
    #[derive(Clone, Default)]
    pub(crate) struct RecordingSender {
        pub sent: Arc<Mutex<Vec<PaymentConfirmation>>>,
    }

    #[async_trait]
    impl ConfirmationSender for RecordingSender {
        async fn send(&self, confirmation: &PaymentConfirmation) -> Result<(), NotifierError> {
            self.sent.lock().unwrap().push(confirmation.clone());
            Ok(())
        }
    }

    /// Sender that always fails.
    pub(crate) struct FailingSender;

    #[async_trait]
    impl ConfirmationSender for FailingSender {
        async fn send(&self, _confirmation: &PaymentConfirmation) -> Result<(), NotifierError> {
            Err(NotifierError::Endpoint { status: 503 })
        }
    }

    fn confirmation() -> PaymentConfirmation {
        PaymentConfirmation {
            recipient: Email::parse("diner@example.com").unwrap(),
            external_transaction_id: "tx1".to_owned(),
            amount: Decimal::new(2500, 2),
        }
    }

    #[tokio::test]
    async fn test_dispatch_reaches_worker() {
        let sender = RecordingSender::default();
        let sent = Arc::clone(&sender.sent);
        let queue = NotificationQueue::spawn(sender);

        queue.dispatch(confirmation());
        tokio::time::sleep(Duration::from_millis(50)).await;

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent.first().unwrap().external_transaction_id, "tx1");
    }

    #[tokio::test]
    async fn test_delivery_failure_stays_in_worker() {
        let queue = NotificationQueue::spawn(FailingSender);

        // Neither dispatch nor the worker's failure may panic or surface.
        queue.dispatch(confirmation());
        queue.dispatch(confirmation());
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
