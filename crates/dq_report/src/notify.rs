//! Notification transport.
//!
//! Delivery is best-effort: a [`TransportError`] is reported to the caller,
//! who logs it and carries on. It never changes the verdict.

use crate::NotificationPayload;
use dq_core::TransportError;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Webhook request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Placeholder left in unconfigured setups; treated as "no webhook".
pub const WEBHOOK_PLACEHOLDER: &str = "YOUR_SLACK_WEBHOOK_URL";

/// What happened to a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The endpoint accepted the message
    Sent,
    /// No endpoint is configured; nothing was sent
    Skipped,
}

/// Delivers notification payloads.
pub trait Notifier {
    /// Sends one payload.
    fn notify(
        &self,
        payload: &NotificationPayload,
    ) -> impl Future<Output = Result<Delivery, TransportError>> + Send;
}

/// Posts payloads to a Slack incoming webhook.
#[derive(Debug, Clone)]
pub struct SlackNotifier {
    client: Client,
    webhook_url: Option<String>,
}

impl SlackNotifier {
    /// Creates a notifier. An empty or placeholder URL disables delivery.
    pub fn new(webhook_url: Option<String>) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let webhook_url = webhook_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty() && url != WEBHOOK_PLACEHOLDER);

        Ok(Self {
            client,
            webhook_url,
        })
    }

    /// Returns true if a usable webhook URL is configured.
    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }
}

impl Notifier for SlackNotifier {
    async fn notify(&self, payload: &NotificationPayload) -> Result<Delivery, TransportError> {
        let Some(url) = &self.webhook_url else {
            warn!("Slack notification skipped (no webhook URL configured)");
            return Ok(Delivery::Skipped);
        };

        info!("Sending Slack notification");
        let message = payload.to_slack_message();
        debug!("Slack payload: {}", message);

        let response = self
            .client
            .post(url)
            .json(&message)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        info!("Slack notification sent");
        Ok(Delivery::Sent)
    }
}
