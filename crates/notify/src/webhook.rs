//! HTTP push gateway sender.
//!
//! Posts each push as JSON to a configured gateway URL in the legacy
//! device-send shape:
//!
//! ```json
//! { "to": "<device token>", "notification": { "title": "...", "body": "..." } }
//! ```

use std::time::Duration;

use serde::Serialize;

use smartcollar_core::config::PushConfig;

use crate::traits::{redact_token, PushMessage, PushSender, NotifyError};

#[derive(Debug, Serialize)]
struct DevicePayload<'a> {
    to: &'a str,
    notification: &'a PushMessage,
}

/// Delivers push messages through an HTTP gateway.
#[derive(Debug)]
pub struct WebhookPushSender {
    url: String,
    /// Sent as the `Authorization` header when set.
    auth_header: Option<String>,
    /// Shared HTTP client (connection pooling).
    client: reqwest::Client,
}

impl WebhookPushSender {
    /// Create a new gateway sender. Only http(s) URLs are accepted.
    pub fn new(
        url: String,
        auth_header: Option<String>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(NotifyError::Config(format!(
                "push gateway URL must be http(s): {url}"
            )));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            url,
            auth_header,
            client,
        })
    }

    pub fn from_config(config: &PushConfig) -> Result<Self, NotifyError> {
        let url = config
            .gateway_url
            .clone()
            .ok_or_else(|| NotifyError::Config("PUSH_GATEWAY_URL not set".to_string()))?;

        Self::new(
            url,
            config.auth_header.clone(),
            Duration::from_secs(config.timeout_secs.max(1)),
        )
    }
}

#[async_trait::async_trait]
impl PushSender for WebhookPushSender {
    async fn send_to_device(&self, token: &str, message: &PushMessage) -> Result<(), NotifyError> {
        let payload = DevicePayload {
            to: token,
            notification: message,
        };

        let mut request = self.client.post(&self.url).json(&payload);
        if let Some(auth) = &self.auth_header {
            request = request.header(reqwest::header::AUTHORIZATION, auth.as_str());
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(
                url = %self.url,
                %status,
                token = %redact_token(token),
                body = %body_text,
                "push gateway returned non-2xx status"
            );
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body: body_text,
            });
        }

        tracing::debug!(
            url = %self.url,
            status = %status,
            token = %redact_token(token),
            "push message delivered"
        );

        Ok(())
    }

    fn channel_name(&self) -> &str {
        "webhook"
    }
}
