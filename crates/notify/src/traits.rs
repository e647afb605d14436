//! Push sender trait definition and shared error types.

use serde::Serialize;

use smartcollar_core::CollarError;

/// Errors that can occur during push delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("push gateway returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<NotifyError> for CollarError {
    fn from(err: NotifyError) -> Self {
        CollarError::PushDelivery(err.to_string())
    }
}

/// The visible part of a push message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
}

/// Delivery transport for push messages to a single device.
#[async_trait::async_trait]
pub trait PushSender: Send + Sync {
    /// Deliver `message` to the device identified by `token`.
    async fn send_to_device(&self, token: &str, message: &PushMessage) -> Result<(), NotifyError>;

    /// Human-readable name for this transport (e.g., "webhook", "log").
    fn channel_name(&self) -> &str;
}

/// Sender used when no push gateway is configured: logs and succeeds.
#[derive(Debug, Default)]
pub struct LogPushSender;

#[async_trait::async_trait]
impl PushSender for LogPushSender {
    async fn send_to_device(&self, token: &str, message: &PushMessage) -> Result<(), NotifyError> {
        tracing::info!(
            token = %redact_token(token),
            title = %message.title,
            body = %message.body,
            "push message (log only)"
        );
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "log"
    }
}

/// Keep only the first few characters of a device token for log lines.
pub fn redact_token(token: &str) -> String {
    let prefix: String = token.chars().take(6).collect();
    if token.chars().count() > 6 {
        format!("{prefix}…")
    } else {
        prefix
    }
}

// ── Dispatch outcome ────────────────────────────────────────────────

/// What happened to the push half of a dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum PushOutcome {
    Sent { channel: String },
    /// No token registered. Expected, not an error, never retried.
    NoDeviceToken,
    Failed(CollarError),
}

/// Best-effort report of one dispatch. Callers may log it; nothing
/// requires them to look at it.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchReport {
    /// Key of the appended notification record, if the write succeeded.
    pub record_key: Option<String>,
    /// Set when writing the record failed.
    pub record_error: Option<CollarError>,
    pub push: PushOutcome,
    pub duration_ms: u64,
}

impl DispatchReport {
    pub fn record_written(&self) -> bool {
        self.record_key.is_some()
    }

    pub fn push_sent(&self) -> bool {
        matches!(self.push, PushOutcome::Sent { .. })
    }
}
