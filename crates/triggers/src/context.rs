//! Explicitly constructed collaborators shared by every handler.

use std::sync::Arc;

use tracing::info;

use smartcollar_core::config::AlertConfig;
use smartcollar_core::{Clock, Config, SystemClock};
use smartcollar_notify::{LogPushSender, NotifyError, PushSender, WebhookPushSender};
use smartcollar_storage::RealtimeStore;

/// Store, push transport, clock and alert settings, injected at construction.
#[derive(Clone)]
pub struct MonitorContext {
    pub store: Arc<dyn RealtimeStore>,
    pub push: Arc<dyn PushSender>,
    pub clock: Arc<dyn Clock>,
    pub alerts: AlertConfig,
}

impl MonitorContext {
    pub fn new(
        store: Arc<dyn RealtimeStore>,
        push: Arc<dyn PushSender>,
        clock: Arc<dyn Clock>,
        alerts: AlertConfig,
    ) -> Self {
        Self {
            store,
            push,
            clock,
            alerts,
        }
    }

    /// Production wiring: system clock, webhook sender when a gateway is
    /// configured, log-only sender otherwise.
    pub fn from_config(config: &Config, store: Arc<dyn RealtimeStore>) -> Result<Self, NotifyError> {
        let push: Arc<dyn PushSender> = if config.push.is_configured() {
            Arc::new(WebhookPushSender::from_config(&config.push)?)
        } else {
            info!("No push gateway configured, push messages will only be logged");
            Arc::new(LogPushSender)
        };
        Ok(Self::new(store, push, Arc::new(SystemClock), config.alerts.clone()))
    }
}
