//! Notification delivery for collar alerts.
//!
//! This crate provides:
//! - `PushSender` trait for pluggable push transports
//! - Webhook (HTTP push gateway) and log-only senders
//! - `NotificationDispatcher`, which records a notification and pushes it

pub mod dispatcher;
pub mod traits;
pub mod webhook;

pub use dispatcher::NotificationDispatcher;
pub use traits::{
    DispatchReport, LogPushSender, NotifyError, PushMessage, PushOutcome, PushSender,
};
pub use webhook::WebhookPushSender;
