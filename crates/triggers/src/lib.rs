//! Telemetry triggers for the SmartCollar alert handlers.
//!
//! This crate provides:
//! - `TelemetryEvent` parsing of `collar_data` change events
//! - `AlertHandlers` (threshold and geofence checks with cooldown and dispatch)
//! - `TriggerRouter`, the entry point the trigger platform calls
//! - `MonitorContext`, the injected store / push / clock bundle
//! - `FeedRunner`, which drives the handlers from an NDJSON event feed

pub mod context;
pub mod event;
pub mod feed;
pub mod handlers;
pub mod router;

pub use context::MonitorContext;
pub use event::{RawEvent, TelemetryEvent};
pub use feed::{FeedRunner, FeedSummary};
pub use handlers::{AlertHandlers, HandlerOutcome, SkipReason};
pub use router::TriggerRouter;
