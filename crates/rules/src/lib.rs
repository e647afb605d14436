//! Alert evaluation for collar telemetry.
//!
//! This crate provides:
//! - Heart-rate and temperature threshold evaluation
//! - Haversine geofence evaluation
//! - `AlertDecision`, the shared outcome type
//! - `CooldownTracker`, the per-pet notification debounce

pub mod cooldown;
pub mod decision;
pub mod geofence;
pub mod threshold;

pub use cooldown::{CooldownTracker, COOLDOWN_MS};
pub use decision::{alert_title, Alert, AlertDecision};
pub use geofence::{evaluate_geofence, haversine_distance};
pub use threshold::{evaluate_threshold, ThresholdKind};
