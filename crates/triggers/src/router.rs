//! Routes telemetry change events to the matching handler.
//!
//! | path                               | handler          |
//! |------------------------------------|------------------|
//! | `.../collar_data/bpm`              | threshold (bpm)  |
//! | `.../collar_data/temperature`      | threshold (temp) |
//! | `.../collar_data/location`         | geofence         |

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use smartcollar_rules::ThresholdKind;

use crate::event::TelemetryEvent;
use crate::handlers::{AlertHandlers, HandlerOutcome, SkipReason};

#[derive(Clone)]
pub struct TriggerRouter {
    handlers: Arc<AlertHandlers>,
}

impl TriggerRouter {
    pub fn new(handlers: Arc<AlertHandlers>) -> Self {
        Self { handlers }
    }

    /// Handle a change reported as a raw path and value.
    pub async fn dispatch_raw(&self, path: &str, value: Value) -> HandlerOutcome {
        match TelemetryEvent::from_path(path, value) {
            Ok(event) => self.dispatch(&event).await,
            Err(e) => {
                warn!(path, error = %e, "Ignoring change outside collar telemetry");
                HandlerOutcome::Skipped(SkipReason::InvalidPath)
            }
        }
    }

    pub async fn dispatch(&self, event: &TelemetryEvent) -> HandlerOutcome {
        if let Some(kind) = ThresholdKind::from_channel(event.channel) {
            return match event.scalar() {
                Some(value) => self.handlers.check_threshold(&event.pet, kind, value).await,
                None => {
                    warn!(
                        uid = %event.pet.uid,
                        pet_id = %event.pet.pet_id,
                        channel = %event.channel,
                        value = %event.value,
                        "Non-numeric reading, skipping"
                    );
                    HandlerOutcome::Skipped(SkipReason::InvalidReading)
                }
            };
        }

        match event.coordinates() {
            Some(position) => self.handlers.check_geofence(&event.pet, position).await,
            None => {
                debug!(
                    uid = %event.pet.uid,
                    pet_id = %event.pet.pet_id,
                    "Location without latitude and longitude, skipping"
                );
                HandlerOutcome::Skipped(SkipReason::InvalidReading)
            }
        }
    }
}
