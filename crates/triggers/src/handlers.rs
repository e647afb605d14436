//! Threshold and geofence handlers.
//!
//! Each call runs one sequential chain:
//!
//! ```text
//! read config ──▶ evaluate ──▶ Alert ──▶ cooldown claim ──▶ dispatch
//!                          └─▶ Clear ──▶ cooldown reset
//! ```
//!
//! Every failure is logged here; nothing propagates to the trigger source.

use tracing::{debug, error, info};

use smartcollar_core::{AlertType, Coordinates, PetRef};
use smartcollar_notify::{DispatchReport, NotificationDispatcher};
use smartcollar_rules::{
    alert_title, evaluate_geofence, evaluate_threshold, AlertDecision, CooldownTracker,
    ThresholdKind,
};
use smartcollar_storage::{read_geofence, read_settings, RecordError};

use crate::context::MonitorContext;

/// Why a handler stopped before evaluating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Settings absent or malformed.
    NotConfigured,
    /// The reading could not be interpreted.
    InvalidReading,
    /// The path was not a collar telemetry path.
    InvalidPath,
    /// Configuration could not be read.
    StorageError,
}

/// What a handler invocation ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutcome {
    Skipped(SkipReason),
    /// Alerting disabled for this metric, or no geofence.
    NoAlert,
    /// Reading in range; cooldown entries were reset.
    Cleared,
    /// Out of range but inside the cooldown window.
    Suppressed(AlertType),
    /// Out of range and dispatched.
    Notified {
        alert_type: AlertType,
        report: DispatchReport,
    },
}

pub struct AlertHandlers {
    ctx: MonitorContext,
    cooldown: CooldownTracker,
    dispatcher: NotificationDispatcher,
}

impl AlertHandlers {
    pub fn new(ctx: MonitorContext) -> Self {
        let cooldown = CooldownTracker::new(ctx.store.clone(), ctx.clock.clone());
        let dispatcher =
            NotificationDispatcher::new(ctx.store.clone(), ctx.push.clone(), ctx.clock.clone());
        Self {
            ctx,
            cooldown,
            dispatcher,
        }
    }

    /// Heart-rate or temperature reading changed.
    pub async fn check_threshold(
        &self,
        pet: &PetRef,
        kind: ThresholdKind,
        value: f64,
    ) -> HandlerOutcome {
        let settings = match read_settings(self.ctx.store.as_ref(), pet).await {
            Ok(settings) => settings,
            Err(e) if e.is_missing_configuration() => {
                info!(
                    uid = %pet.uid,
                    pet_id = %pet.pet_id,
                    kind = %kind,
                    reason = %e,
                    "No notification settings, skipping"
                );
                return HandlerOutcome::Skipped(SkipReason::NotConfigured);
            }
            Err(e) => {
                error!(
                    uid = %pet.uid,
                    pet_id = %pet.pet_id,
                    kind = %kind,
                    error = %e,
                    "Error checking threshold"
                );
                return HandlerOutcome::Skipped(SkipReason::StorageError);
            }
        };

        let decision = evaluate_threshold(&settings, kind, value);
        debug!(
            uid = %pet.uid,
            pet_id = %pet.pet_id,
            kind = %kind,
            value,
            ?decision,
            "threshold evaluated"
        );
        self.apply(pet, decision).await
    }

    /// Location changed.
    pub async fn check_geofence(&self, pet: &PetRef, position: Coordinates) -> HandlerOutcome {
        let geofence = match read_geofence(self.ctx.store.as_ref(), pet).await {
            Ok(fence) => Some(fence),
            Err(RecordError::Missing(_)) => None,
            Err(e @ RecordError::Invalid { .. }) => {
                info!(
                    uid = %pet.uid,
                    pet_id = %pet.pet_id,
                    reason = %e,
                    "Geofence is malformed, treating as unset"
                );
                None
            }
            Err(e) => {
                error!(
                    uid = %pet.uid,
                    pet_id = %pet.pet_id,
                    error = %e,
                    "Error checking geofence"
                );
                return HandlerOutcome::Skipped(SkipReason::StorageError);
            }
        };

        let decision = evaluate_geofence(geofence.as_ref(), position);
        debug!(
            uid = %pet.uid,
            pet_id = %pet.pet_id,
            latitude = position.latitude,
            longitude = position.longitude,
            ?decision,
            "geofence evaluated"
        );
        self.apply(pet, decision).await
    }

    async fn apply(&self, pet: &PetRef, decision: AlertDecision) -> HandlerOutcome {
        match decision {
            AlertDecision::NoAlert => HandlerOutcome::NoAlert,
            AlertDecision::Clear { reset } => {
                self.cooldown.reset_all(pet, reset).await;
                HandlerOutcome::Cleared
            }
            AlertDecision::Alert(alert) => {
                if !self.cooldown.should_send(pet, alert.alert_type).await {
                    return HandlerOutcome::Suppressed(alert.alert_type);
                }
                let title = alert_title(&self.ctx.alerts.title_prefix, alert.alert_type);
                let report = self
                    .dispatcher
                    .send(
                        &pet.uid,
                        &title,
                        &alert.message,
                        Some(alert.alert_type),
                        Some(pet.pet_id.as_str()),
                    )
                    .await;
                HandlerOutcome::Notified {
                    alert_type: alert.alert_type,
                    report,
                }
            }
        }
    }
}
