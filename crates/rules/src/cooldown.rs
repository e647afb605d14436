//! Per (pet, alert type) notification debounce.
//!
//! The last-sent time of each alert type lives at
//! `users/{uid}/pets/{petId}/last_alerts/{alertType}` as epoch
//! milliseconds. An entry is written only by [`CooldownTracker::should_send`]
//! and removed only by [`CooldownTracker::reset`].
//!
//! The claim is a compare-and-set against the value that was read, so two
//! handlers racing on the same entry cannot both win inside one window.
//! Storage faults fail open: a real alert is never silently dropped
//! because the cooldown entry could not be read or written.

use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info};

use smartcollar_core::clock::format_epoch_ms;
use smartcollar_core::{AlertType, Clock, CollarError, PetRef};
use smartcollar_storage::RealtimeStore;

/// Minimum time between two notifications of the same type for one pet.
pub const COOLDOWN_MS: i64 = 120_000;

pub struct CooldownTracker {
    store: Arc<dyn RealtimeStore>,
    clock: Arc<dyn Clock>,
}

impl CooldownTracker {
    pub fn new(store: Arc<dyn RealtimeStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Whether a notification of `alert` may go out now.
    ///
    /// On `true` the current time has been recorded as the new last-sent
    /// time. On `false` nothing was written.
    pub async fn should_send(&self, pet: &PetRef, alert: AlertType) -> bool {
        match self.try_claim(pet, alert).await {
            Ok(permitted) => permitted,
            Err(e) => {
                error!(
                    uid = %pet.uid,
                    pet_id = %pet.pet_id,
                    alert_type = %alert,
                    error = %e,
                    "Error checking notification cooldown, sending anyway"
                );
                true
            }
        }
    }

    /// Forget the last-sent time of `alert`. Safe to call repeatedly.
    pub async fn reset(&self, pet: &PetRef, alert: AlertType) {
        match self.store.remove(&pet.last_alert_path(alert)).await {
            Ok(()) => info!(
                uid = %pet.uid,
                pet_id = %pet.pet_id,
                alert_type = %alert,
                "Alert cooldown reset"
            ),
            Err(e) => error!(
                uid = %pet.uid,
                pet_id = %pet.pet_id,
                alert_type = %alert,
                error = %e,
                "Error resetting alert cooldown"
            ),
        }
    }

    /// Reset several entries, e.g. both directions of one metric.
    pub async fn reset_all(&self, pet: &PetRef, alerts: &[AlertType]) {
        for &alert in alerts {
            self.reset(pet, alert).await;
        }
    }

    async fn try_claim(&self, pet: &PetRef, alert: AlertType) -> Result<bool, CollarError> {
        let path = pet.last_alert_path(alert);
        let now = self.clock.now_ms();
        let current = self.store.get(&path).await?;

        if let Some(last) = current.as_ref().and_then(epoch_ms) {
            if now.saturating_sub(last) < COOLDOWN_MS {
                info!(
                    uid = %pet.uid,
                    pet_id = %pet.pet_id,
                    alert_type = %alert,
                    last_alert = %format_epoch_ms(last),
                    "Notification skipped (cooldown)"
                );
                return Ok(false);
            }
        }

        let claimed = self
            .store
            .compare_and_set(&path, current.as_ref(), Value::from(now))
            .await?;
        if !claimed {
            info!(
                uid = %pet.uid,
                pet_id = %pet.pet_id,
                alert_type = %alert,
                "Notification skipped (claimed by a concurrent handler)"
            );
        }
        Ok(claimed)
    }
}

/// Stored timestamps are integers; tolerate floats written by older clients.
/// Zero, negative and non-numeric values count as no cooldown.
fn epoch_ms(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
        .filter(|&ms| ms > 0)
}
