//! Outcome of evaluating one telemetry reading.

use serde::Serialize;

use smartcollar_core::AlertType;

/// Cooldown entries cleared when heart rate is back in range.
pub const HEART_RATE_TYPES: &[AlertType] = &[AlertType::HrHigh, AlertType::HrLow];

/// Cooldown entries cleared when temperature is back in range.
pub const TEMPERATURE_TYPES: &[AlertType] = &[AlertType::TempHigh, AlertType::TempLow];

/// Cooldown entry cleared when the pet is back inside its safe zone.
pub const GEOFENCE_TYPES: &[AlertType] = &[AlertType::Geofence];

/// A condition worth telling the owner about.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub alert_type: AlertType,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AlertDecision {
    /// Alerting disabled or not configured. No cooldown side effects.
    NoAlert,
    /// Reading is out of bounds.
    Alert(Alert),
    /// Reading is back in bounds; every listed cooldown entry must be reset.
    Clear { reset: &'static [AlertType] },
}

impl AlertDecision {
    pub fn alert(alert_type: AlertType, message: impl Into<String>) -> Self {
        AlertDecision::Alert(Alert {
            alert_type,
            message: message.into(),
        })
    }

    pub fn is_alert(&self) -> bool {
        matches!(self, AlertDecision::Alert(_))
    }

    /// Alert type carried by an `Alert` decision.
    pub fn alert_type(&self) -> Option<AlertType> {
        match self {
            AlertDecision::Alert(a) => Some(a.alert_type),
            _ => None,
        }
    }
}

/// Notification title for an alert, e.g. `SmartCollar Alert: bpm`.
pub fn alert_title(prefix: &str, alert_type: AlertType) -> String {
    let subject = match alert_type {
        AlertType::HrHigh | AlertType::HrLow => "bpm",
        AlertType::TempHigh | AlertType::TempLow => "temperature",
        AlertType::Geofence => "Geofence",
    };
    format!("{prefix}: {subject}")
}
