//! Min/max bound checks for heart rate and temperature.

use std::fmt;

use smartcollar_core::{AlertType, Channel, NotificationSettings};

use crate::decision::{AlertDecision, HEART_RATE_TYPES, TEMPERATURE_TYPES};

/// Scalar telemetry channels that have thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThresholdKind {
    Bpm,
    Temperature,
}

impl ThresholdKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdKind::Bpm => "bpm",
            ThresholdKind::Temperature => "temperature",
        }
    }

    /// Location has no scalar threshold.
    pub fn from_channel(channel: Channel) -> Option<Self> {
        match channel {
            Channel::Bpm => Some(ThresholdKind::Bpm),
            Channel::Temperature => Some(ThresholdKind::Temperature),
            Channel::Location => None,
        }
    }
}

impl fmt::Display for ThresholdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compare `value` against the pet's bounds for `kind`.
///
/// Comparisons are strict, so a reading equal to a bound is in range.
pub fn evaluate_threshold(
    settings: &NotificationSettings,
    kind: ThresholdKind,
    value: f64,
) -> AlertDecision {
    match kind {
        ThresholdKind::Bpm => {
            if !settings.heart_rate_alert {
                return AlertDecision::NoAlert;
            }
            let (min, max) = (settings.min_heart_rate, settings.max_heart_rate);
            if value > max {
                AlertDecision::alert(
                    AlertType::HrHigh,
                    format!("Heart rate too high: {value} bpm (max {max})"),
                )
            } else if value < min {
                AlertDecision::alert(
                    AlertType::HrLow,
                    format!("Heart rate too low: {value} bpm (min {min})"),
                )
            } else {
                AlertDecision::Clear { reset: HEART_RATE_TYPES }
            }
        }
        ThresholdKind::Temperature => {
            if !settings.temp_alert {
                return AlertDecision::NoAlert;
            }
            let (min, max) = (settings.min_temp, settings.max_temp);
            if value > max {
                AlertDecision::alert(
                    AlertType::TempHigh,
                    format!("Temperature too high: {value}°C (max {max}°C)"),
                )
            } else if value < min {
                AlertDecision::alert(
                    AlertType::TempLow,
                    format!("Temperature too low: {value}°C (min {min}°C)"),
                )
            } else {
                AlertDecision::Clear { reset: TEMPERATURE_TYPES }
            }
        }
    }
}
