//! Telemetry change events delivered by the database trigger platform.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use smartcollar_core::{Channel, CollarError, Coordinates, PetRef};

/// One line of the worker's event feed: the changed path and its new value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvent {
    pub path: String,
    #[serde(default)]
    pub value: Value,
}

/// A value change on `users/{uid}/pets/{petId}/collar_data/{channel}`.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryEvent {
    pub pet: PetRef,
    pub channel: Channel,
    pub value: Value,
}

impl TelemetryEvent {
    pub fn new(pet: PetRef, channel: Channel, value: Value) -> Self {
        Self {
            pet,
            channel,
            value,
        }
    }

    /// Build an event from the path that changed.
    pub fn from_path(path: &str, value: Value) -> Result<Self, CollarError> {
        let (pet, channel) = PetRef::parse_collar_path(path)?;
        Ok(Self::new(pet, channel, value))
    }

    /// Scalar reading for bpm / temperature.
    ///
    /// Collars on older firmware write numbers as strings, so numeric
    /// strings are accepted too.
    pub fn scalar(&self) -> Option<f64> {
        let v = match &self.value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }?;
        v.is_finite().then_some(v)
    }

    /// Position for location events; `None` unless both coordinates are numbers.
    pub fn coordinates(&self) -> Option<Coordinates> {
        let latitude = self.value.get("latitude")?.as_f64()?;
        let longitude = self.value.get("longitude")?.as_f64()?;
        Some(Coordinates {
            latitude,
            longitude,
        })
    }
}

impl TryFrom<RawEvent> for TelemetryEvent {
    type Error = CollarError;

    fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
        TelemetryEvent::from_path(&raw.path, raw.value)
    }
}
