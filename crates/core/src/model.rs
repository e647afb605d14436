//! Records stored under a user's subtree of the realtime database.
//!
//! Field names follow the wire format written by the mobile app
//! (`heartRateAlert`, `petId`, ...), so every struct here is
//! `camelCase` on the wire.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CollarError;

/// `type` written on notifications that carry no alert type.
pub const DEFAULT_NOTIFICATION_TYPE: &str = "alert";

/// `source` written on every notification produced here.
pub const NOTIFICATION_SOURCE: &str = "server";

// ── Alert types ───────────────────────────────────────────────

/// Alert categories, each with its own cooldown entry under `last_alerts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    HrHigh,
    HrLow,
    TempHigh,
    TempLow,
    Geofence,
}

impl AlertType {
    pub const ALL: [AlertType; 5] = [
        AlertType::HrHigh,
        AlertType::HrLow,
        AlertType::TempHigh,
        AlertType::TempLow,
        AlertType::Geofence,
    ];

    /// Wire value, also used as the key under `last_alerts`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::HrHigh => "hr_high",
            AlertType::HrLow => "hr_low",
            AlertType::TempHigh => "temp_high",
            AlertType::TempLow => "temp_low",
            AlertType::Geofence => "geofence",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertType {
    type Err = CollarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlertType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CollarError::InvalidPath(format!("unknown alert type '{s}'")))
    }
}

// ── Telemetry channels ────────────────────────────────────────

/// The three collar telemetry channels under `collar_data/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Bpm,
    Temperature,
    Location,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Bpm => "bpm",
            Channel::Temperature => "temperature",
            Channel::Location => "location",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = CollarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bpm" => Ok(Channel::Bpm),
            "temperature" => Ok(Channel::Temperature),
            "location" => Ok(Channel::Location),
            other => Err(CollarError::InvalidPath(format!(
                "unknown telemetry channel '{other}'"
            ))),
        }
    }
}

// ── Per-pet configuration ─────────────────────────────────────

/// `users/{uid}/pets/{petId}/notification_settings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub heart_rate_alert: bool,
    pub min_heart_rate: f64,
    pub max_heart_rate: f64,
    pub temp_alert: bool,
    pub min_temp: f64,
    pub max_temp: f64,
}

impl NotificationSettings {
    /// Reject bounds that cannot be compared against a reading.
    pub fn validate(&self) -> Result<(), String> {
        let bounds = [
            ("minHeartRate", self.min_heart_rate),
            ("maxHeartRate", self.max_heart_rate),
            ("minTemp", self.min_temp),
            ("maxTemp", self.max_temp),
        ];
        for (name, value) in bounds {
            if !value.is_finite() {
                return Err(format!("{name} must be a finite number"));
            }
        }
        Ok(())
    }
}

/// Circular safe zone, `users/{uid}/pets/{petId}/geofence`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geofence {
    pub latitude: f64,
    pub longitude: f64,
    /// Metres.
    pub radius: f64,
}

impl Geofence {
    pub fn validate(&self) -> Result<(), String> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(format!("latitude {} out of range", self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(format!("longitude {} out of range", self.longitude));
        }
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(format!("radius {} must be a non-negative number", self.radius));
        }
        Ok(())
    }

    pub fn center(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// A GPS fix in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

// ── Notification log ──────────────────────────────────────────

/// Entry appended to `users/{uid}/notifications`. Never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub title: String,
    pub message: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub pet_id: Option<String>,
    pub source: String,
}

impl Notification {
    /// Build a server-originated notification record.
    pub fn server(
        title: impl Into<String>,
        message: impl Into<String>,
        timestamp: i64,
        kind: Option<AlertType>,
        pet_id: Option<&str>,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            timestamp,
            kind: kind
                .map(|k| k.as_str().to_string())
                .unwrap_or_else(|| DEFAULT_NOTIFICATION_TYPE.to_string()),
            pet_id: pet_id.map(str::to_string),
            source: NOTIFICATION_SOURCE.to_string(),
        }
    }
}
