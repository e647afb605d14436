//! Realtime database path layout.
//!
//! ```text
//! users/{uid}/deviceToken
//! users/{uid}/notifications/{autoId}
//! users/{uid}/pets/{petId}/collar_data/{bpm|temperature|location}
//! users/{uid}/pets/{petId}/notification_settings
//! users/{uid}/pets/{petId}/geofence
//! users/{uid}/pets/{petId}/last_alerts/{alertType}
//! ```
//!
//! Paths are mapping keys inside the store, not filesystem paths.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CollarError;
use crate::model::{AlertType, Channel};

/// Characters the realtime database refuses in a key.
const FORBIDDEN_KEY_CHARS: &[char] = &['.', '$', '#', '[', ']', '/'];

/// Slash-separated location in the store tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DbPath {
    segments: Vec<String>,
}

impl DbPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Split on `/`, ignoring leading, trailing and doubled slashes.
    pub fn parse(raw: &str) -> Self {
        Self {
            segments: raw
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for DbPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

/// Check a single key against the store's naming rules.
pub fn validate_key(key: &str) -> Result<(), CollarError> {
    if key.is_empty() {
        return Err(CollarError::InvalidPath("empty key".to_string()));
    }
    if let Some(c) = key.chars().find(|c| FORBIDDEN_KEY_CHARS.contains(c) || c.is_control()) {
        return Err(CollarError::InvalidPath(format!(
            "key '{key}' contains forbidden character {c:?}"
        )));
    }
    Ok(())
}

// ── Users ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserRef {
    pub uid: String,
}

impl UserRef {
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into() }
    }

    pub fn path(&self) -> DbPath {
        DbPath::root().child("users").child(self.uid.clone())
    }

    pub fn notifications_path(&self) -> DbPath {
        self.path().child("notifications")
    }

    pub fn device_token_path(&self) -> DbPath {
        self.path().child("deviceToken")
    }
}

// ── Pets ──────────────────────────────────────────────────────

/// A pet scoped under its owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PetRef {
    pub uid: String,
    pub pet_id: String,
}

impl PetRef {
    pub fn new(uid: impl Into<String>, pet_id: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            pet_id: pet_id.into(),
        }
    }

    pub fn user(&self) -> UserRef {
        UserRef::new(self.uid.clone())
    }

    pub fn path(&self) -> DbPath {
        self.user().path().child("pets").child(self.pet_id.clone())
    }

    pub fn settings_path(&self) -> DbPath {
        self.path().child("notification_settings")
    }

    pub fn geofence_path(&self) -> DbPath {
        self.path().child("geofence")
    }

    pub fn last_alert_path(&self, alert: AlertType) -> DbPath {
        self.path().child("last_alerts").child(alert.as_str())
    }

    pub fn collar_path(&self, channel: Channel) -> DbPath {
        self.path().child("collar_data").child(channel.as_str())
    }

    /// Parse `users/{uid}/pets/{petId}/collar_data/{channel}`.
    pub fn parse_collar_path(raw: &str) -> Result<(PetRef, Channel), CollarError> {
        let path = DbPath::parse(raw);
        match path.segments() {
            [users, uid, pets, pet_id, collar, channel]
                if users == "users" && pets == "pets" && collar == "collar_data" =>
            {
                validate_key(uid)?;
                validate_key(pet_id)?;
                let channel: Channel = channel.parse()?;
                Ok((PetRef::new(uid.clone(), pet_id.clone()), channel))
            }
            _ => Err(CollarError::InvalidPath(format!(
                "'{raw}' is not a collar telemetry path"
            ))),
        }
    }
}

impl fmt::Display for PetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.uid, self.pet_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pet_paths() {
        let pet = PetRef::new("u1", "rex");
        assert_eq!(pet.settings_path().to_string(), "/users/u1/pets/rex/notification_settings");
        assert_eq!(pet.geofence_path().to_string(), "/users/u1/pets/rex/geofence");
        assert_eq!(
            pet.last_alert_path(AlertType::TempLow).to_string(),
            "/users/u1/pets/rex/last_alerts/temp_low"
        );
        assert_eq!(pet.user().device_token_path().to_string(), "/users/u1/deviceToken");
        assert_eq!(pet.user().notifications_path().to_string(), "/users/u1/notifications");
    }

    #[test]
    fn parse_collar_path_accepts_all_channels() {
        for channel in [Channel::Bpm, Channel::Temperature, Channel::Location] {
            let pet = PetRef::new("u1", "rex");
            let raw = pet.collar_path(channel).to_string();
            let (parsed, parsed_channel) = PetRef::parse_collar_path(&raw).unwrap();
            assert_eq!(parsed, pet);
            assert_eq!(parsed_channel, channel);
        }
    }

    #[test]
    fn parse_collar_path_tolerates_slashes() {
        let (pet, channel) = PetRef::parse_collar_path("users/u1/pets/rex/collar_data/bpm/").unwrap();
        assert_eq!(pet.pet_id, "rex");
        assert_eq!(channel, Channel::Bpm);
    }

    #[test]
    fn parse_collar_path_rejects_other_paths() {
        assert!(PetRef::parse_collar_path("/users/u1/pets/rex/geofence").is_err());
        assert!(PetRef::parse_collar_path("/users/u1/pets/rex/collar_data/steps").is_err());
        assert!(PetRef::parse_collar_path("/devices/u1/pets/rex/collar_data/bpm").is_err());
        assert!(PetRef::parse_collar_path("").is_err());
    }

    #[test]
    fn validate_key_rules() {
        assert!(validate_key("abc-123_x").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("a.b").is_err());
        assert!(validate_key("a#b").is_err());
    }

    #[test]
    fn parse_normalizes_slashes() {
        let p = DbPath::parse("//users/u1//notifications/");
        assert_eq!(p.segments(), ["users", "u1", "notifications"]);
        assert_eq!(p.to_string(), "/users/u1/notifications");
        assert_eq!(DbPath::parse("/"), DbPath::root());
        assert_eq!(DbPath::root().to_string(), "/");
    }
}
