//! Typed reads of per-user configuration records.
//!
//! The app writes these as loose JSON. Anything absent or structurally
//! wrong is reported as a [`RecordError`] that callers treat as
//! "no configuration" instead of a fault.

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

use smartcollar_core::{CollarError, DbPath, Geofence, NotificationSettings, PetRef, UserRef};

use crate::backend::RealtimeStore;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("no record at {0}")]
    Missing(String),

    #[error("invalid record at {path}: {reason}")]
    Invalid { path: String, reason: String },

    #[error(transparent)]
    Store(#[from] CollarError),
}

impl RecordError {
    /// Missing and invalid records both mean "not configured".
    pub fn is_missing_configuration(&self) -> bool {
        matches!(self, RecordError::Missing(_) | RecordError::Invalid { .. })
    }
}

impl From<RecordError> for CollarError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::Store(e) => e,
            other => CollarError::MissingConfiguration(other.to_string()),
        }
    }
}

/// Value-level checks run after deserialization.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

impl Validate for NotificationSettings {
    fn validate(&self) -> Result<(), String> {
        NotificationSettings::validate(self)
    }
}

impl Validate for Geofence {
    fn validate(&self) -> Result<(), String> {
        Geofence::validate(self)
    }
}

/// Read, deserialize and validate the record at `path`.
pub async fn read_record<T>(store: &dyn RealtimeStore, path: &DbPath) -> Result<T, RecordError>
where
    T: DeserializeOwned + Validate,
{
    let value = store
        .get(path)
        .await?
        .ok_or_else(|| RecordError::Missing(path.to_string()))?;

    let record: T = serde_json::from_value(value).map_err(|e| RecordError::Invalid {
        path: path.to_string(),
        reason: e.to_string(),
    })?;

    record.validate().map_err(|reason| RecordError::Invalid {
        path: path.to_string(),
        reason,
    })?;

    Ok(record)
}

pub async fn read_settings(
    store: &dyn RealtimeStore,
    pet: &PetRef,
) -> Result<NotificationSettings, RecordError> {
    read_record(store, &pet.settings_path()).await
}

pub async fn read_geofence(store: &dyn RealtimeStore, pet: &PetRef) -> Result<Geofence, RecordError> {
    read_record(store, &pet.geofence_path()).await
}

/// The user's push token, if one is registered.
///
/// Empty strings and non-string values count as "no token".
pub async fn read_device_token(
    store: &dyn RealtimeStore,
    user: &UserRef,
) -> Result<Option<String>, CollarError> {
    let path = user.device_token_path();
    match store.get(&path).await? {
        Some(serde_json::Value::String(token)) if !token.trim().is_empty() => Ok(Some(token)),
        Some(serde_json::Value::String(_)) | None => Ok(None),
        Some(other) => {
            warn!(uid = %user.uid, value = %other, "device token is not a string, ignoring");
            Ok(None)
        }
    }
}
