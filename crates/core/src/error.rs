use thiserror::Error;

/// Failure taxonomy shared by every alerting component.
///
/// None of these ever reach the event source: handlers log and swallow
/// them. `MissingConfiguration` is a legitimate state (no settings, no
/// geofence, no device token) rather than a fault.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollarError {
    #[error("storage read failed at {path}: {reason}")]
    StorageRead { path: String, reason: String },

    #[error("storage write failed at {path}: {reason}")]
    StorageWrite { path: String, reason: String },

    #[error("push delivery failed: {0}")]
    PushDelivery(String),

    #[error("missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),
}

impl CollarError {
    pub fn read(path: impl ToString, reason: impl ToString) -> Self {
        Self::StorageRead {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn write(path: impl ToString, reason: impl ToString) -> Self {
        Self::StorageWrite {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True for the absent-config state that callers skip quietly.
    pub fn is_missing_configuration(&self) -> bool {
        matches!(self, Self::MissingConfiguration(_))
    }
}
