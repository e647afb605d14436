use async_trait::async_trait;
use serde_json::Value;

use smartcollar_core::{CollarError, DbPath};

/// The realtime database as seen by the alert handlers.
///
/// Semantics follow a JSON-tree store: writing `null` deletes, empty
/// objects are not kept, and reads of a missing location return `None`.
#[async_trait]
pub trait RealtimeStore: Send + Sync {
    /// Read the value at `path`.
    async fn get(&self, path: &DbPath) -> Result<Option<Value>, CollarError>;

    /// Overwrite the value at `path`, creating intermediate nodes.
    async fn set(&self, path: &DbPath, value: Value) -> Result<(), CollarError>;

    /// Delete the value at `path`. Deleting a missing path succeeds.
    async fn remove(&self, path: &DbPath) -> Result<(), CollarError>;

    /// Append `value` under a freshly generated child key of `path`.
    /// Returns the generated key.
    async fn push(&self, path: &DbPath, value: Value) -> Result<String, CollarError>;

    /// Write `value` only if the current value equals `expected`
    /// (`None` = absent). Returns whether the write happened.
    async fn compare_and_set(
        &self,
        path: &DbPath,
        expected: Option<&Value>,
        value: Value,
    ) -> Result<bool, CollarError>;
}
