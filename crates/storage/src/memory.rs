//! In-process JSON tree implementing [`RealtimeStore`].
//!
//! Used by the local worker and by tests. The whole tree sits behind a
//! `std::sync::RwLock`; no lock is held across an `.await`.

use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use smartcollar_core::{CollarError, DbPath};

use crate::backend::RealtimeStore;

pub struct MemoryStore {
    tree: RwLock<Value>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self {
            tree: RwLock::new(Value::Object(Map::new())),
        }
    }

    /// Store seeded with an existing tree. Non-object roots start empty.
    pub fn from_value(value: Value) -> Self {
        let root = match normalize(value) {
            v @ Value::Object(_) => v,
            _ => Value::Object(Map::new()),
        };
        Self {
            tree: RwLock::new(root),
        }
    }

    /// Seed from a JSON snapshot file.
    pub fn load_snapshot(path: &Path) -> Result<Self, CollarError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CollarError::read(path.display(), e))?;
        let value: Value = serde_json::from_str(&raw)
            .map_err(|e| CollarError::read(path.display(), format!("invalid JSON: {e}")))?;
        info!("Store: seeded from snapshot {}", path.display());
        Ok(Self::from_value(value))
    }

    /// Write the current tree to a JSON file.
    pub fn save_snapshot(&self, path: &Path) -> Result<(), CollarError> {
        let tree = self.snapshot()?;
        let json = serde_json::to_string_pretty(&tree)
            .map_err(|e| CollarError::write(path.display(), e))?;
        std::fs::write(path, json).map_err(|e| CollarError::write(path.display(), e))?;
        info!("Store: snapshot written to {}", path.display());
        Ok(())
    }

    /// Clone of the whole tree.
    pub fn snapshot(&self) -> Result<Value, CollarError> {
        let guard = self
            .tree
            .read()
            .map_err(|_| CollarError::read("/", "store lock poisoned"))?;
        Ok(guard.clone())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RealtimeStore for MemoryStore {
    async fn get(&self, path: &DbPath) -> Result<Option<Value>, CollarError> {
        let guard = self
            .tree
            .read()
            .map_err(|_| CollarError::read(path, "store lock poisoned"))?;
        Ok(lookup(&guard, path.segments()).cloned())
    }

    async fn set(&self, path: &DbPath, value: Value) -> Result<(), CollarError> {
        let mut guard = self
            .tree
            .write()
            .map_err(|_| CollarError::write(path, "store lock poisoned"))?;
        store_value(&mut guard, path.segments(), normalize(value));
        debug!(path = %path, "store set");
        Ok(())
    }

    async fn remove(&self, path: &DbPath) -> Result<(), CollarError> {
        let mut guard = self
            .tree
            .write()
            .map_err(|_| CollarError::write(path, "store lock poisoned"))?;
        delete_at(&mut guard, path.segments());
        debug!(path = %path, "store remove");
        Ok(())
    }

    async fn push(&self, path: &DbPath, value: Value) -> Result<String, CollarError> {
        // v7 keys are time-ordered, like the platform's push ids.
        let key = Uuid::now_v7().simple().to_string();
        let child = path.child(key.clone());
        let mut guard = self
            .tree
            .write()
            .map_err(|_| CollarError::write(&child, "store lock poisoned"))?;
        store_value(&mut guard, child.segments(), normalize(value));
        debug!(path = %child, "store push");
        Ok(key)
    }

    async fn compare_and_set(
        &self,
        path: &DbPath,
        expected: Option<&Value>,
        value: Value,
    ) -> Result<bool, CollarError> {
        let mut guard = self
            .tree
            .write()
            .map_err(|_| CollarError::write(path, "store lock poisoned"))?;
        if lookup(&guard, path.segments()) != expected {
            return Ok(false);
        }
        store_value(&mut guard, path.segments(), normalize(value));
        Ok(true)
    }
}

// ── Tree helpers ────────────────────────────────────────────────────

fn lookup<'a>(node: &'a Value, segments: &[String]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(node, |current, seg| current.get(seg.as_str()))
        .filter(|v| !v.is_null())
}

/// Null deletes; anything else replaces the subtree.
fn store_value(root: &mut Value, segments: &[String], value: Value) {
    if value.is_null() {
        delete_at(root, segments);
    } else {
        write_at(root, segments, value);
    }
}

fn write_at(node: &mut Value, segments: &[String], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *node = value;
        return;
    };
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        let child = map.entry(head.clone()).or_insert(Value::Null);
        write_at(child, rest, value);
    }
}

/// Remove the node at `segments`, pruning parents left empty.
fn delete_at(node: &mut Value, segments: &[String]) {
    let Some((head, rest)) = segments.split_first() else {
        *node = Value::Object(Map::new());
        return;
    };
    let Value::Object(map) = node else {
        return;
    };
    if rest.is_empty() {
        map.remove(head);
        return;
    }
    if let Some(child) = map.get_mut(head) {
        delete_at(child, rest);
        if is_empty_object(child) {
            map.remove(head);
        }
    }
}

fn is_empty_object(value: &Value) -> bool {
    matches!(value, Value::Object(m) if m.is_empty())
}

/// Drop null members and empty objects; an empty result becomes null.
fn normalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let cleaned: Map<String, Value> = map
                .into_iter()
                .map(|(k, v)| (k, normalize(v)))
                .filter(|(_, v)| !v.is_null())
                .collect();
            if cleaned.is_empty() {
                Value::Null
            } else {
                Value::Object(cleaned)
            }
        }
        other => other,
    }
}
