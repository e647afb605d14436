//! Realtime database access for the alert handlers.
//!
//! - `RealtimeStore` trait: the boundary to the external database
//! - `MemoryStore`: in-process JSON tree, seedable from a snapshot file
//! - Typed, validated reads of settings, geofence and device token

pub mod backend;
pub mod memory;
pub mod records;

pub use backend::RealtimeStore;
pub use memory::MemoryStore;
pub use records::{read_device_token, read_geofence, read_record, read_settings, RecordError};
