//! Shared types for the SmartCollar alert handlers.
//!
//! - Data model of a user's subtree (settings, geofence, notifications)
//! - Realtime database path layout
//! - Injected clock
//! - Error taxonomy and env-based configuration

pub mod clock;
pub mod config;
pub mod error;
pub mod model;
pub mod paths;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::*;
pub use model::*;
pub use paths::{DbPath, PetRef, UserRef};
