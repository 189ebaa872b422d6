//! Shared types for the order intake platform
//!
//! Common types used by the order server and its clients: domain models,
//! intake channel message frames and payloads, and small time utilities.

pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Message bus re-exports (for convenient access)
pub use message::{BusMessage, EventType};
