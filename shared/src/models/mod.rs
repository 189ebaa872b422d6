//! Data models
//!
//! Shared between order-server and clients (via the intake channel and the
//! query API). Submission types keep every field optional so the intake
//! validator owns all presence rules; persisted types are fully required.
//! Wire field names are camelCase.

pub mod order;

// Re-exports
pub use order::*;
