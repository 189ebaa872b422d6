//! Order pipeline
//!
//! The only code allowed to create order state. Submissions flow
//! validator → dedup lookup → sequence allocator → repository insert; reads
//! go through [`QueryService`]. Everything else in the server is an adapter
//! around these four pieces.

pub mod intake;
pub mod query;
pub mod sequence;
pub mod validator;

#[cfg(test)]
mod tests;

// Re-exports
pub use intake::{IntakeService, SubmitOutcome};
pub use query::QueryService;
pub use sequence::SequenceAllocator;
pub use validator::{ValidOrder, validate};

/// Rejection kinds for order submissions and query filters.
///
/// The inner string is the full human-readable reason; adapters must pass it
/// through unaltered. Duplicate checksums are NOT a rejection — they are a
/// normal negative outcome, see [`SubmitOutcome::Duplicate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderRejection {
    /// Missing/blank checksum
    #[error("{0}")]
    InvalidOrder(String),

    /// Missing client, bad id, blank name or tax id
    #[error("{0}")]
    InvalidClient(String),

    /// Missing address or any blank address field
    #[error("{0}")]
    InvalidClientAddress(String),

    /// Missing/empty product list or a failing product field check
    #[error("{0}")]
    InvalidProduct(String),

    /// Range filter out of order or wider than the one-day cap
    #[error("{0}")]
    InvalidRangeFilter(String),
}
