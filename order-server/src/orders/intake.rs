//! Intake service
//!
//! The single entry point that mutates order state. One successful call
//! performs exactly one allocator increment and one repository insert; a
//! rejected or duplicate call performs neither insert nor any other side
//! effect (a lost dedup race burns the already-allocated number, see
//! `submit`).

use std::sync::Arc;

use sqlx::SqlitePool;

use shared::models::{Order, OrderSubmission};
use shared::util::now_millis;

use super::{SequenceAllocator, validator};
use crate::db::repository::{self, RepoError};
use crate::utils::AppError;

/// Terminal outcome of a submission that did not error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Accepted and persisted under the assigned number.
    Accepted { order_number: i64 },
    /// An order with the same checksum already exists. Nothing was persisted.
    Duplicate,
}

#[derive(Clone)]
pub struct IntakeService {
    pool: SqlitePool,
    allocator: Arc<SequenceAllocator>,
}

impl IntakeService {
    pub fn new(pool: SqlitePool, allocator: Arc<SequenceAllocator>) -> Self {
        Self { pool, allocator }
    }

    /// Build an intake service whose allocator is seeded from the store's
    /// current maximum order number.
    pub async fn seed(pool: SqlitePool) -> Result<Self, AppError> {
        let allocator = Arc::new(SequenceAllocator::seed(&pool).await?);
        Ok(Self::new(pool, allocator))
    }

    pub fn allocator(&self) -> &SequenceAllocator {
        &self.allocator
    }

    /// Validate, deduplicate, number and persist one candidate order.
    ///
    /// The dedup lookup and the insert are not one transaction; two
    /// identical checksums racing past the lookup are resolved by the
    /// UNIQUE(checksum) constraint, and the loser is reported as
    /// [`SubmitOutcome::Duplicate`]. Its already-allocated order number is
    /// burned, so numbers stay strictly increasing but may have gaps.
    pub async fn submit(&self, submission: OrderSubmission) -> Result<SubmitOutcome, AppError> {
        let valid = validator::validate(&submission)?;

        if repository::order::find_by_checksum(&self.pool, &valid.checksum)
            .await?
            .is_some()
        {
            tracing::debug!(checksum = %valid.checksum, "Duplicate order rejected");
            return Ok(SubmitOutcome::Duplicate);
        }

        let order_number = self.allocator.next();
        let order = Order {
            order_number,
            client: valid.client,
            products: valid.products,
            ordered_at: now_millis(),
            checksum: valid.checksum,
        };

        match repository::order::insert(&self.pool, &order).await {
            Ok(()) => {
                tracing::info!(
                    order_number,
                    client_id = order.client.id,
                    "Order registered"
                );
                Ok(SubmitOutcome::Accepted { order_number })
            }
            Err(RepoError::Duplicate(_)) => {
                tracing::debug!(
                    order_number,
                    checksum = %order.checksum,
                    "Duplicate checksum raced past dedup lookup"
                );
                Ok(SubmitOutcome::Duplicate)
            }
            Err(err) => Err(err.into()),
        }
    }
}
