//! Order number allocation
//!
//! A process-wide monotonic counter, seeded once at startup from the highest
//! persisted order number. The allocator is the single serialization point
//! for concurrent submissions: every `next()` returns a number never handed
//! out before by this instance.
//!
//! The counter is local to one running process. Running two instances
//! against the same store is not supported; the PRIMARY KEY on
//! `order_number` turns that misconfiguration into insert failures instead
//! of silent duplicates.

use std::sync::atomic::{AtomicI64, Ordering};

use sqlx::SqlitePool;

use crate::db::repository;
use crate::utils::AppError;

#[derive(Debug)]
pub struct SequenceAllocator {
    counter: AtomicI64,
}

impl SequenceAllocator {
    /// Create an allocator that will hand out `start + 1` next.
    pub fn new(start: i64) -> Self {
        Self {
            counter: AtomicI64::new(start),
        }
    }

    /// Seed from the repository's highest persisted order number (0 when the
    /// store is empty).
    pub async fn seed(pool: &SqlitePool) -> Result<Self, AppError> {
        let start = repository::order::find_highest_order_number(pool)
            .await
            .map_err(AppError::from)?
            .map(|order| order.order_number)
            .unwrap_or(0);

        tracing::info!(start, "Sequence allocator seeded");
        Ok(Self::new(start))
    }

    /// Allocate the next order number. Atomic: exactly-once per call,
    /// strictly greater than every previously returned value.
    pub fn next(&self) -> i64 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Last allocated number (the seed value before any allocation).
    pub fn current(&self) -> i64 {
        self.counter.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn starts_after_the_seed_value() {
        let allocator = SequenceAllocator::new(42);
        assert_eq!(allocator.current(), 42);
        assert_eq!(allocator.next(), 43);
        assert_eq!(allocator.next(), 44);
        assert_eq!(allocator.current(), 44);
    }

    #[test]
    fn empty_store_starts_at_one() {
        let allocator = SequenceAllocator::new(0);
        assert_eq!(allocator.next(), 1);
    }

    #[test]
    fn concurrent_allocations_are_unique_and_dense() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 250;

        let allocator = Arc::new(SequenceAllocator::new(0));
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let allocator = allocator.clone();
                std::thread::spawn(move || {
                    (0..PER_THREAD).map(|_| allocator.next()).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut numbers: Vec<i64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        numbers.sort_unstable();
        numbers.dedup();

        // No repeats, no gaps: exactly 1..=N.
        assert_eq!(numbers.len(), THREADS * PER_THREAD);
        assert_eq!(numbers.first(), Some(&1));
        assert_eq!(numbers.last(), Some(&((THREADS * PER_THREAD) as i64)));
    }
}
