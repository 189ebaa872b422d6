//! Query service
//!
//! Read-only access to persisted orders: by number, by client, or by a
//! bounded `ordered_at` range. No ordering guarantee is imposed on list
//! results beyond what the repository returns.

use sqlx::SqlitePool;

use shared::models::Order;
use shared::util::{DAY_MILLIS, now_millis};

use super::OrderRejection;
use crate::db::repository;
use crate::utils::AppError;

#[derive(Clone)]
pub struct QueryService {
    pool: SqlitePool,
}

impl QueryService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fetch a single order; unknown numbers are an absent result, never an
    /// error.
    pub async fn get_by_order_number(&self, order_number: i64) -> Result<Option<Order>, AppError> {
        Ok(repository::order::find_by_order_number(&self.pool, order_number).await?)
    }

    /// All orders submitted by one client; empty for unknown clients.
    pub async fn list_by_client(&self, client_id: i64) -> Result<Vec<Order>, AppError> {
        Ok(repository::order::list_by_client_id(&self.pool, client_id).await?)
    }

    /// Orders with `ordered_at` in `[begin, end]`, both bounds inclusive.
    ///
    /// `end` defaults to now, `begin` to `end` minus one day. The span is
    /// capped at one day.
    pub async fn list_by_range(
        &self,
        begin: Option<i64>,
        end: Option<i64>,
    ) -> Result<Vec<Order>, AppError> {
        let end = end.unwrap_or_else(now_millis);
        let begin = begin.unwrap_or(end - DAY_MILLIS);

        if begin > end {
            return Err(
                OrderRejection::InvalidRangeFilter("Begin date is after end date".into()).into(),
            );
        }
        if end - begin > DAY_MILLIS {
            return Err(OrderRejection::InvalidRangeFilter("Max range exceeded".into()).into());
        }

        Ok(repository::order::list_by_range(&self.pool, begin, end).await?)
    }
}
