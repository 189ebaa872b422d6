//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use shared::models::Order;

use crate::core::ServerState;
use crate::utils::AppResult;

/// Query params for the range listing. Both bounds are epoch milliseconds
/// and optional; defaults are resolved by the query service.
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub begin: Option<i64>,
    pub end: Option<i64>,
}

/// List orders within a bounded time range
pub async fn list_by_range(
    State(state): State<ServerState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = state.query.list_by_range(query.begin, query.end).await?;
    Ok(Json(orders))
}

/// Fetch an order by its assigned number. Unknown numbers yield `null`,
/// not an error.
pub async fn get_by_order_number(
    State(state): State<ServerState>,
    Path(order_number): Path<i64>,
) -> AppResult<Json<Option<Order>>> {
    let order = state.query.get_by_order_number(order_number).await?;
    Ok(Json(order))
}

/// List orders submitted by one client
pub async fn list_by_client(
    State(state): State<ServerState>,
    Path(client_id): Path<i64>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = state.query.list_by_client(client_id).await?;
    Ok(Json(orders))
}
