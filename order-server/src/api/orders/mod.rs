//! Order API Module
//!
//! Read-only access to accepted orders. All mutations go through the intake
//! channel.

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new()
        // Orders in a bounded time range (defaults to the last day)
        .route("/orders", get(handler::list_by_range))
        // Single order by its assigned number
        .route("/orders/order/{order_number}", get(handler::get_by_order_number))
        // All orders submitted by one client
        .route("/orders/client/{client_id}", get(handler::list_by_client))
}
