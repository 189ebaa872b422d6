//! API route modules
//!
//! # Structure
//!
//! - [`health`] - liveness check
//! - [`orders`] - read-only order queries
//!
//! All intake (order creation) happens over the message bus; the HTTP
//! surface never mutates order state.

pub mod health;
pub mod orders;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// Build the full application router
pub fn build_router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
