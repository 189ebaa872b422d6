//! Server Implementation
//!
//! Lifecycle for the two listeners: the intake TCP channel and the HTTP
//! query API. Shutdown is driven by ctrl-c, which cancels the bus token so
//! every background task stops with the HTTP server.

use crate::api;
use crate::core::{Config, ServerState};
use crate::utils::AppError;

pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create a server with existing state (tests, embedded runs)
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> Result<(), AppError> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        // Start background tasks (intake handler)
        state.start_background_tasks();

        // Start the intake TCP server
        let bus = state.bus.clone();
        tokio::spawn(async move {
            if let Err(e) = bus.start_tcp_server().await {
                tracing::error!("Intake TCP server failed: {}", e);
            }
        });

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        tracing::info!("Order server query API listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind HTTP listener: {e}")))?;

        let router = api::build_router(state.clone());

        let shutdown_bus = state.bus.clone();
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
                shutdown_bus.shutdown();
            })
            .await
            .map_err(|e| AppError::internal(format!("HTTP server failed: {e}")))?;

        Ok(())
    }
}
