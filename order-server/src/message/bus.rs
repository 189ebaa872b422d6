//! Message bus core
//!
//! # Message flow
//!
//! ```text
//! Client ──▶ send_to_server() ──▶ client_tx ──▶ IntakeHandler
//!                                           │
//! Server ──▶ publish() ────────▶ server_tx ──┤
//!                                           ▼
//!                                    Connected clients
//! ```

use std::sync::Arc;

use dashmap::DashMap;
use shared::message::BusMessage;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use super::transport::{MemoryTransport, Transport};
use crate::utils::AppError;

/// Configuration for the transport layer
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tcp_listen_addr: String,
    /// Capacity of the broadcast channels
    pub channel_capacity: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tcp_listen_addr: "0.0.0.0:8081".to_string(),
            channel_capacity: 1024,
        }
    }
}

/// Message bus — routes frames between clients and the intake handler
#[derive(Debug, Clone)]
pub struct MessageBus {
    /// Client-to-server message channel
    client_tx: broadcast::Sender<BusMessage>,
    /// Server-to-client broadcast channel
    server_tx: broadcast::Sender<BusMessage>,
    /// Transport configuration
    pub(crate) config: TransportConfig,
    /// Shutdown signal token
    shutdown_token: CancellationToken,
    /// Connected clients (client id -> transport)
    pub(crate) clients: Arc<DashMap<String, Arc<dyn Transport>>>,
}

impl MessageBus {
    /// Create a bus with default configuration
    pub fn new() -> Self {
        Self::from_config(TransportConfig::default())
    }

    /// Create a bus from configuration
    pub fn from_config(config: TransportConfig) -> Self {
        let capacity = config.channel_capacity;
        let (client_tx, _) = broadcast::channel(capacity);
        let (server_tx, _) = broadcast::channel(capacity);
        Self {
            client_tx,
            server_tx,
            config,
            shutdown_token: CancellationToken::new(),
            clients: Arc::new(DashMap::new()),
        }
    }

    /// Publish a message (server -> all subscribers)
    pub async fn publish(&self, msg: BusMessage) -> Result<(), AppError> {
        self.server_tx
            .send(msg)
            .map_err(|e| AppError::internal(e.to_string()))?;
        Ok(())
    }

    /// Send a message to the server side (client -> server)
    pub async fn send_to_server(&self, msg: BusMessage) -> Result<(), AppError> {
        self.client_tx
            .send(msg)
            .map_err(|e| AppError::internal(e.to_string()))?;
        Ok(())
    }

    /// Subscribe to client frames (server side)
    pub fn subscribe_to_clients(&self) -> broadcast::Receiver<BusMessage> {
        self.client_tx.subscribe()
    }

    /// Subscribe to server broadcasts (client side)
    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.server_tx.subscribe()
    }

    /// Memory transport subscribed to server broadcasts
    pub fn memory_transport(&self) -> MemoryTransport {
        MemoryTransport::new(&self.server_tx)
    }

    /// Memory transport that can also submit client frames
    pub fn client_memory_transport(&self) -> MemoryTransport {
        MemoryTransport::with_client_sender(&self.server_tx, &self.client_tx)
    }

    /// Client-to-server sender
    pub fn sender_to_server(&self) -> &broadcast::Sender<BusMessage> {
        &self.client_tx
    }

    /// Server broadcast sender
    pub fn sender(&self) -> &broadcast::Sender<BusMessage> {
        &self.server_tx
    }

    /// Shutdown token (observe to stop background tasks)
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    /// Number of currently connected clients
    pub fn connected_clients(&self) -> usize {
        self.clients.len()
    }

    /// Gracefully shut down the bus and every task watching its token
    pub fn shutdown(&self) {
        tracing::info!("Shutting down message bus");
        self.shutdown_token.cancel();
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}
