//! Memory transport implementation (same-process communication)

use std::sync::Arc;

use async_trait::async_trait;
use shared::message::BusMessage;
use tokio::sync::Mutex;
use tokio::sync::broadcast;

use super::Transport;
use crate::utils::AppError;

/// In-process transport backed by the bus broadcast channels.
///
/// Reads see every server broadcast; writes (when a client sender is
/// attached) land on the client→server channel. Used by tests and by
/// same-process submitters.
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    rx: Arc<Mutex<broadcast::Receiver<BusMessage>>>,
    tx: Option<Arc<broadcast::Sender<BusMessage>>>,
}

impl MemoryTransport {
    /// Subscribe to server broadcasts only
    pub fn new(tx: &broadcast::Sender<BusMessage>) -> Self {
        Self {
            rx: Arc::new(Mutex::new(tx.subscribe())),
            tx: None,
        }
    }

    /// Subscribe to server broadcasts and attach a sender for client frames
    pub fn with_client_sender(
        broadcast_tx: &broadcast::Sender<BusMessage>,
        client_tx: &broadcast::Sender<BusMessage>,
    ) -> Self {
        Self {
            rx: Arc::new(Mutex::new(broadcast_tx.subscribe())),
            tx: Some(Arc::new(client_tx.clone())),
        }
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn read_message(&self) -> Result<BusMessage, AppError> {
        let mut rx = self.rx.lock().await;
        rx.recv()
            .await
            .map_err(|e| AppError::internal(e.to_string()))
    }

    async fn write_message(&self, msg: &BusMessage) -> Result<(), AppError> {
        if let Some(tx) = &self.tx {
            tx.send(msg.clone())
                .map_err(|e| AppError::internal(e.to_string()))?;
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), AppError> {
        Ok(())
    }
}
