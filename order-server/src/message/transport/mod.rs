//! Transport layer abstraction
//!
//! Pluggable transports for the intake channel:
//! ```text
//!         ┌────────────────────┐
//!         │   Transport Trait  │
//!         └────────┬───────────┘
//!                  │
//!         ┌────────┴────────┐
//!         ▼                 ▼
//!   TcpTransport      MemoryTransport
//!   (network)         (same-process)
//! ```
//!
//! Wire frame layout: event type (1 byte), request id (16 bytes),
//! correlation id (16 bytes, nil when absent), payload length (4 bytes LE),
//! payload. `source`/`target` are server-side routing metadata and never
//! travel on the wire.

mod memory;
mod tcp;

pub use memory::MemoryTransport;
pub use tcp::TcpTransport;

use async_trait::async_trait;
use shared::message::{BusMessage, EventType};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use uuid::Uuid;

use crate::utils::AppError;

/// Transport trait
///
/// Every transport implementation supports framed message reads/writes and
/// connection teardown.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Read one message from the transport
    async fn read_message(&self) -> Result<BusMessage, AppError>;

    /// Write one message to the transport
    async fn write_message(&self, msg: &BusMessage) -> Result<(), AppError>;

    /// Close the transport connection
    async fn close(&self) -> Result<(), AppError>;

    /// Peer address, when the transport has one
    fn peer_addr(&self) -> Option<String> {
        None
    }
}

// ========== Frame helpers ==========

/// Read a BusMessage frame from an async stream
pub(crate) async fn read_from_stream<R: AsyncReadExt + Unpin>(
    reader: &mut R,
) -> Result<BusMessage, AppError> {
    // Event type (1 byte)
    let mut type_buf = [0u8; 1];
    match reader.read_exact(&mut type_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(AppError::ClientDisconnected);
        }
        Err(e) => {
            return Err(AppError::internal(format!("Read type failed: {}", e)));
        }
    }

    let event_type =
        EventType::try_from(type_buf[0]).map_err(|_| AppError::invalid("Invalid event type"))?;

    // Request ID (16 bytes)
    let mut uuid_buf = [0u8; 16];
    reader
        .read_exact(&mut uuid_buf)
        .await
        .map_err(|e| AppError::internal(format!("Read request id failed: {}", e)))?;
    let request_id = Uuid::from_bytes(uuid_buf);

    // Correlation ID (16 bytes, nil = none)
    let mut correlation_buf = [0u8; 16];
    reader
        .read_exact(&mut correlation_buf)
        .await
        .map_err(|e| AppError::internal(format!("Read correlation id failed: {}", e)))?;
    let correlation_id_raw = Uuid::from_bytes(correlation_buf);
    let correlation_id = if correlation_id_raw.is_nil() {
        None
    } else {
        Some(correlation_id_raw)
    };

    // Payload length (4 bytes LE)
    let mut len_buf = [0u8; 4];
    reader
        .read_exact(&mut len_buf)
        .await
        .map_err(|e| AppError::internal(format!("Read len failed: {}", e)))?;
    let len = u32::from_le_bytes(len_buf) as usize;

    // Payload
    let mut payload = vec![0u8; len];
    reader
        .read_exact(&mut payload)
        .await
        .map_err(|e| AppError::internal(format!("Read payload failed: {}", e)))?;

    Ok(BusMessage {
        request_id,
        event_type,
        source: None,
        correlation_id,
        target: None,
        payload,
    })
}

/// Write a BusMessage frame to an async stream
pub(crate) async fn write_to_stream<W: AsyncWriteExt + Unpin>(
    writer: &mut W,
    msg: &BusMessage,
) -> Result<(), AppError> {
    let mut data = Vec::with_capacity(1 + 16 + 16 + 4 + msg.payload.len());
    data.push(msg.event_type as u8);
    data.extend_from_slice(msg.request_id.as_bytes());

    // Correlation id (16 bytes), nil UUID when None
    let correlation_bytes = msg.correlation_id.unwrap_or(Uuid::nil()).into_bytes();
    data.extend_from_slice(&correlation_bytes);

    data.extend_from_slice(&(msg.payload.len() as u32).to_le_bytes());
    data.extend_from_slice(&msg.payload);

    writer
        .write_all(&data)
        .await
        .map_err(|e| AppError::internal(format!("Write failed: {}", e)))?;
    Ok(())
}
