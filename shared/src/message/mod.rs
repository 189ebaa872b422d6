//! Intake channel message types
//!
//! These types are shared between order-server and clients, used for both
//! in-process (memory) and network (TCP) communication. A request frame
//! always produces exactly one response frame, correlated via
//! `correlation_id`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use uuid::Uuid;

pub mod payload;
pub use payload::*;

/// Protocol version
pub const PROTOCOL_VERSION: u16 = 1;

/// Intake channel event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// Connection handshake
    Handshake = 0,
    /// Order submission (client -> server)
    SubmitOrder = 1,
    /// Request response (server -> client)
    Response = 2,
}

impl TryFrom<u8> for EventType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EventType::Handshake),
            1 => Ok(EventType::SubmitOrder),
            2 => Ok(EventType::Response),
            _ => Err(()),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Handshake => write!(f, "handshake"),
            EventType::SubmitOrder => write!(f, "submit_order"),
            EventType::Response => write!(f, "response"),
        }
    }
}

/// Channel message envelope
///
/// `source` and `target` never travel on the wire; the server injects
/// `source` when a frame arrives and uses `target` for unicast filtering
/// when fanning responses back out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusMessage {
    pub request_id: Uuid,
    pub event_type: EventType,
    pub source: Option<String>,
    pub correlation_id: Option<Uuid>,
    pub target: Option<String>,
    pub payload: Vec<u8>,
}

impl BusMessage {
    pub fn new(event_type: EventType, payload: Vec<u8>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            event_type,
            source: None,
            correlation_id: None,
            target: None,
            payload,
        }
    }

    /// Set the target client (unicast)
    pub fn with_target(mut self, target: &str) -> Self {
        self.target = Some(target.to_string());
        self
    }

    /// Set the correlation id (ties a response to its request)
    pub fn with_correlation_id(mut self, id: Uuid) -> Self {
        self.correlation_id = Some(id);
        self
    }

    /// Create a handshake message
    pub fn handshake(payload: &HandshakePayload) -> Self {
        Self::new(
            EventType::Handshake,
            serde_json::to_vec(payload).expect("Failed to serialize handshake payload"),
        )
    }

    /// Create an order submission message
    pub fn submit_order(payload: &crate::models::OrderSubmission) -> Self {
        Self::new(
            EventType::SubmitOrder,
            serde_json::to_vec(payload).expect("Failed to serialize order submission"),
        )
    }

    /// Create a response message
    pub fn response(payload: &SubmitReply) -> Self {
        Self::new(
            EventType::Response,
            serde_json::to_vec(payload).expect("Failed to serialize response payload"),
        )
    }

    /// Parse the payload as the given type
    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}
