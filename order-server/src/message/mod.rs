//! Intake message bus
//!
//! Carries order submissions from clients to the intake service and exactly
//! one response per submission back to its sender.
//!
//! - [`bus`] — broadcast-channel core and client registry
//! - [`transport`] — pluggable framed transports (TCP, in-process memory)
//! - [`tcp_server`] — accept loop, handshake, per-client forwarding
//! - [`handler`] — bridges `SubmitOrder` frames to [`crate::orders::IntakeService`]

pub mod bus;
pub mod handler;
pub mod tcp_server;
pub mod transport;

// Re-exports
pub use bus::{MessageBus, TransportConfig};
pub use handler::IntakeHandler;
pub use transport::{MemoryTransport, TcpTransport, Transport};

pub use shared::message::{BusMessage, EventType};
