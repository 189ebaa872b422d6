use serde::{Deserialize, Serialize};
use std::fmt;

// ==================== Handshake ====================

/// Handshake payload (client -> server)
///
/// Carries the client's protocol version so the server can reject
/// incompatible clients before any order traffic flows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandshakePayload {
    /// Protocol version
    pub version: u16,
    /// Client name/identifier
    pub client_name: Option<String>,
    /// Client unique id (UUID)
    pub client_id: Option<String>,
}

// ==================== Submission reply ====================

/// Terminal outcome of one order submission.
///
/// `Duplicate` is a normal negative result, distinct from both acceptance
/// and the error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitStatus {
    Accepted,
    Duplicate,
    Error,
}

impl fmt::Display for SubmitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => write!(f, "accepted"),
            Self::Duplicate => write!(f, "duplicate"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Submission reply payload (server -> client)
///
/// Exactly one reply per submission, correlated to the request frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitReply {
    pub outcome: SubmitStatus,
    /// Assigned number, present only when accepted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_number: Option<i64>,
    /// Human-readable outcome text; error reasons pass through unaltered
    pub message: String,
}

// ==================== Convenience Constructors ====================

impl SubmitReply {
    pub fn accepted(order_number: i64) -> Self {
        Self {
            outcome: SubmitStatus::Accepted,
            order_number: Some(order_number),
            message: format!("Successfully registered order {order_number}!"),
        }
    }

    pub fn duplicate() -> Self {
        Self {
            outcome: SubmitStatus::Duplicate,
            order_number: None,
            message: "Duplicated order detected!".to_string(),
        }
    }

    pub fn error(reason: impl fmt::Display) -> Self {
        Self {
            outcome: SubmitStatus::Error,
            order_number: None,
            message: format!("An error occurred on register order: {reason}"),
        }
    }
}
