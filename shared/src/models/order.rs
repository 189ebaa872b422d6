//! Order Model
//!
//! Two shapes of the same aggregate:
//!
//! - `*Submission` — what a client sends over the intake channel. Every
//!   field is optional (including entries of the product list, which may be
//!   JSON `null`); the validator decides what is acceptable and with which
//!   reason text.
//! - `Order` / `Client` / `Product` / `Address` — the persisted record. The
//!   server assigns `order_number` and `ordered_at`; anything the submitter
//!   put in those fields is discarded.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==================== Submission (candidate) ====================

/// Inbound order candidate, not yet validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubmission {
    /// Ignored on input; the server assigns the real number.
    pub order_number: Option<i64>,
    pub client: Option<ClientSubmission>,
    /// Entries may be `null` in the wire payload.
    pub products: Option<Vec<Option<ProductSubmission>>>,
    /// Ignored on input; the server stamps acceptance time.
    pub ordered_at: Option<i64>,
    /// Caller-supplied dedup key, opaque to the server.
    pub checksum: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSubmission {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub tax_id: Option<String>,
    pub address: Option<AddressSubmission>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSubmission {
    pub zip_code: Option<String>,
    pub street_name: Option<String>,
    pub street_number: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSubmission {
    pub id: Option<i64>,
    /// GS1 barcode identifier.
    pub gs1: Option<String>,
    pub name: Option<String>,
    pub quantity: Option<i64>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
}

// ==================== Persisted record ====================

/// Accepted, immutable order. `order_number` and `ordered_at` are fixed at
/// acceptance; there is no update or delete anywhere in this domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_number: i64,
    pub client: Client,
    pub products: Vec<Product>,
    /// Acceptance time, epoch milliseconds.
    pub ordered_at: i64,
    pub checksum: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub tax_id: String,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub zip_code: String,
    pub street_name: String,
    pub street_number: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub gs1: String,
    pub name: String,
    pub quantity: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}
