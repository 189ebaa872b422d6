//! Submission validation
//!
//! An ordered sequence of predicate checks over a raw [`OrderSubmission`],
//! short-circuiting on the first failure. On success the candidate is parsed
//! into a [`ValidOrder`] so the rest of the pipeline never touches optional
//! fields again.
//!
//! Rules run in a fixed precedence: checksum, client, client id, client
//! name, client tax id, address, the seven address fields, product list,
//! then every product in sequence (position is 1-based in reason texts).
//! Blank means empty or whitespace-only. All products are validated,
//! including the last one.

use rust_decimal::Decimal;
use shared::models::{Address, Client, OrderSubmission, Product};

use super::OrderRejection;

/// Validated submission: required fields only, ready for number assignment
/// and persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidOrder {
    pub client: Client,
    pub products: Vec<Product>,
    pub checksum: String,
}

/// Validate a candidate order, returning the first failing rule's rejection.
///
/// Pure: no side effects, no repository access. The dedup lookup (rule 10 of
/// the intake contract) lives in [`super::IntakeService::submit`].
pub fn validate(submission: &OrderSubmission) -> Result<ValidOrder, OrderRejection> {
    let checksum = required_text(submission.checksum.as_deref())
        .ok_or_else(|| OrderRejection::InvalidOrder("Missing order checksum".into()))?;

    let client = submission
        .client
        .as_ref()
        .ok_or_else(|| OrderRejection::InvalidClient("Missing client".into()))?;

    let client_id = match client.id {
        Some(id) if id > 0 => id,
        _ => {
            return Err(OrderRejection::InvalidClient(
                "Missing or invalid client id".into(),
            ));
        }
    };
    let client_name = required_text(client.name.as_deref())
        .ok_or_else(|| OrderRejection::InvalidClient("Null or empty client name".into()))?;
    let tax_id = required_text(client.tax_id.as_deref())
        .ok_or_else(|| OrderRejection::InvalidClient("Null or empty client tax id".into()))?;

    let address = client
        .address
        .as_ref()
        .ok_or_else(|| OrderRejection::InvalidClientAddress("Missing client address".into()))?;

    // Address fields, in fixed order. The reason text names the field.
    let address = Address {
        zip_code: address_field(address.zip_code.as_deref(), "zip code")?,
        street_name: address_field(address.street_name.as_deref(), "street name")?,
        street_number: address_field(address.street_number.as_deref(), "street number")?,
        neighborhood: address_field(address.neighborhood.as_deref(), "neighborhood")?,
        city: address_field(address.city.as_deref(), "city")?,
        state: address_field(address.state.as_deref(), "state")?,
        country: address_field(address.country.as_deref(), "country")?,
    };

    let products = match submission.products.as_ref() {
        Some(list) if !list.is_empty() => list,
        _ => {
            return Err(OrderRejection::InvalidProduct(
                "Products list is null or empty".into(),
            ));
        }
    };

    let mut validated = Vec::with_capacity(products.len());
    for (index, slot) in products.iter().enumerate() {
        let position = index + 1;

        let product = slot
            .as_ref()
            .ok_or_else(|| OrderRejection::InvalidProduct(format!("Product {position} is null")))?;

        let id = match product.id {
            Some(id) if id > 0 => id,
            _ => {
                return Err(OrderRejection::InvalidProduct(format!(
                    "Product {position} missing id"
                )));
            }
        };
        let gs1 = required_text(product.gs1.as_deref()).ok_or_else(|| {
            OrderRejection::InvalidProduct(format!("Product {position} missing GS1 code"))
        })?;
        let name = required_text(product.name.as_deref()).ok_or_else(|| {
            OrderRejection::InvalidProduct(format!("Product {position} missing name"))
        })?;
        let quantity = match product.quantity {
            Some(quantity) if quantity > 0 => quantity,
            _ => {
                return Err(OrderRejection::InvalidProduct(format!(
                    "Product {position} missing or invalid quantity"
                )));
            }
        };
        let price = match product.price {
            Some(price) if price > Decimal::ZERO => price,
            _ => {
                return Err(OrderRejection::InvalidProduct(format!(
                    "Product {position} missing or invalid price"
                )));
            }
        };

        validated.push(Product {
            id,
            gs1,
            name,
            quantity,
            price,
        });
    }

    Ok(ValidOrder {
        client: Client {
            id: client_id,
            name: client_name,
            tax_id,
            address,
        },
        products: validated,
        checksum,
    })
}

/// A present, non-blank string. Surrounding whitespace is kept as-is; only
/// the blank check trims.
fn required_text(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

fn address_field(value: Option<&str>, field: &str) -> Result<String, OrderRejection> {
    required_text(value).ok_or_else(|| {
        OrderRejection::InvalidClientAddress(format!("Missing client address {field}"))
    })
}
