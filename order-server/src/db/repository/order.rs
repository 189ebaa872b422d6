//! Order Repository
//!
//! Persistence for accepted orders. Insert-only by design: orders never
//! change once written. Nested client/products documents are stored as JSON
//! text columns; the fields the queries filter on (`client_id`,
//! `ordered_at`, `checksum`) are plain indexed columns.

use sqlx::SqlitePool;

use shared::models::Order;

use super::{RepoError, RepoResult};

const ORDER_SELECT: &str =
    "SELECT order_number, client, products, ordered_at, checksum FROM orders";

/// Raw row shape; JSON columns are decoded into the shared model.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    order_number: i64,
    client: String,
    products: String,
    ordered_at: i64,
    checksum: String,
}

impl OrderRow {
    fn into_order(self) -> RepoResult<Order> {
        Ok(Order {
            order_number: self.order_number,
            client: serde_json::from_str(&self.client)?,
            products: serde_json::from_str(&self.products)?,
            ordered_at: self.ordered_at,
            checksum: self.checksum,
        })
    }
}

fn rows_into_orders(rows: Vec<OrderRow>) -> RepoResult<Vec<Order>> {
    rows.into_iter().map(OrderRow::into_order).collect()
}

/// Insert one accepted order.
///
/// A UNIQUE violation (checksum already stored, or an order number collision
/// from a second instance) surfaces as [`RepoError::Duplicate`].
pub async fn insert(pool: &SqlitePool, order: &Order) -> RepoResult<()> {
    let client = serde_json::to_string(&order.client)?;
    let products = serde_json::to_string(&order.products)?;

    sqlx::query(
        "INSERT INTO orders (order_number, client_id, client, products, ordered_at, checksum) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(order.order_number)
    .bind(order.client.id)
    .bind(client)
    .bind(products)
    .bind(order.ordered_at)
    .bind(&order.checksum)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn find_by_order_number(
    pool: &SqlitePool,
    order_number: i64,
) -> RepoResult<Option<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE order_number = ?1");
    let row = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(order_number)
        .fetch_optional(pool)
        .await?;
    row.map(OrderRow::into_order).transpose()
}

pub async fn find_by_checksum(pool: &SqlitePool, checksum: &str) -> RepoResult<Option<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE checksum = ?1");
    let row = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(checksum)
        .fetch_optional(pool)
        .await?;
    row.map(OrderRow::into_order).transpose()
}

/// The order holding the highest assigned number, used to seed the sequence
/// allocator at startup.
pub async fn find_highest_order_number(pool: &SqlitePool) -> RepoResult<Option<Order>> {
    let sql = format!("{ORDER_SELECT} ORDER BY order_number DESC LIMIT 1");
    let row = sqlx::query_as::<_, OrderRow>(&sql)
        .fetch_optional(pool)
        .await?;
    row.map(OrderRow::into_order).transpose()
}

pub async fn list_by_client_id(pool: &SqlitePool, client_id: i64) -> RepoResult<Vec<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE client_id = ?1");
    let rows = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(client_id)
        .fetch_all(pool)
        .await?;
    rows_into_orders(rows)
}

/// Orders with `ordered_at` between `begin` and `end`, both inclusive.
pub async fn list_by_range(pool: &SqlitePool, begin: i64, end: i64) -> RepoResult<Vec<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE ordered_at BETWEEN ?1 AND ?2");
    let rows = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(begin)
        .bind(end)
        .fetch_all(pool)
        .await?;
    rows_into_orders(rows)
}
