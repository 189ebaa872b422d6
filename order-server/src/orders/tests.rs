//! Intake and query service tests over an in-memory store.

use rust_decimal::Decimal;
use sqlx::SqlitePool;

use shared::models::{
    Address, AddressSubmission, Client, ClientSubmission, Order, OrderSubmission, Product,
    ProductSubmission,
};
use shared::util::DAY_MILLIS;

use super::{IntakeService, OrderRejection, QueryService, SubmitOutcome};
use crate::db::{DbService, repository};
use crate::utils::AppError;

async fn test_pool() -> SqlitePool {
    DbService::open_in_memory().await.unwrap().pool
}

async fn test_services(pool: &SqlitePool) -> (IntakeService, QueryService) {
    (
        IntakeService::seed(pool.clone()).await.unwrap(),
        QueryService::new(pool.clone()),
    )
}

fn submission(checksum: &str) -> OrderSubmission {
    OrderSubmission {
        order_number: None,
        client: Some(ClientSubmission {
            id: Some(1),
            name: Some("Foo Bar".into()),
            tax_id: Some("12345678900".into()),
            address: Some(AddressSubmission {
                zip_code: Some("01310200".into()),
                street_name: Some("Avenida Paulista".into()),
                street_number: Some("1578".into()),
                neighborhood: Some("Bela Vista".into()),
                city: Some("Sao Paulo".into()),
                state: Some("Sao Paulo".into()),
                country: Some("Brazil".into()),
            }),
        }),
        products: Some(vec![Some(ProductSubmission {
            id: Some(1),
            gs1: Some("7908887777776".into()),
            name: Some("Something Product".into()),
            quantity: Some(3),
            price: Some(Decimal::new(109, 1)),
        })]),
        ordered_at: None,
        checksum: Some(checksum.into()),
    }
}

/// A persisted order for pre-seeding the store outside the intake path.
fn stored_order(order_number: i64, client_id: i64, checksum: &str, ordered_at: i64) -> Order {
    Order {
        order_number,
        client: Client {
            id: client_id,
            name: "Foo Bar".into(),
            tax_id: "12345678900".into(),
            address: Address {
                zip_code: "01310200".into(),
                street_name: "Avenida Paulista".into(),
                street_number: "1578".into(),
                neighborhood: "Bela Vista".into(),
                city: "Sao Paulo".into(),
                state: "Sao Paulo".into(),
                country: "Brazil".into(),
            },
        },
        products: vec![Product {
            id: 1,
            gs1: "7908887777776".into(),
            name: "Something Product".into(),
            quantity: 3,
            price: Decimal::new(109, 1),
        }],
        ordered_at,
        checksum: checksum.into(),
    }
}

async fn order_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(pool)
        .await
        .unwrap()
}

// ========================================================================
// Intake
// ========================================================================

#[tokio::test]
async fn accepts_order_and_assigns_first_number() {
    let pool = test_pool().await;
    let (intake, query) = test_services(&pool).await;

    let outcome = intake.submit(submission("abc")).await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Accepted { order_number: 1 });

    // Round-trip: everything persisted, including system-assigned fields.
    let order = query.get_by_order_number(1).await.unwrap().unwrap();
    assert_eq!(order.order_number, 1);
    assert_eq!(order.client.id, 1);
    assert_eq!(order.products[0].price, Decimal::new(109, 1));
    assert_eq!(order.checksum, "abc");
    assert!(order.ordered_at > 0);
}

#[tokio::test]
async fn seeds_allocator_from_persisted_maximum() {
    let pool = test_pool().await;
    repository::order::insert(&pool, &stored_order(42, 9, "chk-42", 1))
        .await
        .unwrap();

    let (intake, _) = test_services(&pool).await;
    assert_eq!(intake.allocator().current(), 42);

    let outcome = intake.submit(submission("abc")).await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Accepted { order_number: 43 });
}

#[tokio::test]
async fn duplicate_checksum_is_an_outcome_not_an_error() {
    let pool = test_pool().await;
    let (intake, _) = test_services(&pool).await;

    let first = intake.submit(submission("abc")).await.unwrap();
    assert_eq!(first, SubmitOutcome::Accepted { order_number: 1 });

    // Identical payload again: duplicate notice, nothing persisted, and the
    // allocator never moved.
    let second = intake.submit(submission("abc")).await.unwrap();
    assert_eq!(second, SubmitOutcome::Duplicate);
    assert_eq!(order_count(&pool).await, 1);
    assert_eq!(intake.allocator().current(), 1);
}

#[tokio::test]
async fn rejected_submission_has_no_side_effects() {
    let pool = test_pool().await;
    let (intake, _) = test_services(&pool).await;

    let mut bad = submission("abc");
    bad.client.as_mut().unwrap().name = None;

    let err = intake.submit(bad).await.unwrap_err();
    assert_eq!(err.to_string(), "Null or empty client name");

    assert_eq!(order_count(&pool).await, 0);
    assert_eq!(intake.allocator().current(), 0);
}

#[tokio::test]
async fn overrides_caller_supplied_number_and_timestamp() {
    let pool = test_pool().await;
    let (intake, query) = test_services(&pool).await;

    let mut sub = submission("abc");
    sub.order_number = Some(9999);
    sub.ordered_at = Some(1);

    let outcome = intake.submit(sub).await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Accepted { order_number: 1 });

    let order = query.get_by_order_number(1).await.unwrap().unwrap();
    assert_ne!(order.ordered_at, 1);
    assert!(query.get_by_order_number(9999).await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submissions_receive_unique_increasing_numbers() {
    const SUBMISSIONS: i64 = 20;

    let pool = test_pool().await;
    let (intake, _) = test_services(&pool).await;

    let handles: Vec<_> = (0..SUBMISSIONS)
        .map(|i| {
            let intake = intake.clone();
            tokio::spawn(async move { intake.submit(submission(&format!("chk-{i}"))).await })
        })
        .collect();

    let mut numbers = Vec::new();
    for handle in handles {
        match handle.await.unwrap().unwrap() {
            SubmitOutcome::Accepted { order_number } => numbers.push(order_number),
            SubmitOutcome::Duplicate => panic!("distinct checksums must not collide"),
        }
    }

    numbers.sort_unstable();
    assert_eq!(numbers, (1..=SUBMISSIONS).collect::<Vec<_>>());
    assert_eq!(order_count(&pool).await, SUBMISSIONS);
}

// ========================================================================
// Queries
// ========================================================================

#[tokio::test]
async fn unknown_lookups_are_absent_not_errors() {
    let pool = test_pool().await;
    let (_, query) = test_services(&pool).await;

    assert!(query.get_by_order_number(999).await.unwrap().is_none());
    assert!(query.list_by_client(999).await.unwrap().is_empty());
}

#[tokio::test]
async fn lists_orders_by_client_id() {
    let pool = test_pool().await;
    repository::order::insert(&pool, &stored_order(1, 10, "chk-1", 100))
        .await
        .unwrap();
    repository::order::insert(&pool, &stored_order(2, 11, "chk-2", 200))
        .await
        .unwrap();
    repository::order::insert(&pool, &stored_order(3, 10, "chk-3", 300))
        .await
        .unwrap();

    let (_, query) = test_services(&pool).await;
    let orders = query.list_by_client(10).await.unwrap();
    assert_eq!(orders.len(), 2);
    assert!(orders.iter().all(|o| o.client.id == 10));
}

#[tokio::test]
async fn range_query_rejects_inverted_bounds() {
    let pool = test_pool().await;
    let (_, query) = test_services(&pool).await;

    let err = query.list_by_range(Some(6), Some(5)).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Rejected(OrderRejection::InvalidRangeFilter(_))
    ));
    assert_eq!(err.to_string(), "Begin date is after end date");
}

#[tokio::test]
async fn range_query_rejects_spans_over_one_day() {
    let pool = test_pool().await;
    let (_, query) = test_services(&pool).await;

    let err = query
        .list_by_range(Some(0), Some(DAY_MILLIS + 1))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Max range exceeded");

    // Exactly one day is allowed.
    assert!(query.list_by_range(Some(0), Some(DAY_MILLIS)).await.is_ok());
}

#[tokio::test]
async fn range_query_bounds_are_inclusive() {
    let pool = test_pool().await;
    for (n, at) in [(1, 100), (2, 200), (3, 300)] {
        repository::order::insert(&pool, &stored_order(n, 10, &format!("chk-{n}"), at))
            .await
            .unwrap();
    }

    let (_, query) = test_services(&pool).await;
    let orders = query.list_by_range(Some(100), Some(200)).await.unwrap();
    let mut numbers: Vec<i64> = orders.iter().map(|o| o.order_number).collect();
    numbers.sort_unstable();
    assert_eq!(numbers, vec![1, 2]);
}

#[tokio::test]
async fn range_defaults_cover_the_last_day() {
    let pool = test_pool().await;
    let (intake, query) = test_services(&pool).await;

    intake.submit(submission("abc")).await.unwrap();

    // Omitted bounds resolve to [now - 1 day, now]; a just-accepted order is
    // inside that window.
    let orders = query.list_by_range(None, None).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].checksum, "abc");

    // And an explicit end keeps the one-day default for begin.
    let ordered_at = orders[0].ordered_at;
    let orders = query.list_by_range(None, Some(ordered_at)).await.unwrap();
    assert_eq!(orders.len(), 1);
}

// ========================================================================
// End-to-end scenario
// ========================================================================

#[tokio::test]
async fn register_then_duplicate_scenario() {
    let pool = test_pool().await;
    repository::order::insert(&pool, &stored_order(42, 9, "seed", 1))
        .await
        .unwrap();

    let (intake, query) = test_services(&pool).await;

    // Well-formed order: one product, checksum "abc". Accepted with the
    // prior maximum plus one.
    let outcome = intake.submit(submission("abc")).await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Accepted { order_number: 43 });

    let order = query.get_by_order_number(43).await.unwrap().unwrap();
    assert_eq!(order.client.name, "Foo Bar");
    assert_eq!(order.products.len(), 1);
    assert_eq!(order.products[0].quantity, 3);

    // Identical resubmission: duplicate, store max unchanged.
    let outcome = intake.submit(submission("abc")).await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Duplicate);
    let highest = repository::order::find_highest_order_number(&pool)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(highest.order_number, 43);
}
