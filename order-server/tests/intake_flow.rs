//! End-to-end intake tests: submissions travel through the message bus and
//! come back as correlated replies.

use std::time::Duration;

use rust_decimal::Decimal;
use uuid::Uuid;

use order_server::core::{Config, ServerState};
use order_server::db::DbService;
use order_server::message::{BusMessage, EventType, Transport};
use shared::message::{HandshakePayload, PROTOCOL_VERSION, SubmitReply, SubmitStatus};
use shared::models::{AddressSubmission, ClientSubmission, OrderSubmission, ProductSubmission};

const READ_TIMEOUT: Duration = Duration::from_secs(5);

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

async fn memory_state(intake_tcp_port: u16) -> ServerState {
    let work_dir = tempfile::tempdir().unwrap();
    let config = Config::with_overrides(work_dir.path().to_string_lossy(), 0, intake_tcp_port);
    let pool = DbService::open_in_memory().await.unwrap().pool;
    let state = ServerState::with_pool(&config, pool).await.unwrap();
    state.start_background_tasks();
    state
}

/// Read frames until the reply correlated to `request_id` arrives.
async fn await_reply(transport: &dyn Transport, request_id: Uuid) -> SubmitReply {
    let deadline = tokio::time::Instant::now() + READ_TIMEOUT;
    loop {
        let msg = tokio::time::timeout_at(deadline, transport.read_message())
            .await
            .expect("timed out waiting for reply")
            .expect("transport read failed");

        if msg.event_type == EventType::Response && msg.correlation_id == Some(request_id) {
            return msg.parse_payload().expect("malformed reply payload");
        }
    }
}

#[tokio::test]
async fn submission_round_trip_over_memory_transport() {
    let state = memory_state(0).await;
    let transport = state.bus.client_memory_transport();

    // Accepted
    let request = BusMessage::submit_order(&submission("abc"));
    transport.write_message(&request).await.unwrap();
    let reply = await_reply(&transport, request.request_id).await;
    assert_eq!(reply.outcome, SubmitStatus::Accepted);
    assert_eq!(reply.order_number, Some(1));
    assert_eq!(reply.message, "Successfully registered order 1!");

    // The accepted order is immediately queryable.
    let order = state.query.get_by_order_number(1).await.unwrap().unwrap();
    assert_eq!(order.checksum, "abc");

    // Identical payload: duplicate notice.
    let request = BusMessage::submit_order(&submission("abc"));
    transport.write_message(&request).await.unwrap();
    let reply = await_reply(&transport, request.request_id).await;
    assert_eq!(reply.outcome, SubmitStatus::Duplicate);
    assert_eq!(reply.order_number, None);
    assert_eq!(reply.message, "Duplicated order detected!");
}

#[tokio::test]
async fn rejection_reason_reaches_the_submitter() {
    let state = memory_state(0).await;
    let transport = state.bus.client_memory_transport();

    let mut bad = submission("abc");
    bad.checksum = None;

    let request = BusMessage::submit_order(&bad);
    transport.write_message(&request).await.unwrap();
    let reply = await_reply(&transport, request.request_id).await;
    assert_eq!(reply.outcome, SubmitStatus::Error);
    assert_eq!(
        reply.message,
        "An error occurred on register order: Missing order checksum"
    );

    // Nothing was persisted.
    assert!(state.query.get_by_order_number(1).await.unwrap().is_none());
}

#[tokio::test]
async fn malformed_payload_yields_an_error_reply() {
    let state = memory_state(0).await;
    let transport = state.bus.client_memory_transport();

    let request = BusMessage::new(EventType::SubmitOrder, b"not json".to_vec());
    transport.write_message(&request).await.unwrap();
    let reply = await_reply(&transport, request.request_id).await;
    assert_eq!(reply.outcome, SubmitStatus::Error);
    assert!(
        reply
            .message
            .starts_with("An error occurred on register order: Malformed order payload")
    );
}

#[tokio::test]
async fn submission_round_trip_over_tcp() {
    use order_server::message::TcpTransport;

    // Fixed port; keep it away from anything else the suite binds.
    const PORT: u16 = 18743;

    let state = memory_state(PORT).await;
    let bus = state.bus.clone();
    tokio::spawn(async move {
        bus.start_tcp_server().await.unwrap();
    });

    // Give the listener a moment to bind.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let transport = TcpTransport::connect(&format!("127.0.0.1:{PORT}"))
        .await
        .unwrap();

    // Handshake first; a version match gets no reply and the stream is live.
    let handshake = BusMessage::handshake(&HandshakePayload {
        version: PROTOCOL_VERSION,
        client_name: Some("intake-test".into()),
        client_id: Some(Uuid::new_v4().to_string()),
    });
    transport.write_message(&handshake).await.unwrap();

    let request = BusMessage::submit_order(&submission("tcp-1"));
    transport.write_message(&request).await.unwrap();
    let reply = await_reply(&transport, request.request_id).await;
    assert_eq!(reply.outcome, SubmitStatus::Accepted);
    assert_eq!(reply.order_number, Some(1));

    state.bus.shutdown();
}
