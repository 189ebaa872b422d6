//! TCP server implementation
//!
//! Accepts intake connections and handles, per client:
//! - protocol handshake
//! - forwarding inbound frames to the bus (tagged with the client id)
//! - fanning server responses back out (unicast filtering on `target`)

use std::net::SocketAddr;
use std::sync::Arc;

use dashmap::DashMap;
use shared::message::{BusMessage, EventType, HandshakePayload, PROTOCOL_VERSION, SubmitReply};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::bus::MessageBus;
use super::transport::{TcpTransport, Transport};
use crate::utils::AppError;

impl MessageBus {
    /// Start the TCP intake server.
    ///
    /// Accepts connections until the bus shutdown token fires. Each
    /// connection runs in its own task.
    pub async fn start_tcp_server(&self) -> Result<(), AppError> {
        let listener = TcpListener::bind(&self.config.tcp_listen_addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind: {}", e)))?;

        tracing::info!(
            "Intake TCP server listening on {}",
            self.config.tcp_listen_addr
        );

        loop {
            tokio::select! {
                _ = self.shutdown_token().cancelled() => {
                    tracing::info!("Intake TCP server shutting down");
                    break;
                }

                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            tracing::debug!("Client connected: {}", addr);
                            self.spawn_client_handler(stream, addr);
                        }
                        Err(e) => {
                            tracing::error!("Failed to accept connection: {}", e);
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Spawn a task to drive one client connection
    fn spawn_client_handler(&self, stream: TcpStream, addr: SocketAddr) {
        let server_tx = self.sender().clone();
        let client_tx = self.sender_to_server().clone();
        let shutdown_token = self.shutdown_token().clone();
        let clients = self.clients.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_client_connection(
                stream,
                addr,
                server_tx,
                client_tx,
                shutdown_token,
                clients,
            )
            .await
            {
                tracing::debug!("Client {} handler finished: {}", addr, e);
            }
        });
    }
}

/// Handle a single client connection
async fn handle_client_connection(
    stream: TcpStream,
    addr: SocketAddr,
    server_tx: broadcast::Sender<BusMessage>,
    client_tx: broadcast::Sender<BusMessage>,
    shutdown_token: CancellationToken,
    clients: Arc<DashMap<String, Arc<dyn Transport>>>,
) -> Result<(), AppError> {
    let transport: Arc<dyn Transport> = Arc::new(TcpTransport::from_stream(stream));

    // Protocol handshake
    let client_id = perform_handshake(&transport, addr).await?;

    // Register client
    clients.insert(client_id.clone(), transport.clone());
    tracing::debug!("Client registered: {}", client_id);

    // Shared disconnect token: the read loop cancels it so the forwarder
    // stops too.
    let disconnect_token = CancellationToken::new();

    let forward_handle = spawn_server_to_client_forwarder(
        transport.clone(),
        server_tx.subscribe(),
        shutdown_token.clone(),
        client_id.clone(),
        disconnect_token.clone(),
    );

    read_client_messages(
        &transport,
        &client_tx,
        &shutdown_token,
        &client_id,
        addr,
        disconnect_token,
    )
    .await;

    // Cleanup
    drop(forward_handle);
    let _ = transport.close().await;
    clients.remove(&client_id);
    tracing::debug!(client_id = %client_id, "Client removed from registry");

    Ok(())
}

/// Perform the protocol handshake with a client
async fn perform_handshake(
    transport: &Arc<dyn Transport>,
    addr: SocketAddr,
) -> Result<String, AppError> {
    tracing::debug!("Waiting for handshake from {}", addr);

    let msg = transport.read_message().await.map_err(|e| {
        tracing::warn!("Client {} handshake error: {}", addr, e);
        e
    })?;

    if msg.event_type != EventType::Handshake {
        tracing::warn!(
            "Client {} failed to handshake: expected Handshake, got {}",
            addr,
            msg.event_type
        );
        return Err(AppError::invalid("Expected Handshake message"));
    }

    let payload: HandshakePayload = msg.parse_payload().map_err(|e| {
        tracing::warn!("Client {} sent invalid handshake payload: {}", addr, e);
        AppError::invalid(format!("Invalid handshake payload: {}", e))
    })?;

    // Version check
    if payload.version != PROTOCOL_VERSION {
        tracing::warn!(
            "Client {} protocol version mismatch: expected {}, got {}",
            addr,
            PROTOCOL_VERSION,
            payload.version
        );

        send_handshake_error(
            transport,
            &msg,
            &format!(
                "Protocol version mismatch: server={}, client={}. Please update your client.",
                PROTOCOL_VERSION, payload.version
            ),
        )
        .await;

        return Err(AppError::invalid("Protocol version mismatch"));
    }

    let client_id = payload
        .client_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    tracing::debug!(
        "Client {} handshake success (v{}, client: {:?}, id: {})",
        addr,
        payload.version,
        payload.client_name,
        client_id
    );

    Ok(client_id)
}

/// Delay before closing the connection after a handshake error, so the
/// client gets to read the reply.
const HANDSHAKE_ERROR_DELAY_MS: u64 = 100;

async fn send_handshake_error(transport: &Arc<dyn Transport>, msg: &BusMessage, message: &str) {
    let response =
        BusMessage::response(&SubmitReply::error(message)).with_correlation_id(msg.request_id);

    if let Err(e) = transport.write_message(&response).await {
        tracing::error!("Failed to send handshake error: {}", e);
    }

    tokio::time::sleep(tokio::time::Duration::from_millis(HANDSHAKE_ERROR_DELAY_MS)).await;
}

/// Forward server broadcasts to one client
fn spawn_server_to_client_forwarder(
    transport: Arc<dyn Transport>,
    mut rx: broadcast::Receiver<BusMessage>,
    shutdown_token: CancellationToken,
    client_id: String,
    disconnect_token: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown_token.cancelled() => {
                    tracing::debug!("Client {} forwarder shutting down", client_id);
                    break;
                }
                _ = disconnect_token.cancelled() => {
                    tracing::debug!(client_id = %client_id, "Client disconnected, forwarder stopping");
                    break;
                }
                msg_result = rx.recv() => {
                    match msg_result {
                        Ok(msg) => {
                            // Unicast filtering: only send if the target matches or is unset
                            if msg.target.as_ref().is_some_and(|target| target != &client_id) {
                                continue;
                            }

                            if let Err(e) = transport.write_message(&msg).await {
                                tracing::debug!(client_id = %client_id, "Client write failed: {}", e);
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            tracing::warn!(
                                client_id = %client_id,
                                dropped_messages = n,
                                "Client response stream lagged"
                            );
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            tracing::debug!(client_id = %client_id, "Broadcast channel closed");
                            break;
                        }
                    }
                }
            }
        }

        tracing::debug!(client_id = %client_id, "Client forwarder stopped");
    })
}

/// Read frames from one client and publish them to the server side
async fn read_client_messages(
    transport: &Arc<dyn Transport>,
    client_tx: &broadcast::Sender<BusMessage>,
    shutdown_token: &CancellationToken,
    client_id: &str,
    addr: SocketAddr,
    disconnect_token: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown_token.cancelled() => {
                break;
            }

            read_result = transport.read_message() => {
                match read_result {
                    Ok(mut msg) => {
                        // Inject the client id for response routing
                        msg.source = Some(client_id.to_string());

                        if let Err(e) = client_tx.send(msg) {
                            tracing::warn!("Failed to publish client message: {}", e);
                        }
                    }
                    Err(AppError::ClientDisconnected) => {
                        tracing::debug!(client_id = %client_id, "Client {} disconnected", addr);
                        disconnect_token.cancel();
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(client_id = %client_id, "Client {} read error: {}", addr, e);
                        disconnect_token.cancel();
                        break;
                    }
                }
            }
        }
    }
}
