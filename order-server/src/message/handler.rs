//! Intake handler
//!
//! Background task bridging the message bus and the intake service: every
//! `SubmitOrder` frame produces exactly one correlated `Response` frame,
//! unicast back to the submitting client. Nothing is retried and nothing is
//! swallowed — decode failures and internal errors come back as error
//! replies carrying the reason text.

use shared::message::{BusMessage, EventType, SubmitReply};
use shared::models::OrderSubmission;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use super::bus::MessageBus;
use crate::orders::{IntakeService, SubmitOutcome};

pub struct IntakeHandler {
    receiver: broadcast::Receiver<BusMessage>,
    responses: broadcast::Sender<BusMessage>,
    shutdown_token: CancellationToken,
    intake: IntakeService,
}

impl IntakeHandler {
    pub fn new(bus: &MessageBus, intake: IntakeService) -> Self {
        Self {
            receiver: bus.subscribe_to_clients(),
            responses: bus.sender().clone(),
            shutdown_token: bus.shutdown_token().clone(),
            intake,
        }
    }

    /// Process submissions until shutdown.
    ///
    /// Long-running; spawn in the background. Each submission runs in its
    /// own task so a slow insert never blocks the intake stream.
    pub async fn run(mut self) {
        tracing::info!("Intake handler started");

        loop {
            tokio::select! {
                _ = self.shutdown_token.cancelled() => {
                    tracing::info!("Intake handler shutting down");
                    break;
                }

                msg_result = self.receiver.recv() => {
                    match msg_result {
                        Ok(msg) if msg.event_type == EventType::SubmitOrder => {
                            let intake = self.intake.clone();
                            let responses = self.responses.clone();
                            tokio::spawn(async move {
                                handle_submission(intake, responses, msg).await;
                            });
                        }
                        Ok(msg) => {
                            // Handshake frames are consumed by the TCP server;
                            // anything else on the client channel is noise.
                            tracing::debug!(event_type = %msg.event_type, "Ignoring non-submission frame");
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!("Intake handler lagged, skipped {} messages", skipped);
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            tracing::info!("Intake channel closed");
                            break;
                        }
                    }
                }
            }
        }

        tracing::info!("Intake handler stopped");
    }
}

/// Run one submission through the intake service and publish the reply.
async fn handle_submission(
    intake: IntakeService,
    responses: broadcast::Sender<BusMessage>,
    msg: BusMessage,
) {
    let reply = match msg.parse_payload::<OrderSubmission>() {
        Ok(submission) => match intake.submit(submission).await {
            Ok(SubmitOutcome::Accepted { order_number }) => SubmitReply::accepted(order_number),
            Ok(SubmitOutcome::Duplicate) => SubmitReply::duplicate(),
            Err(e) => SubmitReply::error(&e),
        },
        Err(e) => SubmitReply::error(format!("Malformed order payload: {e}")),
    };

    let mut response = BusMessage::response(&reply).with_correlation_id(msg.request_id);
    if let Some(source) = &msg.source {
        response = response.with_target(source);
    }

    if responses.send(response).is_err() {
        tracing::debug!("No subscribers for submission response");
    }
}
