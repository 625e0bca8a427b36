use crate::event::Envelope;
use crate::hub::Subscription;
use crate::subscription::protocol::{ClientMessage, ErrorMessage, EventMessage};
use axum::extract::ws::{Message, WebSocket};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Manages a single room-scoped WebSocket connection
pub struct ConnectionManager {
    id: Uuid,
    subscription: Subscription,
}

impl ConnectionManager {
    pub fn new(subscription: Subscription) -> Self {
        Self {
            id: Uuid::new_v4(),
            subscription,
        }
    }

    /// Handle WebSocket connection lifecycle
    pub async fn handle(mut self, mut socket: WebSocket) {
        info!(connection_id = %self.id, "WebSocket connection established");

        loop {
            tokio::select! {
                // Handle incoming client messages
                msg = socket.recv() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if let Err(e) = self.handle_client_message(&text) {
                                warn!(error = %e, "Invalid client message");
                                let reply = ErrorMessage::new(e.to_string());
                                if let Err(e) = send_json(&mut socket, &reply).await {
                                    error!(error = %e, "Failed to send error message");
                                    break;
                                }
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!(connection_id = %self.id, "WebSocket client disconnected");
                            break;
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if let Err(e) = socket.send(Message::Pong(data)).await {
                                error!(error = %e, "Failed to send pong");
                                break;
                            }
                        }
                        Some(Ok(_)) => {
                            // Ignore binary, pong messages
                        }
                        Some(Err(e)) => {
                            warn!(error = %e, "WebSocket error");
                            break;
                        }
                    }
                }

                // Forward hub events addressed to this connection
                envelope = self.subscription.recv() => {
                    match envelope {
                        Some(envelope) => {
                            if let Err(e) = self.forward(&mut socket, envelope).await {
                                error!(error = %e, "Failed to forward event");
                                break;
                            }
                        }
                        None => break,
                    }
                }
            }
        }

        info!(connection_id = %self.id, "WebSocket connection closed");
    }

    /// Handle client message (roomJoin/roomLeave)
    fn handle_client_message(&mut self, text: &str) -> anyhow::Result<()> {
        let msg: ClientMessage = serde_json::from_str(text)?;

        match msg {
            ClientMessage::RoomJoin { room } => {
                info!(connection_id = %self.id, room = %room, "Client joined room");
                self.subscription.join(room);
            }
            ClientMessage::RoomLeave { room } => {
                info!(connection_id = %self.id, room = %room, "Client left room");
                self.subscription.leave(&room);
            }
        }

        Ok(())
    }

    async fn forward(&self, socket: &mut WebSocket, envelope: Envelope) -> anyhow::Result<()> {
        send_json(socket, &EventMessage::from(envelope)).await
    }
}

async fn send_json<T: serde::Serialize>(socket: &mut WebSocket, msg: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string(msg)?;
    socket.send(Message::Text(json)).await?;
    Ok(())
}
