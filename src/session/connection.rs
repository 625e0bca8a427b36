use super::PortraitSession;
use crate::portrait::{PortraitFeed, PortraitLoader};
use axum::extract::ws::{Message, WebSocket};
use serde::Deserialize;
use tokio::time::{sleep_until, Instant};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Client → Server messages on a portrait socket
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionMessage {
    /// The avatar image failed to load
    AvatarError,
    /// Re-run the initial load (page refresh without reconnecting)
    Refresh,
}

/// Drive one portrait page until the socket closes or the hub goes away.
pub async fn run_session(
    mut socket: WebSocket,
    mut session: PortraitSession,
    mut feed: PortraitFeed,
    loader: PortraitLoader,
) {
    let connection_id = Uuid::new_v4();
    let player_id = feed.player_id();
    info!(connection_id = %connection_id, player_id = player_id, "Portrait session started");

    if let Err(e) = send_snapshot(&mut socket, &session).await {
        error!(error = %e, "Failed to send initial snapshot");
        return;
    }

    loop {
        let deadline = session.next_deadline();
        let timer = async move {
            match deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        let changed = tokio::select! {
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match handle_client_message(&mut session, &mut feed, &loader, player_id, &text).await {
                            Ok(changed) => changed,
                            Err(e) => {
                                warn!(error = %e, "Error handling portrait message");
                                false
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(e) = socket.send(Message::Pong(data)).await {
                            error!(error = %e, "Failed to send pong");
                            break;
                        }
                        false
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!(connection_id = %connection_id, "Portrait client disconnected");
                        break;
                    }
                    Some(Ok(_)) => false,
                    Some(Err(e)) => {
                        warn!(error = %e, "Portrait WebSocket error");
                        break;
                    }
                }
            }

            event = feed.next() => {
                match event {
                    Some(event) => session.handle(event, Instant::now()),
                    None => break,
                }
            }

            _ = timer => session.fire_due(Instant::now()),
        };

        if changed {
            if let Err(e) = send_snapshot(&mut socket, &session).await {
                error!(error = %e, "Failed to send snapshot");
                break;
            }
        }
    }

    info!(connection_id = %connection_id, player_id = player_id, "Portrait session closed");
}

async fn handle_client_message(
    session: &mut PortraitSession,
    feed: &mut PortraitFeed,
    loader: &PortraitLoader,
    player_id: i64,
    text: &str,
) -> anyhow::Result<bool> {
    let msg: SessionMessage = serde_json::from_str(text)?;

    match msg {
        SessionMessage::AvatarError => Ok(session.avatar_failed()),
        SessionMessage::Refresh => {
            let props = loader.load(player_id).await?;
            feed.set_name_info_id(props.player_name.info_id);
            Ok(session.reload(props))
        }
    }
}

async fn send_snapshot(socket: &mut WebSocket, session: &PortraitSession) -> anyhow::Result<()> {
    let json = serde_json::to_string(&session.snapshot())?;
    socket.send(Message::Text(json)).await?;
    Ok(())
}
