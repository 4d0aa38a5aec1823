use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, Stream, StreamExt};
use tokio::sync::oneshot;
use tracing::{info, warn};
use uuid::Uuid;

use larder_types::events::ClientCommand;

use crate::handler::Gateway;

/// Heartbeat interval: server sends a Ping every 15 seconds.
/// If 2 consecutive Pongs are missed (~30s), the connection is dropped.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Longest slice of a bad frame echoed into the log.
const LOGGED_FRAME_CHARS: usize = 200;

/// Drive one WebSocket connection from open to close.
///
/// Commands are handled one at a time in arrival order; the next frame is
/// not read until the previous command's store calls have finished, and a
/// command in progress is never cancelled by the connection going away.
pub async fn handle_connection(socket: WebSocket, gateway: Gateway) {
    let (mut sender, receiver) = socket.split();
    let (conn_id, mut events) = gateway.connect().await;
    info!("connection {} opened", conn_id);

    let pong_received = Arc::new(AtomicBool::new(true));
    let pong_flag_send = pong_received.clone();

    // Forward queued events -> client, with heartbeat
    let mut send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        heartbeat.tick().await;
        let mut missed_heartbeats: u8 = 0;

        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!("connection {}: could not encode {:?}: {}", conn_id, event, e);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                _ = heartbeat.tick() => {
                    if pong_flag_send.swap(false, Ordering::Acquire) {
                        missed_heartbeats = 0;
                    } else {
                        missed_heartbeats += 1;
                        if missed_heartbeats >= 2 {
                            warn!("connection {}: heartbeat timeout, dropping", conn_id);
                            break;
                        }
                    }
                    if sender.send(Message::Ping(Bytes::new())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Read commands from client
    let (stop_reading, stop) = oneshot::channel();
    let mut recv_task = tokio::spawn(read_commands(
        receiver,
        gateway.clone(),
        conn_id,
        pong_received,
        stop,
    ));

    // Wait for either task to finish. A command already being handled runs
    // to completion before the session is torn down.
    let send_ended = tokio::select! {
        _ = &mut send_task => true,
        _ = &mut recv_task => false,
    };
    if send_ended {
        let _ = stop_reading.send(());
        if let Err(e) = recv_task.await {
            warn!("connection {}: reader ended abnormally: {}", conn_id, e);
        }
    } else {
        send_task.abort();
    }

    gateway.disconnect(conn_id).await;
    info!("connection {} closed", conn_id);
}

/// Read frames and dispatch commands until the client goes away or `stop`
/// fires. `stop` is only checked between frames, never during a dispatch.
async fn read_commands<S>(
    mut receiver: S,
    gateway: Gateway,
    conn_id: Uuid,
    pong_received: Arc<AtomicBool>,
    mut stop: oneshot::Receiver<()>,
) where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    loop {
        let msg = tokio::select! {
            biased;
            _ = &mut stop => break,
            msg = receiver.next() => msg,
        };
        let Some(Ok(msg)) = msg else { break };

        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientCommand>(text.as_str()) {
                Ok(cmd) => gateway.dispatch(conn_id, cmd).await,
                Err(e) => {
                    let raw: String = text.as_str().chars().take(LOGGED_FRAME_CHARS).collect();
                    warn!("connection {}: bad command: {} -- raw: {}", conn_id, e, raw);
                }
            },
            Message::Pong(_) => {
                pong_received.store(true, Ordering::Release);
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
}
