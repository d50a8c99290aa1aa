//! WebSocket connection handler.
//!
//! Wires one upgraded socket to a [`Session`]: a dedicated writer task owns
//! the sink and drains the connection's outbound queue (serializing all
//! sends to this client), while the read loop feeds inbound text frames to
//! the session. Cleanup runs on every exit path.

use std::sync::Arc;

use axum::{
    extract::{
        Path, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use super::registry::Connection;
use super::session::{Session, SessionError, SessionFlow};
use super::state::AppState;

/// Close code sent when the requested room has no record.
const CLOSE_ROOM_NOT_FOUND: u16 = 4004;

/// Close code sent when the storage layer fails during the room lookup.
const CLOSE_INTERNAL_ERROR: u16 = 1011;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, room_id))
}

/// Spawns the writer task: drains the connection's outbound queue into the
/// WebSocket sink until either side goes away.
fn writer_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sink: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sink.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, room_id: String) {
    let (tx, rx) = mpsc::unbounded_channel();
    let conn = Connection::new(tx);

    // Validate the room and join before any frame is exchanged
    let session = match Session::join(
        state.registry.clone(),
        state.engine.clone(),
        state.store.clone(),
        room_id.clone(),
        conn,
    )
    .await
    {
        Ok(session) => session,
        Err(SessionError::RoomNotFound(_)) => {
            tracing::warn!("Rejecting connection to unknown room {}", room_id);
            let _ = socket
                .send(Message::Close(Some(CloseFrame {
                    code: CLOSE_ROOM_NOT_FOUND,
                    reason: "Room not found".into(),
                })))
                .await;
            return;
        }
        Err(SessionError::Store(e)) => {
            tracing::error!("Storage error while joining room {}: {}", room_id, e);
            let _ = socket
                .send(Message::Close(Some(CloseFrame {
                    code: CLOSE_INTERNAL_ERROR,
                    reason: "Internal error".into(),
                })))
                .await;
            return;
        }
    };

    let (sink, mut stream) = socket.split();
    let mut write_task = writer_loop(rx, sink);

    loop {
        tokio::select! {
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        if session.handle_text(&text).await == SessionFlow::Terminate {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("Client requested close in room {}", room_id);
                        break;
                    }
                    // Transport-level ping/pong is answered by axum itself
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error in room {}: {}", room_id, e);
                        break;
                    }
                    None => break,
                }
            }
            // Writer gone means the client stopped reading; tear down
            _ = &mut write_task => break,
        }
    }

    write_task.abort();
    session.close().await;
}
