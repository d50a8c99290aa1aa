//! Room fan-out on top of the connection registry.
//!
//! A failed send is treated as an implicit disconnect: the target is removed
//! from the room right away instead of waiting for the transport layer to
//! notice. This keeps membership self-healing when a client vanishes without
//! a close frame.

use std::sync::Arc;

use crate::protocol::ServerMessage;

use super::registry::{Connection, ConnectionId, RoomRegistry};

/// Delivers messages to single connections and to whole rooms.
#[derive(Clone)]
pub struct BroadcastEngine {
    registry: Arc<RoomRegistry>,
}

impl BroadcastEngine {
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self { registry }
    }

    /// Attempt one send to one connection.
    ///
    /// Returns `false` when the connection's writer task is gone. The
    /// failure is reported, never propagated as fatal.
    pub fn send_to(&self, conn: &Connection, message: &ServerMessage) -> bool {
        conn.send(message.to_json()).is_ok()
    }

    /// Send a message to every connection currently in the room, except the
    /// excluded one (typically the sender).
    ///
    /// Each recipient gets at most one attempt; recipients whose send fails
    /// are removed from the room as a side effect. Delivery to the other
    /// recipients is unaffected.
    pub async fn broadcast_to_room(
        &self,
        room_id: &str,
        message: &ServerMessage,
        exclude: Option<ConnectionId>,
    ) {
        let payload = message.to_json();

        // Copy the membership under lock, send after release
        let members = self.registry.snapshot(room_id).await;

        let mut disconnected: Vec<ConnectionId> = Vec::new();
        for conn in &members {
            if Some(conn.id()) == exclude {
                continue;
            }
            if conn.send(payload.clone()).is_err() {
                tracing::warn!("Error sending message to client in room {}", room_id);
                disconnected.push(conn.id());
            }
        }

        // Clean up clients whose writer task is gone
        for conn_id in disconnected {
            self.registry.leave(room_id, conn_id).await;
        }
    }
}
