//! Live connection registry: which connections belong to which room.
//!
//! This is the only place room membership is mutated. All mutations and
//! reads go through one mutex over the whole map; room counts are small
//! enough that per-room locking would buy nothing. Membership here is the
//! source of truth for "is this client still receiving broadcasts",
//! independent of whatever the transport layer believes.

use std::collections::HashMap;

use tokio::sync::{Mutex, mpsc};
use uuid::Uuid;

/// Identity of one live connection. Unique for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Handle to one client's outbound message channel.
///
/// The sender feeds a dedicated writer task that owns the WebSocket sink,
/// so sends to the same client are serialized regardless of which session
/// triggered them. The handle is cheap to clone; identity is carried by the
/// `ConnectionId`, never by the channel.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    sender: mpsc::UnboundedSender<String>,
}

impl Connection {
    /// Wrap an outbound channel in a connection handle with a fresh id.
    pub fn new(sender: mpsc::UnboundedSender<String>) -> Self {
        Self {
            id: ConnectionId::generate(),
            sender,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue one payload for this client's writer task.
    ///
    /// Fails when the writer task is gone, which the caller must treat as
    /// the connection being dead.
    pub fn send(&self, payload: String) -> Result<(), mpsc::error::SendError<String>> {
        self.sender.send(payload)
    }
}

/// Map of room id to the connections currently joined to it.
///
/// A room id is present as a key iff at least one connection is joined;
/// the entry is deleted the moment the last connection leaves.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: Mutex<HashMap<String, HashMap<ConnectionId, Connection>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection under a room, creating the room entry lazily.
    ///
    /// Callers join each connection exactly once.
    pub async fn join(&self, room_id: &str, conn: Connection) {
        let mut rooms = self.rooms.lock().await;
        let members = rooms.entry(room_id.to_string()).or_default();
        members.insert(conn.id(), conn);
        tracing::info!(
            "Client connected to room {}. Total connections: {}",
            room_id,
            members.len()
        );
    }

    /// Remove a connection from a room.
    ///
    /// A no-op when the room or the connection is unknown. Deletes the room
    /// entry when the membership becomes empty.
    pub async fn leave(&self, room_id: &str, conn_id: ConnectionId) {
        let mut rooms = self.rooms.lock().await;
        let Some(members) = rooms.get_mut(room_id) else {
            return;
        };
        if members.remove(&conn_id).is_some() {
            tracing::info!(
                "Client disconnected from room {}. Remaining connections: {}",
                room_id,
                members.len()
            );
        }
        if members.is_empty() {
            rooms.remove(room_id);
            tracing::info!("Room {} removed (no active connections)", room_id);
        }
    }

    /// Current live-connection count for a room; 0 when the room is unknown.
    pub async fn count(&self, room_id: &str) -> usize {
        let rooms = self.rooms.lock().await;
        rooms.get(room_id).map_or(0, HashMap::len)
    }

    /// Number of rooms with at least one live connection.
    pub async fn room_count(&self) -> usize {
        let rooms = self.rooms.lock().await;
        rooms.len()
    }

    /// Point-in-time copy of a room's membership.
    ///
    /// The copy is taken under the lock and iterated after release, so slow
    /// sends never hold up concurrent joins and leaves.
    pub async fn snapshot(&self, room_id: &str) -> Vec<Connection> {
        let rooms = self.rooms.lock().await;
        rooms
            .get(room_id)
            .map(|members| members.values().cloned().collect())
            .unwrap_or_default()
    }
}
