//! WebSocket message envelopes for the collaboration protocol.
//!
//! Every frame is a JSON object tagged by a `type` field. Inbound frames are
//! decoded once at the boundary into `ClientMessage`; unknown tags decode to
//! `ClientMessage::Unrecognized` and are ignored by the session loop. Cursor
//! fields are relayed verbatim, so they stay untyped JSON values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message received from a client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// The client replaced the shared code buffer.
    CodeUpdate {
        code: String,
        #[serde(default)]
        user_id: Value,
    },
    /// The client moved its cursor.
    CursorPosition {
        #[serde(default)]
        user_id: Value,
        #[serde(default)]
        position: Value,
        #[serde(default)]
        line: Value,
        #[serde(default)]
        column: Value,
    },
    /// Liveness probe; answered with `pong` to the sender only.
    Ping,
    /// Any `type` tag this server does not know.
    #[serde(other)]
    Unrecognized,
}

/// Message sent to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Snapshot sent to a client right after it joins a room.
    Init {
        code: String,
        language: String,
        active_users: usize,
    },
    /// Someone else joined the room.
    UserJoined { active_users: usize },
    /// Someone else edited the code buffer.
    CodeUpdate { code: String, user_id: Value },
    /// Someone else moved their cursor.
    CursorPosition {
        user_id: Value,
        position: Value,
        line: Value,
        column: Value,
    },
    /// Someone else left the room.
    UserLeft { active_users: usize },
    /// Answer to a `ping`.
    Pong,
}

impl ServerMessage {
    /// Encode as a JSON string for the wire.
    pub fn to_json(&self) -> String {
        // Serializing our own enum cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}
