//! Durable room record.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Language assigned to a room when the creator does not pick one.
pub const DEFAULT_LANGUAGE: &str = "python";

/// Persisted state of a collaborative coding room.
///
/// This is what the storage layer holds; live connection membership is
/// tracked separately by the server's `RoomRegistry`. The `active_users`
/// field is informational and may diverge from the live connection count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomRecord {
    pub id: String,
    pub code: String,
    pub language: String,
    /// Unix timestamp of creation (milliseconds).
    pub created_at: i64,
    pub active_users: u32,
}

impl RoomRecord {
    /// Create a fresh room with a generated id and a starter code snippet.
    pub fn new(language: &str, created_at: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            code: format!("# Start coding in {}...\n", language),
            language: language.to_string(),
            created_at,
            active_users: 0,
        }
    }
}
