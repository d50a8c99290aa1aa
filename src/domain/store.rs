//! Storage interface for room records.
//!
//! The domain layer defines the interface it needs; the infrastructure
//! layer provides the concrete implementation (dependency inversion).

use async_trait::async_trait;
use thiserror::Error;

use super::RoomRecord;

/// Errors reported by a room store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The addressed room has no record in the store.
    #[error("room '{0}' not found")]
    RoomNotFound(String),

    /// The storage backend failed.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Durable store for room records.
///
/// The server consults the store to validate joins, read the current code
/// snapshot for `init` messages, and persist `code_update` edits. Concurrent
/// edits are resolved last-write-wins by `set_code`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Create a new room for the given language and return its record.
    async fn create_room(&self, language: &str) -> Result<RoomRecord, StoreError>;

    /// Look up a room by id. `Ok(None)` means the room does not exist.
    async fn get_room(&self, room_id: &str) -> Result<Option<RoomRecord>, StoreError>;

    /// Replace the code buffer of a room.
    ///
    /// Returns `StoreError::RoomNotFound` if the room has no record.
    async fn set_code(&self, room_id: &str, code: &str) -> Result<(), StoreError>;
}
