//! In-memory implementation of the room store.
//!
//! Uses a `HashMap` behind a mutex as the database. Room records are cloned
//! out so callers never hold the lock across an await point.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::common::time::now_millis;
use crate::domain::{RoomRecord, RoomStore, StoreError};

/// HashMap-backed room store.
#[derive(Default)]
pub struct InMemoryRoomStore {
    rooms: Mutex<HashMap<String, RoomRecord>>,
}

impl InMemoryRoomStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomStore for InMemoryRoomStore {
    async fn create_room(&self, language: &str) -> Result<RoomRecord, StoreError> {
        let record = RoomRecord::new(language, now_millis());

        let mut rooms = self.rooms.lock().await;
        rooms.insert(record.id.clone(), record.clone());
        tracing::info!("Room {} created (language: {})", record.id, record.language);

        Ok(record)
    }

    async fn get_room(&self, room_id: &str) -> Result<Option<RoomRecord>, StoreError> {
        let rooms = self.rooms.lock().await;
        Ok(rooms.get(room_id).cloned())
    }

    async fn set_code(&self, room_id: &str, code: &str) -> Result<(), StoreError> {
        let mut rooms = self.rooms.lock().await;
        let record = rooms
            .get_mut(room_id)
            .ok_or_else(|| StoreError::RoomNotFound(room_id.to_string()))?;
        record.code = code.to_string();
        Ok(())
    }
}
