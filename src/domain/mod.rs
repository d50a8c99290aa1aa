//! Domain model: the durable room record and the storage interface.

mod room;
mod store;

pub use room::{DEFAULT_LANGUAGE, RoomRecord};
pub use store::{RoomStore, StoreError};

#[cfg(test)]
pub use store::MockRoomStore;
