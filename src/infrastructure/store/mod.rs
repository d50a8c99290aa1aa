//! Room store implementations.
//!
//! - `inmemory`: HashMap-backed store, the default
//! - in the future: a PostgreSQL-backed implementation

pub mod inmemory;

pub use inmemory::InMemoryRoomStore;
