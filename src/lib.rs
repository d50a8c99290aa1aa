//! Real-time collaborative code editing server.
//!
//! Clients join a room over WebSocket and every edit, cursor move, and
//! presence change is relayed to the other clients in the same room.

// layers
pub mod domain;
pub mod infrastructure;
pub mod protocol;
pub mod server;
pub mod suggest;

// shared library
pub mod common;
