//! WebSocket collaboration server implementation.

mod broadcast;
mod handler;
mod http;
mod registry;
mod runner;
mod session;
mod signal;
mod state;

pub use broadcast::BroadcastEngine;
pub use registry::{Connection, ConnectionId, RoomRegistry};
pub use runner::{router, run_server};
pub use session::{Session, SessionError, SessionFlow};
pub use state::AppState;
