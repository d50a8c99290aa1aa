//! Shared utilities used across the server.

pub mod logger;
pub mod time;
