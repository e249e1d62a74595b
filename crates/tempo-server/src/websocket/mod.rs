//! WebSocket session lifecycle and inbound client event handling.

pub mod events;
pub mod session;
