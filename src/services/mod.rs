//! Domain services used by the websocket route.
//!
//! ARCHITECTURE
//! ============
//! Service modules own session lifecycle and persistence concerns so the
//! websocket handler can stay focused on transport and message framing.

pub mod location_log;
pub mod session;
