//! WebSocket handler — the session transport.
//!
//! DESIGN
//! ======
//! On upgrade, a session is registered and greeted with `welcome`. The
//! loop then answers each text message in arrival order: parse →
//! session coordinator → one reply. All business logic lives in the
//! coordinator; this module only moves frames and guards the lifecycle.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → register session → send `welcome`
//! 2. Text message → parse + handle → reply (errors included)
//! 3. Close or transport failure → deregister session
//!
//! A malformed or failing message never terminates the session; the
//! client gets an `error` reply and the loop continues.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use tracing::{info, warn};
use uuid::Uuid;

use crate::message::{Inbound, Outbound};
use crate::services;
use crate::state::AppState;

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let session_id = services::session::open_session(&state).await;

    let welcome = Outbound::welcome(session_id, state.default_mode.load());
    if send_message(&mut socket, session_id, &welcome).await.is_err() {
        services::session::close_session(&state, session_id).await;
        return;
    }

    info!(%session_id, "ws: client connected");

    loop {
        let Some(msg) = socket.recv().await else { break };
        let Ok(msg) = msg else { break };

        match msg {
            Message::Text(text) => {
                let reply = process_inbound_text(&state, session_id, &text).await;
                if send_message(&mut socket, session_id, &reply).await.is_err() {
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    services::session::close_session(&state, session_id).await;
    info!(%session_id, "ws: client disconnected");
}

/// Parse and handle one inbound text message, producing the reply.
///
/// Split out from the socket loop so tests can exercise the full
/// dispatch path without a websocket.
pub(crate) async fn process_inbound_text(state: &AppState, session_id: Uuid, text: &str) -> Outbound {
    let inbound: Inbound = match serde_json::from_str(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!(%session_id, error = %e, "ws: invalid inbound message");
            return Outbound::error(format!("invalid request: {e}"));
        }
    };

    services::session::handle_message(state, session_id, inbound).await
}

async fn send_message(socket: &mut WebSocket, session_id: Uuid, message: &Outbound) -> Result<(), ()> {
    let json = match serde_json::to_string(message) {
        Ok(j) => j,
        Err(e) => {
            warn!(%session_id, error = %e, "ws: failed to serialize reply");
            return Err(());
        }
    };

    if let Outbound::Error { message, .. } = message {
        warn!(%session_id, message = %message, "ws: send error reply");
    }

    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
