//! Session coordinator — per-session request handling.
//!
//! DESIGN
//! ======
//! One `SessionState` per open connection, keyed by session ID in the
//! shared table. Messages within a session arrive in order from the
//! websocket loop, so each handler takes the session's entry, mutates
//! it, and answers; no cross-session coordination exists anywhere.
//!
//! LIFECYCLE
//! =========
//! open → (location | setMode | ping | rooms)* → close. The active-route
//! sub-state flips on `location`: a non-empty `target` whose plan yields
//! ≥2 waypoints installs a route, an absent or empty `target` clears it,
//! and close tears everything down.
//!
//! ERROR HANDLING
//! ==============
//! Every failure becomes an `error` reply; session state is never
//! touched on the error path and the connection stays up.

use tracing::{debug, info};
use uuid::Uuid;

use crate::message::{now_ms, Inbound, LocationResponse, Outbound, RoomInfo};
use crate::nav::shortest_path;
use crate::positioning::orchestrator::{calculate_location, PositioningResult};
use crate::positioning::{Mode, RssiReading};
use crate::services::location_log;
use crate::state::{AppState, LocationLog, SessionState};

// =============================================================================
// LIFECYCLE
// =============================================================================

/// Register a new session and return its ID.
pub async fn open_session(state: &AppState) -> Uuid {
    let session_id = Uuid::new_v4();
    state
        .sessions
        .write()
        .await
        .insert(session_id, SessionState::new());
    info!(%session_id, "session opened");
    session_id
}

/// Tear down a session: route, smoothing state, table entry.
pub async fn close_session(state: &AppState, session_id: Uuid) {
    if state.sessions.write().await.remove(&session_id).is_some() {
        info!(%session_id, "session closed");
    }
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Handle one inbound message and produce the reply.
pub async fn handle_message(state: &AppState, session_id: Uuid, inbound: Inbound) -> Outbound {
    match inbound {
        Inbound::Location { beacons, mode, target } => {
            handle_location(state, session_id, beacons, mode, target).await
        }
        Inbound::SetMode { mode } => handle_set_mode(state, mode),
        Inbound::Ping => handle_ping(state).await,
        Inbound::Rooms => handle_rooms(state),
    }
}

// =============================================================================
// LOCATION
// =============================================================================

async fn handle_location(
    state: &AppState,
    session_id: Uuid,
    beacons: Vec<RssiReading>,
    mode: Option<String>,
    target: Option<String>,
) -> Outbound {
    // An unknown mode string on a location request silently falls back
    // to the process default; only setMode rejects it.
    let mode = mode
        .as_deref()
        .and_then(Mode::parse)
        .unwrap_or_else(|| state.default_mode.load());

    let target = target.filter(|t| !t.is_empty());
    let now = now_ms();

    let mut sessions = state.sessions.write().await;
    let Some(session) = sessions.get_mut(&session_id) else {
        return Outbound::error("session is not registered");
    };

    debug!(%session_id, beacons = beacons.len(), mode = mode.as_str(), "location request");

    let result = match calculate_location(
        &state.registry,
        session,
        &beacons,
        mode,
        target.is_some(),
        now,
    ) {
        Ok(result) => result,
        Err(e) => return Outbound::error(e.to_string()),
    };

    let mut response = LocationResponse::from_result(&result);

    match &target {
        Some(destination) => {
            // The planner starts from the fresh smoothed position, not
            // the route-snapped one, so a stale route cannot anchor its
            // own replacement.
            let path = shortest_path(&state.graph, result.smoothed_location, destination);
            if path.is_empty() {
                response.has_route = Some(false);
                response.route_error = Some(format!("no route to '{destination}'"));
            } else {
                // Plans shorter than two waypoints are returned but never
                // become the active route — there is nothing to snap to.
                session.set_route(path.clone(), now);
                response.has_route = Some(true);
                response.path = Some(path);
            }
        }
        None => session.clear_route(),
    }
    drop(sessions);

    append_log(state, session_id, &result, target, now);

    Outbound::Location(response)
}

fn append_log(
    state: &AppState,
    session_id: Uuid,
    result: &PositioningResult,
    target: Option<String>,
    now_ms: i64,
) {
    location_log::append(
        state,
        LocationLog {
            session_id,
            x: result.location.x,
            y: result.location.y,
            zone_name: result
                .nearest_room
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            target_destination: target,
            timestamp_ms: now_ms,
        },
    );
}

// =============================================================================
// SET MODE
// =============================================================================

fn handle_set_mode(state: &AppState, mode: Option<String>) -> Outbound {
    let Some(raw) = mode else {
        return Outbound::error("mode not specified");
    };

    match Mode::parse(&raw.trim().to_uppercase()) {
        Some(mode) => {
            state.default_mode.store(mode);
            info!(mode = mode.as_str(), "default positioning mode changed");
            Outbound::mode_changed(mode)
        }
        None => Outbound::error(format!(
            "invalid mode: {raw}. valid modes: PROXIMITY, TRILATERATION, HYBRID, WEIGHTED"
        )),
    }
}

// =============================================================================
// PING / ROOMS
// =============================================================================

async fn handle_ping(state: &AppState) -> Outbound {
    Outbound::Pong {
        timestamp: now_ms(),
        connected_users: state.session_count().await,
    }
}

fn handle_rooms(state: &AppState) -> Outbound {
    let rooms = state
        .graph
        .routable_destinations()
        .into_iter()
        .map(|node| RoomInfo {
            id: node.id.clone(),
            name: node.display_name.clone(),
            x: node.x,
            y: node.y,
        })
        .collect();
    Outbound::Rooms { rooms }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
