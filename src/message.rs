//! Wire protocol — the messages exchanged over the websocket.
//!
//! ARCHITECTURE
//! ============
//! Every exchange is a self-contained JSON object with a required
//! `type` field. Inbound messages dispatch on it; responses carry it
//! back. Field names follow the mobile client's camelCase convention, so
//! the serde renames live here and nowhere else.
//!
//! DESIGN
//! ======
//! Parse failures are answered with an `error` message and never
//! terminate the session — mobile clients in the field send a remarkable
//! variety of almost-correct JSON.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::Point;
use crate::positioning::orchestrator::PositioningResult;
use crate::positioning::{Mode, RssiReading};

/// Current time as milliseconds since Unix epoch.
#[must_use]
pub fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

// =============================================================================
// INBOUND
// =============================================================================

/// Client → server messages, dispatched on `type`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum Inbound {
    /// A batch of beacon observations, optionally with a mode override
    /// and a navigation target.
    #[serde(rename = "location")]
    Location {
        beacons: Vec<RssiReading>,
        #[serde(default)]
        mode: Option<String>,
        #[serde(default)]
        target: Option<String>,
    },
    /// Change the process-wide default positioning mode.
    #[serde(rename = "setMode")]
    SetMode {
        #[serde(default)]
        mode: Option<String>,
    },
    /// Connection liveness check.
    #[serde(rename = "ping")]
    Ping,
    /// List routable destinations.
    #[serde(rename = "rooms")]
    Rooms,
}

// =============================================================================
// OUTBOUND
// =============================================================================

/// One routable destination, for the client's picker.
#[derive(Debug, Clone, Serialize)]
pub struct RoomInfo {
    pub id: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
}

/// The `location` response body.
#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub status: &'static str,
    pub x: f64,
    pub y: f64,
    #[serde(rename = "xMeter")]
    pub x_meter: f64,
    #[serde(rename = "yMeter")]
    pub y_meter: f64,
    pub mode: Mode,
    pub confidence: f64,
    #[serde(rename = "nearestBeacon")]
    pub nearest_beacon: Option<String>,
    #[serde(rename = "nearestRoom")]
    pub nearest_room: Option<String>,
    #[serde(rename = "estimatedDistance")]
    pub estimated_distance: f64,
    #[serde(rename = "hasRoute", skip_serializing_if = "Option::is_none")]
    pub has_route: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Point>>,
    #[serde(rename = "routeError", skip_serializing_if = "Option::is_none")]
    pub route_error: Option<String>,
}

impl LocationResponse {
    /// Build the routeless response for a positioning result; route
    /// fields are filled in by the session coordinator when a target was
    /// requested.
    #[must_use]
    pub fn from_result(result: &PositioningResult) -> Self {
        Self {
            status: "ok",
            x: result.location.x,
            y: result.location.y,
            x_meter: result.location.x_meters(),
            y_meter: result.location.y_meters(),
            mode: result.mode,
            confidence: result.confidence,
            nearest_beacon: result.nearest_beacon.clone(),
            nearest_room: result.nearest_room.clone(),
            estimated_distance: result.estimated_distance_m,
            has_route: None,
            path: None,
            route_error: None,
        }
    }
}

/// Server → client messages.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum Outbound {
    #[serde(rename = "welcome")]
    Welcome {
        #[serde(rename = "sessionId")]
        session_id: Uuid,
        message: String,
        #[serde(rename = "defaultMode")]
        default_mode: Mode,
    },
    #[serde(rename = "location")]
    Location(LocationResponse),
    #[serde(rename = "modeChanged")]
    ModeChanged {
        status: &'static str,
        mode: Mode,
        message: String,
    },
    #[serde(rename = "pong")]
    Pong {
        timestamp: i64,
        #[serde(rename = "connectedUsers")]
        connected_users: usize,
    },
    #[serde(rename = "rooms")]
    Rooms { rooms: Vec<RoomInfo> },
    #[serde(rename = "error")]
    Error { status: &'static str, message: String },
}

impl Outbound {
    #[must_use]
    pub fn welcome(session_id: Uuid, default_mode: Mode) -> Self {
        Self::Welcome {
            session_id,
            message: "connected to the indoor navigation service".to_string(),
            default_mode,
        }
    }

    #[must_use]
    pub fn mode_changed(mode: Mode) -> Self {
        Self::ModeChanged {
            status: "ok",
            mode,
            message: format!("positioning mode changed: {}", mode.as_str()),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error { status: "error", message: message.into() }
    }
}

#[cfg(test)]
#[path = "message_test.rs"]
mod tests;
