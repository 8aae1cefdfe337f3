//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! The map registry and route graph are immutable after startup and
//! shared behind `Arc`s. The session table maps session IDs to live
//! `SessionState`; each entry is created on connect, mutated only by the
//! owning connection's task, and removed on disconnect. The default
//! positioning mode is process-wide configuration behind an atomic.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::geometry::Point;
use crate::map::MapRegistry;
use crate::nav::RouteGraph;
use crate::positioning::Mode;

/// Jitter buffer depth for non-navigation smoothing.
pub const JITTER_BUFFER_SIZE: usize = 2;

// =============================================================================
// SESSION STATE
// =============================================================================

/// Per-session positioning and navigation state.
#[derive(Debug)]
pub struct SessionState {
    /// Last smoothed position (pre route-snap), if any.
    pub last_location: Option<Point>,
    /// When `last_location` was stored, ms since Unix epoch.
    pub last_update_ms: i64,
    /// Recent smoothed positions for jitter averaging (bounded).
    pub jitter_buffer: VecDeque<Point>,
    /// Active navigation route, ≥2 waypoints when set.
    pub active_route: Option<Vec<Point>>,
    /// When the active route was set, ms since Unix epoch.
    pub route_set_at_ms: i64,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_location: None,
            last_update_ms: 0,
            jitter_buffer: VecDeque::with_capacity(JITTER_BUFFER_SIZE),
            active_route: None,
            route_set_at_ms: 0,
        }
    }

    #[must_use]
    pub fn has_active_route(&self) -> bool {
        self.active_route.is_some()
    }

    /// Install a navigation route. Routes shorter than two waypoints
    /// cannot be snapped to and are ignored.
    pub fn set_route(&mut self, route: Vec<Point>, now_ms: i64) {
        if route.len() >= 2 {
            self.active_route = Some(route);
            self.route_set_at_ms = now_ms;
        }
    }

    pub fn clear_route(&mut self) {
        self.active_route = None;
        self.route_set_at_ms = 0;
    }

    /// Push into the bounded jitter buffer, evicting the oldest entry.
    pub fn push_jitter(&mut self, point: Point) {
        if self.jitter_buffer.len() >= JITTER_BUFFER_SIZE {
            self.jitter_buffer.pop_front();
        }
        self.jitter_buffer.push_back(point);
    }

    /// Mean of the jitter buffer, or `None` when empty.
    #[must_use]
    pub fn jitter_mean(&self) -> Option<Point> {
        if self.jitter_buffer.is_empty() {
            return None;
        }
        let n = self.jitter_buffer.len() as f64;
        let (sx, sy) = self
            .jitter_buffer
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Some(Point::new(sx / n, sy / n))
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// LOCATION LOG
// =============================================================================

/// One position fix bound for the durable log sink.
#[derive(Debug, Clone)]
pub struct LocationLog {
    pub session_id: Uuid,
    pub x: f64,
    pub y: f64,
    pub zone_name: String,
    pub target_destination: Option<String>,
    /// ms since Unix epoch.
    pub timestamp_ms: i64,
}

// =============================================================================
// DEFAULT MODE
// =============================================================================

/// Process-wide default positioning mode behind an atomic.
#[derive(Debug)]
pub struct DefaultMode(AtomicU8);

impl DefaultMode {
    #[must_use]
    pub fn new(mode: Mode) -> Self {
        Self(AtomicU8::new(encode_mode(mode)))
    }

    #[must_use]
    pub fn load(&self) -> Mode {
        decode_mode(self.0.load(Ordering::Relaxed))
    }

    pub fn store(&self, mode: Mode) {
        self.0.store(encode_mode(mode), Ordering::Relaxed);
    }
}

fn encode_mode(mode: Mode) -> u8 {
    match mode {
        Mode::Proximity => 0,
        Mode::Weighted => 1,
        Mode::Trilateration => 2,
        Mode::Hybrid => 3,
    }
}

fn decode_mode(raw: u8) -> Mode {
    match raw {
        0 => Mode::Proximity,
        1 => Mode::Weighted,
        2 => Mode::Trilateration,
        _ => Mode::Hybrid,
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State
/// extractor. Clone is required by Axum — all inner fields are
/// Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    /// Beacon reference data, immutable after startup.
    pub registry: Arc<MapRegistry>,
    /// Waypoint graph, immutable after startup.
    pub graph: Arc<RouteGraph>,
    /// Live sessions: session id → per-session state.
    pub sessions: Arc<RwLock<HashMap<Uuid, SessionState>>>,
    /// Process-wide default positioning mode.
    pub default_mode: Arc<DefaultMode>,
    /// Queue into the location-log worker. `None` if the sink is disabled.
    pub log_tx: Option<mpsc::Sender<LocationLog>>,
}

impl AppState {
    #[must_use]
    pub fn new(
        registry: Arc<MapRegistry>,
        graph: Arc<RouteGraph>,
        log_tx: Option<mpsc::Sender<LocationLog>>,
    ) -> Self {
        Self {
            registry,
            graph,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            default_mode: Arc::new(DefaultMode::new(Mode::Hybrid)),
            log_tx,
        }
    }

    /// Number of currently connected sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
