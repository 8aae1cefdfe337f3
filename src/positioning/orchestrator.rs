//! Positioning orchestrator.
//!
//! DESIGN
//! ======
//! Dispatches a batch of readings to the estimator selected by the mode,
//! then runs the per-session smoothing pipeline: jitter gate → speed
//! clamp → adaptive EMA → jitter-buffer average → snap-to-route. Two
//! parameter sets exist: normal mode favors stability (heavy smoothing,
//! jitter averaging), navigation mode favors responsiveness (lighter
//! smoothing, no buffer) because a laggy marker on an active route reads
//! as "the app is lost".
//!
//! ERROR HANDLING
//! ==============
//! Low-confidence trilateration is not an error — it falls back to the
//! weighted centroid. Errors surface only when no estimator can produce
//! a fix at all.

use crate::geometry::Point;
use crate::map::MapRegistry;
use crate::positioning::proximity::{proximity, weighted_proximity, ProximityFix};
use crate::positioning::ranging;
use crate::positioning::snap::snap_to_route;
use crate::positioning::trilateration::{trilaterate, MIN_BEACONS};
use crate::positioning::{Mode, RssiReading};
use crate::state::SessionState;

/// Hard ceiling on apparent movement speed, px/s (90 px = 5 m).
pub const MAX_SPEED_PX_PER_S: f64 = 90.0;

/// Above this speed the user counts as moving and gets the fast alpha.
pub const MOVEMENT_SPEED_THRESHOLD_PX_PER_S: f64 = 15.0;

/// Floor on the time delta so a burst of requests cannot produce an
/// absurd speed estimate.
const MIN_DT_S: f64 = 0.05;

/// Trilateration must beat this confidence to win the hybrid dispatch.
const HYBRID_TRILATERATION_CONFIDENCE: f64 = 0.5;

/// Fixed confidences for the proximity estimators.
const PROXIMITY_CONFIDENCE: f64 = 0.7;
const WEIGHTED_CONFIDENCE: f64 = 0.75;

/// Smoothing parameters, selected by navigation mode.
struct SmoothingParams {
    alpha_moving: f64,
    alpha_static: f64,
    min_move_px: f64,
    use_jitter_buffer: bool,
}

const NORMAL_PARAMS: SmoothingParams = SmoothingParams {
    alpha_moving: 0.50,
    alpha_static: 0.15,
    min_move_px: 6.0,
    use_jitter_buffer: true,
};

const NAVIGATION_PARAMS: SmoothingParams = SmoothingParams {
    alpha_moving: 0.75,
    alpha_static: 0.35,
    min_move_px: 4.0,
    use_jitter_buffer: false,
};

// =============================================================================
// RESULT / ERROR TYPES
// =============================================================================

/// A position answer ready for the wire layer.
#[derive(Debug, Clone)]
pub struct PositioningResult {
    /// Displayed position: smoothed, then snapped onto the active route.
    pub location: Point,
    /// Smoothed position before any route snap. Session state tracks
    /// this, and route planning starts from it, so a snap offset never
    /// feeds back into the speed math or the planner.
    pub smoothed_location: Point,
    pub mode: Mode,
    pub confidence: f64,
    pub nearest_beacon: Option<String>,
    pub nearest_room: Option<String>,
    pub estimated_distance_m: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum PositioningError {
    #[error("no beacon readings in request")]
    NoReadings,
    #[error("no reading resolved to a known beacon")]
    UnresolvableBeacons,
    #[error("trilateration requires at least 3 usable readings, got {got}")]
    InsufficientReadings { got: usize },
}

// =============================================================================
// PUBLIC ENTRY POINT
// =============================================================================

/// Compute a smoothed, route-snapped position for one session.
///
/// `navigation_requested` forces the navigation smoothing parameters even
/// before a route is active; a session with an active route always uses
/// them.
///
/// # Errors
///
/// Returns a [`PositioningError`] when no estimator can produce a valid
/// fix from `readings`. Session state is untouched on error.
pub fn calculate_location(
    registry: &MapRegistry,
    session: &mut SessionState,
    readings: &[RssiReading],
    mode: Mode,
    navigation_requested: bool,
    now_ms: i64,
) -> Result<PositioningResult, PositioningError> {
    if readings.is_empty() {
        return Err(PositioningError::NoReadings);
    }

    // Reject sub-threshold signals before any estimator sees them.
    let usable: Vec<RssiReading> = readings
        .iter()
        .filter(|r| r.rssi >= ranging::MIN_VALID_RSSI)
        .cloned()
        .collect();
    if usable.is_empty() {
        return Err(PositioningError::UnresolvableBeacons);
    }

    let raw = dispatch(registry, &usable, mode)?;

    let navigation = navigation_requested || session.has_active_route();
    let (smoothed, advance) = smooth(session, raw.location, navigation, now_ms);

    // Snap is display-only: the stored state stays pre-snap so the next
    // step's delta and speed are measured against what smoothing
    // actually produced.
    let emitted = match session.active_route.as_deref() {
        Some(route) => snap_to_route(smoothed, route),
        None => smoothed,
    };

    if advance {
        session.last_location = Some(smoothed);
        session.last_update_ms = now_ms;
    }

    Ok(PositioningResult { location: emitted, smoothed_location: smoothed, ..raw })
}

// =============================================================================
// MODE DISPATCH
// =============================================================================

fn dispatch(
    registry: &MapRegistry,
    readings: &[RssiReading],
    mode: Mode,
) -> Result<PositioningResult, PositioningError> {
    match mode {
        Mode::Proximity => proximity(registry, readings)
            .map(|fix| from_proximity(fix, Mode::Proximity, PROXIMITY_CONFIDENCE))
            .ok_or(PositioningError::UnresolvableBeacons),

        Mode::Weighted => weighted_proximity(registry, readings)
            .map(|fix| from_proximity(fix, Mode::Weighted, WEIGHTED_CONFIDENCE))
            .ok_or(PositioningError::UnresolvableBeacons),

        Mode::Trilateration => {
            if let Some(fix) = trilaterate(registry, readings).filter(|f| f.is_confident()) {
                return Ok(from_trilateration(registry, readings, fix.location, fix.confidence));
            }
            // Low confidence or too few beacons: recover via the centroid.
            weighted_proximity(registry, readings)
                .map(|fix| from_proximity(fix, Mode::Weighted, WEIGHTED_CONFIDENCE))
                .ok_or_else(|| {
                    if readings.len() < MIN_BEACONS {
                        PositioningError::InsufficientReadings { got: readings.len() }
                    } else {
                        PositioningError::UnresolvableBeacons
                    }
                })
        }

        Mode::Hybrid => match readings.len() {
            1 => dispatch(registry, readings, Mode::Proximity),
            2 => dispatch(registry, readings, Mode::Weighted),
            _ => {
                if let Some(fix) =
                    trilaterate(registry, readings).filter(|f| f.confidence > HYBRID_TRILATERATION_CONFIDENCE)
                {
                    return Ok(from_trilateration(registry, readings, fix.location, fix.confidence));
                }
                dispatch(registry, readings, Mode::Weighted)
            }
        },
    }
}

fn from_proximity(fix: ProximityFix, mode: Mode, confidence: f64) -> PositioningResult {
    PositioningResult {
        location: fix.location,
        smoothed_location: fix.location,
        mode,
        confidence,
        nearest_beacon: Some(fix.nearest_beacon),
        nearest_room: Some(fix.nearest_room),
        estimated_distance_m: fix.estimated_distance_m,
    }
}

/// Trilateration answers the position; the nearest-beacon info shown to
/// the user still comes from the proximity view of the same readings.
fn from_trilateration(
    registry: &MapRegistry,
    readings: &[RssiReading],
    location: Point,
    confidence: f64,
) -> PositioningResult {
    let aux = proximity(registry, readings);
    PositioningResult {
        location,
        smoothed_location: location,
        mode: Mode::Trilateration,
        confidence,
        nearest_beacon: aux.as_ref().map(|fix| fix.nearest_beacon.clone()),
        nearest_room: aux.as_ref().map(|fix| fix.nearest_room.clone()),
        estimated_distance_m: aux.map_or(0.0, |fix| fix.estimated_distance_m),
    }
}

// =============================================================================
// SMOOTHING PIPELINE
// =============================================================================

/// Run the temporal filter over one raw fix.
///
/// Returns the smoothed point and whether session state should advance
/// to it (the jitter gate returns a held position without advancing).
fn smooth(session: &mut SessionState, raw: Point, navigation: bool, now_ms: i64) -> (Point, bool) {
    let params = if navigation { &NAVIGATION_PARAMS } else { &NORMAL_PARAMS };

    let Some(last) = session.last_location else {
        // First fix for the session: accept it as-is.
        return (raw, true);
    };

    let dt_s = ((now_ms - session.last_update_ms) as f64 / 1000.0).max(MIN_DT_S);
    let delta = raw.distance_to(last);
    let speed = delta / dt_s;

    // Jitter gate: sub-threshold movement is almost always measurement
    // noise while standing still. Hold the previous output.
    if delta < params.min_move_px {
        let held = if params.use_jitter_buffer {
            session.jitter_mean().unwrap_or(last)
        } else {
            last
        };
        return (held, false);
    }

    // Clamp impossible jumps to the maximum plausible walking step.
    let target = if speed > MAX_SPEED_PX_PER_S {
        let scale = MAX_SPEED_PX_PER_S * dt_s / delta;
        Point::new(last.x + (raw.x - last.x) * scale, last.y + (raw.y - last.y) * scale)
    } else {
        raw
    };

    let alpha = if speed > MOVEMENT_SPEED_THRESHOLD_PX_PER_S {
        params.alpha_moving
    } else {
        params.alpha_static
    };
    let smoothed = Point::new(
        alpha * target.x + (1.0 - alpha) * last.x,
        alpha * target.y + (1.0 - alpha) * last.y,
    );

    let output = if params.use_jitter_buffer {
        session.push_jitter(smoothed);
        session.jitter_mean().unwrap_or(smoothed)
    } else {
        session.jitter_buffer.clear();
        smoothed
    };

    (output, true)
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
