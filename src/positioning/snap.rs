//! Snap-to-route projection.
//!
//! During navigation the user is almost certainly on the route they were
//! given, so estimates within a short lateral distance of the active
//! polyline are replaced by their projection onto it. Estimates further
//! away are left alone — the user has left the route and the display
//! should say so.

use crate::geometry::{project_onto_segment, Point};

/// Maximum projection distance for a snap, in pixels (~3.3 m).
pub const SNAP_TO_ROUTE_THRESHOLD_PX: f64 = 60.0;

/// Project `point` onto the closest segment of `route` if it lies within
/// [`SNAP_TO_ROUTE_THRESHOLD_PX`]; otherwise return it unchanged.
///
/// Routes with fewer than two waypoints cannot be snapped to.
#[must_use]
pub fn snap_to_route(point: Point, route: &[Point]) -> Point {
    if route.len() < 2 {
        return point;
    }

    let mut best: Option<(f64, Point)> = None;
    for segment in route.windows(2) {
        let projected = project_onto_segment(point, segment[0], segment[1]);
        let distance = point.distance_to(projected);
        if best.is_none_or(|(best_distance, _)| distance < best_distance) {
            best = Some((distance, projected));
        }
    }

    match best {
        Some((distance, projected)) if distance <= SNAP_TO_ROUTE_THRESHOLD_PX => projected,
        _ => point,
    }
}

#[cfg(test)]
#[path = "snap_test.rs"]
mod tests;
