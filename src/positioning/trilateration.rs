//! Trilateration estimator.
//!
//! DESIGN
//! ======
//! With ≥3 ranged beacons the position is recovered by an RSSI-weighted
//! nonlinear least-squares solver rather than a closed-form three-circle
//! intersection: measured ranges rarely intersect at all indoors, and
//! the iterative solver degrades gracefully (it minimizes the residual
//! instead of failing). The solver is seeded with a weighted centroid so
//! it starts inside the convex hull of the beacons and converges in a
//! handful of iterations.

use crate::geometry::{Point, PIXELS_PER_METER};
use crate::map::{Beacon, MapRegistry};
use crate::positioning::corridor::apply_soft_constraint;
use crate::positioning::ranging;
use crate::positioning::RssiReading;

/// Minimum readings for a solvable fix.
pub const MIN_BEACONS: usize = 3;

/// At most this many (closest) readings feed the solver.
const MAX_SOLVER_BEACONS: usize = 6;

/// Fixes at or below this confidence are discarded by the caller.
pub const CONFIDENCE_FLOOR: f64 = 0.3;

const MAX_ITERATIONS: usize = 50;
const CONVERGENCE_THRESHOLD_PX: f64 = 0.5;

/// A reading resolved against the registry and ranged, request-scoped.
#[derive(Debug)]
struct RangedReading<'a> {
    beacon: &'a Beacon,
    rssi: i32,
    distance_m: f64,
}

/// A solved trilateration fix.
#[derive(Debug, Clone, Copy)]
pub struct TrilaterationFix {
    pub location: Point,
    pub confidence: f64,
}

impl TrilaterationFix {
    /// Whether the fix clears the validity floor.
    #[must_use]
    pub fn is_confident(&self) -> bool {
        self.confidence > CONFIDENCE_FLOOR
    }
}

/// Solve for a position from ≥3 beacon readings.
///
/// Returns `None` when fewer than [`MIN_BEACONS`] readings survive the
/// signal/registry filter. The returned fix may still be below the
/// confidence floor; callers decide whether to fall back.
#[must_use]
pub fn trilaterate(registry: &MapRegistry, readings: &[RssiReading]) -> Option<TrilaterationFix> {
    let ranked = filter_and_rank(registry, readings);
    if ranked.len() < MIN_BEACONS {
        return None;
    }

    // Only the iterative solver is capped at the closest readings; the
    // seed and the confidence are computed over everything that ranged.
    let used = &ranked[..ranked.len().min(MAX_SOLVER_BEACONS)];
    let seed = weighted_centroid(&ranked);
    let solved = solve(seed, used);

    Some(TrilaterationFix {
        location: apply_soft_constraint(solved),
        confidence: confidence(&ranked),
    })
}

/// Resolve readings against the registry, range them, and sort closest
/// first. Weak signals (below [`ranging::MIN_VALID_RSSI`]) are dropped.
fn filter_and_rank<'a>(registry: &'a MapRegistry, readings: &[RssiReading]) -> Vec<RangedReading<'a>> {
    let mut ranked: Vec<RangedReading<'a>> = readings
        .iter()
        .filter(|r| r.rssi >= ranging::MIN_VALID_RSSI)
        .filter_map(|r| {
            registry.lookup(&r.beacon_id).map(|beacon| RangedReading {
                beacon,
                rssi: r.rssi,
                distance_m: ranging::distance_m(r.rssi),
            })
        })
        .collect();

    ranked.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
    ranked
}

/// Initial guess: centroid weighted by signal strength and inverse
/// square of estimated distance, so close strong beacons dominate.
fn weighted_centroid(readings: &[RangedReading<'_>]) -> Point {
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut total_weight = 0.0;

    for r in readings {
        let rssi_weight = 10f64.powf(f64::from(r.rssi + 100) / 30.0);
        let distance_weight = 1.0 / r.distance_m.max(0.5).powi(2);
        let weight = rssi_weight * distance_weight;

        sum_x += r.beacon.x * weight;
        sum_y += r.beacon.y * weight;
        total_weight += weight;
    }

    if total_weight == 0.0 {
        let n = readings.len() as f64;
        let (sx, sy) = readings
            .iter()
            .fold((0.0, 0.0), |(sx, sy), r| (sx + r.beacon.x, sy + r.beacon.y));
        return Point::new(sx / n, sy / n);
    }

    Point::new(sum_x / total_weight, sum_y / total_weight)
}

/// Gradient descent on the weighted squared range residuals with an
/// adaptive learning rate.
fn solve(seed: Point, readings: &[RangedReading<'_>]) -> Point {
    let mut p = seed;
    let mut learning_rate: f64 = 0.5;
    let mut prev_error = f64::MAX;

    for _ in 0..MAX_ITERATIONS {
        let mut grad_x = 0.0;
        let mut grad_y = 0.0;
        let mut total_weight = 0.0;
        let mut current_error = 0.0;

        for r in readings {
            let expected_px = r.distance_m * PIXELS_PER_METER;
            // Floor the actual distance so the direction term cannot
            // divide by zero when the estimate sits on a beacon.
            let actual_px = p.distance_to(r.beacon.location()).max(1.0);

            let residual = actual_px - expected_px;
            current_error += residual * residual;

            let weight = 10f64.powf(f64::from(r.rssi + 90) / 25.0);
            grad_x += weight * residual * (p.x - r.beacon.x) / actual_px;
            grad_y += weight * residual * (p.y - r.beacon.y) / actual_px;
            total_weight += weight;
        }

        if total_weight > 0.0 {
            grad_x /= total_weight;
            grad_y /= total_weight;
        }

        // Adapt the step: back off when the residual grew, speed up when
        // it dropped by more than 10%.
        if current_error > prev_error {
            learning_rate *= 0.5;
        } else if current_error < prev_error * 0.9 {
            learning_rate = (learning_rate * 1.1).min(1.0);
        }

        let next = Point::new(p.x - learning_rate * grad_x, p.y - learning_rate * grad_y);
        let movement = next.distance_to(p);

        p = next;
        prev_error = current_error;

        if movement < CONVERGENCE_THRESHOLD_PX {
            break;
        }
    }

    p
}

/// Fix confidence in [0, 1]: beacon count, strongest signal quality, and
/// geometric spread of the resolved beacons, weighted 0.3 / 0.4 / 0.3.
fn confidence(readings: &[RangedReading<'_>]) -> f64 {
    if readings.is_empty() {
        return 0.0;
    }

    let beacon_factor = (readings.len() as f64 / 5.0).min(1.0);

    let strongest = readings.iter().map(|r| r.rssi).max().unwrap_or(ranging::MIN_VALID_RSSI);
    let signal_factor = (f64::from(strongest + 100) / 50.0).clamp(0.0, 1.0);

    let spread_factor = (bounding_diagonal(readings) / 200.0).min(1.0);

    beacon_factor * 0.3 + signal_factor * 0.4 + spread_factor * 0.3
}

/// Diagonal of the bounding box of the beacons, in pixels.
fn bounding_diagonal(readings: &[RangedReading<'_>]) -> f64 {
    if readings.len() < 2 {
        return 0.0;
    }

    let mut min_x = f64::MAX;
    let mut max_x = f64::MIN;
    let mut min_y = f64::MAX;
    let mut max_y = f64::MIN;

    for r in readings {
        min_x = min_x.min(r.beacon.x);
        max_x = max_x.max(r.beacon.x);
        min_y = min_y.min(r.beacon.y);
        max_y = max_y.max(r.beacon.y);
    }

    ((max_x - min_x).powi(2) + (max_y - min_y).powi(2)).sqrt()
}

#[cfg(test)]
#[path = "trilateration_test.rs"]
mod tests;
