//! Proximity-based estimators.
//!
//! DESIGN
//! ======
//! Two variants. Plain proximity takes the strongest beacon's surveyed
//! position as the user's position — coarse, but robust, and ideal for
//! room-level answers. The weighted variant blends all resolvable
//! beacons into an RSSI-weighted centroid, which tracks movement between
//! beacons, then pushes the blend through the corridor constraint since
//! a centroid of wall-mounted beacons often lands inside a room.

use crate::geometry::Point;
use crate::map::MapRegistry;
use crate::positioning::corridor::apply_soft_constraint;
use crate::positioning::ranging;
use crate::positioning::RssiReading;

/// A successful proximity fix plus the auxiliary beacon info reported to
/// the client.
#[derive(Debug, Clone)]
pub struct ProximityFix {
    pub location: Point,
    pub nearest_beacon: String,
    pub nearest_room: String,
    pub estimated_distance_m: f64,
}

/// Strongest-beacon fix. `None` when no reading resolves to a known
/// beacon.
#[must_use]
pub fn proximity(registry: &MapRegistry, readings: &[RssiReading]) -> Option<ProximityFix> {
    let (beacon, rssi) = readings
        .iter()
        .filter_map(|r| registry.lookup(&r.beacon_id).map(|b| (b, r.rssi)))
        .max_by_key(|&(_, rssi)| rssi)?;

    Some(ProximityFix {
        location: beacon.location(),
        nearest_beacon: beacon.mac.clone(),
        nearest_room: registry.nearest_room(&beacon.mac).to_string(),
        estimated_distance_m: ranging::distance_m(rssi),
    })
}

/// RSSI-weighted centroid fix, corridor-constrained.
///
/// Weights are `10^((rssi + 100) / 20)`: a 20 dB advantage is a 10×
/// weight advantage, so the centroid hugs the strongest beacon without
/// ignoring the rest.
#[must_use]
pub fn weighted_proximity(registry: &MapRegistry, readings: &[RssiReading]) -> Option<ProximityFix> {
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut total_weight = 0.0;

    let mut strongest: Option<(&crate::map::Beacon, i32)> = None;

    for reading in readings {
        let Some(beacon) = registry.lookup(&reading.beacon_id) else {
            continue;
        };

        let weight = 10f64.powf(f64::from(reading.rssi + 100) / 20.0);
        sum_x += beacon.x * weight;
        sum_y += beacon.y * weight;
        total_weight += weight;

        if strongest.is_none_or(|(_, best)| reading.rssi > best) {
            strongest = Some((beacon, reading.rssi));
        }
    }

    let (strongest_beacon, strongest_rssi) = strongest?;
    if total_weight == 0.0 {
        return None;
    }

    let centroid = Point::new(sum_x / total_weight, sum_y / total_weight);

    Some(ProximityFix {
        location: apply_soft_constraint(centroid),
        nearest_beacon: strongest_beacon.mac.clone(),
        nearest_room: registry.nearest_room(&strongest_beacon.mac).to_string(),
        estimated_distance_m: ranging::distance_m(strongest_rssi),
    })
}

#[cfg(test)]
#[path = "proximity_test.rs"]
mod tests;
