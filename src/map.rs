//! Beacon reference data — the map registry.
//!
//! DESIGN
//! ======
//! The registry is built once at startup from the authoritative beacon
//! table and shared read-only behind an `Arc`. Lookups normalize the
//! client-supplied MAC (uppercase), and fall back to the byte-wise
//! reversed colon-group form because mobile BLE stacks report beacon
//! MACs in either byte order.
//!
//! ERROR HANDLING
//! ==============
//! Duplicate MACs in the reference data are a configuration fault, not
//! something to merge silently: construction fails and the process does
//! not start.

use std::collections::HashMap;

use crate::geometry::Point;

/// A stationary radio transmitter at a known map coordinate.
#[derive(Debug, Clone)]
pub struct Beacon {
    /// Canonical (uppercase, mobile-format) MAC address.
    pub mac: String,
    pub x: f64,
    pub y: f64,
}

impl Beacon {
    #[must_use]
    pub fn location(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("duplicate beacon mac in reference data: {0}")]
    DuplicateBeacon(String),
}

/// Static lookup tables: MAC → beacon, MAC → nearest room label.
pub struct MapRegistry {
    beacons: HashMap<String, Beacon>,
    beacon_rooms: HashMap<String, String>,
}

impl MapRegistry {
    /// Build a registry from `(mac, x, y, room)` reference tuples.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::DuplicateBeacon`] if two tuples normalize to
    /// the same MAC.
    pub fn new<'a>(entries: impl IntoIterator<Item = (&'a str, f64, f64, &'a str)>) -> Result<Self, MapError> {
        let mut beacons = HashMap::new();
        let mut beacon_rooms = HashMap::new();

        for (mac, x, y, room) in entries {
            let mac = normalize_mac(mac);
            if beacons.contains_key(&mac) {
                return Err(MapError::DuplicateBeacon(mac));
            }
            beacon_rooms.insert(mac.clone(), room.to_string());
            beacons.insert(mac.clone(), Beacon { mac, x, y });
        }

        Ok(Self { beacons, beacon_rooms })
    }

    /// Registry loaded with the building's surveyed beacon table.
    ///
    /// # Errors
    ///
    /// Returns an error if the seed table contains duplicates.
    pub fn from_seed_data() -> Result<Self, MapError> {
        Self::new(SEED_BEACONS.iter().copied())
    }

    /// Resolve a client-reported MAC to a beacon.
    ///
    /// Tries the uppercased form first, then the reversed colon-group
    /// form. Returns `None` only when neither matches.
    #[must_use]
    pub fn lookup(&self, mac: &str) -> Option<&Beacon> {
        let normalized = normalize_mac(mac);
        if let Some(beacon) = self.beacons.get(&normalized) {
            return Some(beacon);
        }
        self.beacons.get(&reverse_mac(&normalized))
    }

    /// Room label nearest to the given beacon, or `"unknown"`.
    #[must_use]
    pub fn nearest_room(&self, mac: &str) -> &str {
        let normalized = normalize_mac(mac);
        if let Some(room) = self.beacon_rooms.get(&normalized) {
            return room;
        }
        self.beacon_rooms
            .get(&reverse_mac(&normalized))
            .map_or("unknown", String::as_str)
    }

    /// Number of beacons in the registry.
    #[must_use]
    pub fn beacon_count(&self) -> usize {
        self.beacons.len()
    }
}

/// Canonical form: uppercase, whitespace-trimmed.
#[must_use]
pub fn normalize_mac(mac: &str) -> String {
    mac.trim().to_uppercase()
}

/// Reverse the six colon-separated byte groups.
///
/// `08:92:72:87:8D:D6` ↔ `D6:8D:87:72:92:08`. Inputs that are not six
/// groups come back unchanged (already normalized), so the function is
/// involutive on well-formed MACs.
#[must_use]
pub fn reverse_mac(mac: &str) -> String {
    let parts: Vec<&str> = mac.split(':').collect();
    if parts.len() != 6 {
        return mac.to_string();
    }
    let mut reversed = parts;
    reversed.reverse();
    reversed.join(":")
}

// =============================================================================
// SEED DATA
// =============================================================================

/// Surveyed RTLS beacon positions, in the MAC format the mobile app
/// reports, with the nearest room for each. 18 px = 1 m.
const SEED_BEACONS: [(&str, f64, f64, &str); 15] = [
    // Main corridor, south wall
    ("08:92:72:87:9C:72", 789.0, 184.0, "157"),
    ("08:92:72:87:9A:AE", 758.0, 262.0, "144"),
    ("08:92:72:87:8E:7A", 600.0, 266.0, "143"),
    ("08:92:72:87:9C:96", 966.0, 266.0, "146"),
    ("08:92:72:87:9C:86", 871.0, 263.0, "145"),
    ("08:92:72:87:8F:E6", 452.0, 265.0, "142"),
    ("08:92:72:87:8F:CE", 329.0, 262.0, "141"),
    // Main corridor, north wall
    ("08:92:72:87:8F:CA", 1143.0, 264.0, "147"),
    ("08:92:72:87:9B:36", 1085.0, 183.0, "156"),
    ("08:92:72:84:0A:66", 657.0, 184.0, "158"),
    ("08:92:72:87:8F:1A", 405.0, 187.0, "160"),
    ("08:92:72:87:9B:0E", 232.0, 185.0, "161"),
    // Left corridor
    ("08:92:72:87:8D:D6", 198.0, 232.0, "yemekhane"),
    ("08:92:72:87:8E:06", 198.0, 329.0, "139"),
    ("08:92:72:87:9A:72", 527.0, 186.0, "159"),
];

#[cfg(test)]
#[path = "map_test.rs"]
mod tests;
