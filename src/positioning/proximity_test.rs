use super::*;
use crate::positioning::corridor;

fn seed_registry() -> MapRegistry {
    MapRegistry::from_seed_data().unwrap()
}

fn reading(mac: &str, rssi: i32) -> RssiReading {
    RssiReading { beacon_id: mac.to_string(), rssi }
}

#[test]
fn single_beacon_fix_uses_beacon_position() {
    let registry = seed_registry();
    let fix = proximity(&registry, &[reading("08:92:72:87:9C:72", -55)]).expect("known beacon");

    assert!((fix.location.x - 789.0).abs() < f64::EPSILON);
    assert!((fix.location.y - 184.0).abs() < f64::EPSILON);
    assert_eq!(fix.nearest_room, "157");
    assert!((fix.estimated_distance_m - 0.8).abs() < 0.1);
}

#[test]
fn strongest_beacon_wins() {
    let registry = seed_registry();
    let fix = proximity(
        &registry,
        &[
            reading("08:92:72:87:9B:0E", -80),
            reading("08:92:72:87:8F:CE", -52),
            reading("08:92:72:87:8F:1A", -71),
        ],
    )
    .unwrap();

    assert_eq!(fix.nearest_beacon, "08:92:72:87:8F:CE");
    assert_eq!(fix.nearest_room, "141");
}

#[test]
fn unknown_beacons_are_skipped_not_fatal() {
    let registry = seed_registry();
    let fix = proximity(
        &registry,
        &[
            reading("FF:FF:FF:FF:FF:01", -40),
            reading("08:92:72:87:9C:72", -70),
        ],
    )
    .unwrap();
    assert_eq!(fix.nearest_beacon, "08:92:72:87:9C:72");
}

#[test]
fn no_resolvable_beacon_is_none() {
    let registry = seed_registry();
    assert!(proximity(&registry, &[]).is_none());
    assert!(proximity(&registry, &[reading("FF:FF:FF:FF:FF:01", -40)]).is_none());
    assert!(weighted_proximity(&registry, &[reading("FF:FF:FF:FF:FF:01", -40)]).is_none());
}

#[test]
fn reversed_mac_resolves_in_proximity() {
    let registry = seed_registry();
    let fix = proximity(&registry, &[reading("D6:8D:87:72:92:08", -60)]).unwrap();
    assert_eq!(fix.nearest_beacon, "08:92:72:87:8D:D6");
    assert_eq!(fix.nearest_room, "yemekhane");
}

#[test]
fn weighted_centroid_leans_toward_stronger_beacon() {
    let registry = seed_registry();
    // Beacon 12 at (232, 185) rssi -60 vs beacon 11 at (329, 262) rssi -70.
    let fix = weighted_proximity(
        &registry,
        &[
            reading("08:92:72:87:9B:0E", -60),
            reading("08:92:72:87:8F:CE", -70),
        ],
    )
    .unwrap();

    assert!(fix.location.x > 232.0 && fix.location.x < 329.0, "x={}", fix.location.x);
    // 10 dB advantage ⇒ ~3.16x weight ⇒ centroid in the stronger half.
    assert!(fix.location.x < (232.0 + 329.0) / 2.0, "x={}", fix.location.x);
    assert_eq!(fix.nearest_beacon, "08:92:72:87:9B:0E");
}

#[test]
fn weighted_centroid_is_corridor_constrained() {
    let registry = seed_registry();
    // All readings equal: centroid of beacon positions, which may land
    // off-corridor; the constraint must bring it back.
    let fix = weighted_proximity(
        &registry,
        &[
            reading("08:92:72:87:9C:72", -65),
            reading("08:92:72:87:9A:AE", -65),
            reading("08:92:72:87:9B:36", -65),
        ],
    )
    .unwrap();

    assert!(
        corridor::in_main_corridor(fix.location) || corridor::in_left_corridor(fix.location),
        "{:?}",
        fix.location
    );
}

#[test]
fn weighted_reports_strongest_beacon_distance() {
    let registry = seed_registry();
    let fix = weighted_proximity(
        &registry,
        &[
            reading("08:92:72:87:9C:72", -55),
            reading("08:92:72:87:9A:AE", -75),
        ],
    )
    .unwrap();
    // Distance estimate comes from the -55 reading, not the blend.
    assert!((fix.estimated_distance_m - crate::positioning::ranging::distance_m(-55)).abs() < 1e-12);
}
