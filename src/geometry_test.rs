use super::*;

#[test]
fn distance_is_euclidean() {
    let a = Point::new(0.0, 0.0);
    let b = Point::new(3.0, 4.0);
    assert!((a.distance_to(b) - 5.0).abs() < 1e-12);
    assert!((b.distance_to(a) - 5.0).abs() < 1e-12);
}

#[test]
fn distance_to_self_is_zero() {
    let p = Point::new(245.0, 225.0);
    assert_eq!(p.distance_to(p), 0.0);
}

#[test]
fn meter_conversion_uses_map_scale() {
    let p = Point::new(360.0, 90.0);
    assert!((p.x_meters() - 20.0).abs() < 1e-12);
    assert!((p.y_meters() - 5.0).abs() < 1e-12);
}

#[test]
fn projection_hits_perpendicular_foot() {
    // Horizontal segment; the foot drops straight down.
    let a = Point::new(245.0, 225.0);
    let b = Point::new(760.0, 225.0);
    let snapped = project_onto_segment(Point::new(500.0, 250.0), a, b);
    assert!((snapped.x - 500.0).abs() < 1e-9);
    assert!((snapped.y - 225.0).abs() < 1e-9);
}

#[test]
fn projection_clamps_to_endpoints() {
    let a = Point::new(0.0, 0.0);
    let b = Point::new(10.0, 0.0);

    let before = project_onto_segment(Point::new(-5.0, 3.0), a, b);
    assert_eq!(before, a);

    let after = project_onto_segment(Point::new(15.0, -2.0), a, b);
    assert_eq!(after, b);
}

#[test]
fn projection_degenerate_segment_returns_start() {
    let a = Point::new(4.0, 4.0);
    let p = project_onto_segment(Point::new(9.0, 9.0), a, a);
    assert_eq!(p, a);
}

#[test]
fn point_serde_round_trip() {
    let p = Point::new(789.0, 184.0);
    let json = serde_json::to_string(&p).unwrap();
    let restored: Point = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, p);
}
