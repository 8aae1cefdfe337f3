//! Walkable-region constraint.
//!
//! DESIGN
//! ======
//! The floor's walkable area is two axis-aligned rectangles: the long
//! horizontal main corridor and the vertical left corridor hanging off
//! its west end. Radio estimates routinely land inside rooms or walls;
//! instead of clamping hard to the nearest wall (which makes the marker
//! crawl along it), overflow on the cross axis is reduced by
//! [`SOFT_CONSTRAINT_STRENGTH`] and the result is nudged toward the
//! corridor centre line.

use crate::geometry::Point;

// Main corridor: horizontal, x 200-1650, y 180-270.
pub const MAIN_X_MIN: f64 = 200.0;
pub const MAIN_X_MAX: f64 = 1650.0;
pub const MAIN_Y_MIN: f64 = 180.0;
pub const MAIN_Y_MAX: f64 = 270.0;
pub const MAIN_CENTER_Y: f64 = 225.0;

// Left corridor: vertical, x 200-290, y 270-700.
pub const LEFT_X_MIN: f64 = 200.0;
pub const LEFT_X_MAX: f64 = 290.0;
pub const LEFT_Y_MIN: f64 = 270.0;
pub const LEFT_Y_MAX: f64 = 700.0;
pub const LEFT_CENTER_X: f64 = 245.0;

/// How much of the cross-axis overflow is removed (1.0 = hard clamp).
pub const SOFT_CONSTRAINT_STRENGTH: f64 = 0.7;

/// Fraction of the remaining offset pulled toward the centre line.
const CENTER_PULL: f64 = 0.2;

/// Corridor-proximity margin for choosing which corridor owns a point.
const NEAR_MARGIN: f64 = 100.0;

/// Pull an estimate back into the walkable area.
///
/// Points already inside either corridor pass through unchanged. The
/// junction region (where the corridors meet) only gets its outer bounds
/// clamped so movement through the corner stays fluid.
#[must_use]
pub fn apply_soft_constraint(point: Point) -> Point {
    if in_main_corridor(point) || in_left_corridor(point) {
        return point;
    }

    // Junction: left-corridor x band, spanning the main corridor's y band
    // plus a short overlap below it.
    let in_junction = point.x >= LEFT_X_MIN
        && point.x <= LEFT_X_MAX
        && point.y >= MAIN_Y_MIN
        && point.y <= LEFT_Y_MIN + 30.0;
    if in_junction {
        return Point::new(point.x.clamp(MAIN_X_MIN, MAIN_X_MAX), point.y.max(MAIN_Y_MIN));
    }

    let near_main = near_main_corridor(point);
    let near_left = near_left_corridor(point);

    if point.y < LEFT_Y_MIN || (near_main && !near_left) {
        return pull_into_main(point);
    }
    if near_left {
        return pull_into_left(point);
    }

    // Far from both: whichever corridor's clamp is closer wins.
    let main_clamp = Point::new(point.x.clamp(MAIN_X_MIN, MAIN_X_MAX), point.y.clamp(MAIN_Y_MIN, MAIN_Y_MAX));
    let left_clamp = Point::new(point.x.clamp(LEFT_X_MIN, LEFT_X_MAX), point.y.clamp(LEFT_Y_MIN, LEFT_Y_MAX));

    if point.distance_to(main_clamp) <= point.distance_to(left_clamp) {
        pull_into_main(point)
    } else {
        pull_into_left(point)
    }
}

#[must_use]
pub fn in_main_corridor(p: Point) -> bool {
    p.x >= MAIN_X_MIN && p.x <= MAIN_X_MAX && p.y >= MAIN_Y_MIN && p.y <= MAIN_Y_MAX
}

#[must_use]
pub fn in_left_corridor(p: Point) -> bool {
    p.x >= LEFT_X_MIN && p.x <= LEFT_X_MAX && p.y >= LEFT_Y_MIN && p.y <= LEFT_Y_MAX
}

fn near_main_corridor(p: Point) -> bool {
    p.x >= MAIN_X_MIN - NEAR_MARGIN
        && p.x <= MAIN_X_MAX + NEAR_MARGIN
        && p.y >= MAIN_Y_MIN - NEAR_MARGIN
        && p.y <= MAIN_Y_MAX + NEAR_MARGIN
}

fn near_left_corridor(p: Point) -> bool {
    p.x >= LEFT_X_MIN - NEAR_MARGIN
        && p.x <= LEFT_X_MAX + NEAR_MARGIN
        && p.y >= LEFT_Y_MIN - NEAR_MARGIN
        && p.y <= LEFT_Y_MAX + NEAR_MARGIN
}

/// Soft pull into the main corridor: x clamps hard along the corridor's
/// length, y overflow shrinks, then a centre-line nudge.
fn pull_into_main(p: Point) -> Point {
    let x = p.x.clamp(MAIN_X_MIN, MAIN_X_MAX);

    // The softened value is re-clamped so a huge overflow cannot carry
    // the point through the opposite wall.
    let mut y = if p.y < MAIN_Y_MIN {
        let overflow = MAIN_Y_MIN - p.y;
        (MAIN_Y_MIN + overflow * (1.0 - SOFT_CONSTRAINT_STRENGTH)).clamp(MAIN_Y_MIN, MAIN_Y_MAX)
    } else if p.y > MAIN_Y_MAX {
        let overflow = p.y - MAIN_Y_MAX;
        (MAIN_Y_MAX - overflow * (1.0 - SOFT_CONSTRAINT_STRENGTH)).clamp(MAIN_Y_MIN, MAIN_Y_MAX)
    } else {
        p.y
    };

    y += (MAIN_CENTER_Y - y) * CENTER_PULL;
    Point::new(x, y)
}

/// Soft pull into the left corridor: y clamps hard, x overflow shrinks,
/// then a centre-line nudge.
fn pull_into_left(p: Point) -> Point {
    let y = p.y.clamp(LEFT_Y_MIN, LEFT_Y_MAX);

    let mut x = if p.x < LEFT_X_MIN {
        let overflow = LEFT_X_MIN - p.x;
        (LEFT_X_MIN + overflow * (1.0 - SOFT_CONSTRAINT_STRENGTH)).clamp(LEFT_X_MIN, LEFT_X_MAX)
    } else if p.x > LEFT_X_MAX {
        let overflow = p.x - LEFT_X_MAX;
        (LEFT_X_MAX - overflow * (1.0 - SOFT_CONSTRAINT_STRENGTH)).clamp(LEFT_X_MIN, LEFT_X_MAX)
    } else {
        p.x
    };

    x += (LEFT_CENTER_X - x) * CENTER_PULL;
    Point::new(x, y)
}

#[cfg(test)]
#[path = "corridor_test.rs"]
mod tests;
