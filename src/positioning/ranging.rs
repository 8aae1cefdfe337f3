//! RSSI → distance conversion.
//!
//! DESIGN
//! ======
//! Piecewise-adaptive log-distance path-loss model. The exponent grows
//! with weaker signal: near readings see mostly line-of-sight, far ones
//! accumulate wall and body attenuation, so a single exponent
//! systematically under- or over-shoots at one end of the range.

/// Reference RSSI at 1 m (dBm). Beacon-vendor typical: -55 to -65.
pub const TX_POWER: f64 = -59.0;

/// Base path-loss exponent for indoor line-of-sight.
pub const BASE_PATH_LOSS_EXPONENT: f64 = 2.2;

/// Above this RSSI the base exponent applies unmodified.
pub const RSSI_NEAR_THRESHOLD: i32 = -60;

/// Below this RSSI the exponent is at its maximum.
pub const RSSI_FAR_THRESHOLD: i32 = -80;

/// Readings weaker than this are rejected before estimation.
pub const MIN_VALID_RSSI: i32 = -90;

/// Distance clamp, metres.
pub const MIN_DISTANCE_M: f64 = 0.5;
pub const MAX_DISTANCE_M: f64 = 15.0;

/// Site calibration factor applied to the raw model output.
pub const DISTANCE_CALIBRATION_FACTOR: f64 = 1.15;

/// Estimate the distance to a beacon from one RSSI sample, in metres.
///
/// `d = CALIB · 10^((TX_POWER − rssi) / (10·n))`, clamped to
/// [[`MIN_DISTANCE_M`], [`MAX_DISTANCE_M`]].
#[must_use]
pub fn distance_m(rssi: i32) -> f64 {
    let n = path_loss_exponent(rssi);
    let raw = 10f64.powf((TX_POWER - f64::from(rssi)) / (10.0 * n));
    (raw * DISTANCE_CALIBRATION_FACTOR).clamp(MIN_DISTANCE_M, MAX_DISTANCE_M)
}

/// Adaptive path-loss exponent for one RSSI sample.
#[must_use]
pub fn path_loss_exponent(rssi: i32) -> f64 {
    if rssi >= RSSI_NEAR_THRESHOLD {
        BASE_PATH_LOSS_EXPONENT
    } else if rssi >= RSSI_FAR_THRESHOLD {
        let ratio = f64::from(RSSI_NEAR_THRESHOLD - rssi)
            / f64::from(RSSI_NEAR_THRESHOLD - RSSI_FAR_THRESHOLD);
        BASE_PATH_LOSS_EXPONENT + ratio * 0.5
    } else {
        BASE_PATH_LOSS_EXPONENT + 0.8
    }
}

#[cfg(test)]
#[path = "ranging_test.rs"]
mod tests;
