use super::*;

#[test]
fn near_reading_estimates_under_a_meter() {
    // -55 dBm with tx power -59 is closer than the 1 m reference point.
    let d = distance_m(-55);
    assert!(d > 0.7 && d < 0.9, "got {d}");
}

#[test]
fn one_meter_reference_rssi_lands_near_calibration_factor() {
    // rssi == TX_POWER means the model's raw distance is exactly 1 m.
    let d = distance_m(-59);
    assert!((d - DISTANCE_CALIBRATION_FACTOR).abs() < 1e-9);
}

#[test]
fn distance_is_clamped_to_model_bounds() {
    assert!((distance_m(0) - MIN_DISTANCE_M).abs() < f64::EPSILON);
    assert!((distance_m(-30) - MIN_DISTANCE_M).abs() < f64::EPSILON);
    assert!((distance_m(-120) - MAX_DISTANCE_M).abs() < f64::EPSILON);
}

#[test]
fn all_estimates_stay_within_bounds() {
    for rssi in -120..=0 {
        let d = distance_m(rssi);
        assert!(
            (MIN_DISTANCE_M..=MAX_DISTANCE_M).contains(&d),
            "rssi={rssi} gave {d}"
        );
    }
}

#[test]
fn distance_monotone_within_near_regime() {
    for rssi in (RSSI_NEAR_THRESHOLD + 1)..=0 {
        assert!(distance_m(rssi) <= distance_m(rssi - 1), "rssi={rssi}");
    }
}

#[test]
fn distance_monotone_within_mid_regime() {
    for rssi in (RSSI_FAR_THRESHOLD + 1)..=RSSI_NEAR_THRESHOLD {
        assert!(distance_m(rssi) <= distance_m(rssi - 1), "rssi={rssi}");
    }
}

#[test]
fn distance_monotone_within_far_regime() {
    for rssi in (MIN_VALID_RSSI + 1)..RSSI_FAR_THRESHOLD {
        assert!(distance_m(rssi) <= distance_m(rssi - 1), "rssi={rssi}");
    }
}

#[test]
fn exponent_grows_with_signal_loss() {
    assert!((path_loss_exponent(-50) - BASE_PATH_LOSS_EXPONENT).abs() < f64::EPSILON);
    assert!((path_loss_exponent(-70) - 2.45).abs() < 1e-9);
    assert!((path_loss_exponent(-80) - 2.7).abs() < 1e-9);
    assert!((path_loss_exponent(-85) - 3.0).abs() < 1e-9);
}

#[test]
fn weaker_signal_never_shrinks_exponent() {
    for rssi in -119..=0 {
        assert!(path_loss_exponent(rssi) <= path_loss_exponent(rssi - 1));
    }
}
