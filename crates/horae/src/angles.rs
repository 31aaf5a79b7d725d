//! Angle helpers shared by the resolvers and the ephemeris searches.

/// Normalize degrees to [0, 360).
pub fn normalize_degrees(value: f64) -> f64 {
    ((value % 360.0) + 360.0) % 360.0
}

/// Signed difference `later - earlier` wrapped into [-180, 180].
pub fn wrapped_delta_degrees(earlier: f64, later: f64) -> f64 {
    let mut diff = later - earlier;
    if diff > 180.0 {
        diff -= 360.0;
    }
    if diff < -180.0 {
        diff += 360.0;
    }
    diff
}

/// Normalize hours to [0, 24).
pub fn normalize_hours(value: f64) -> f64 {
    normalize_degrees(value * 15.0) / 15.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(725.0), 5.0);
        assert_eq!(normalize_degrees(-30.0), 330.0);
        assert_eq!(normalize_degrees(-1e-15), 0.0);
    }

    #[test]
    fn test_wrapped_delta_crosses_zero() {
        assert!((wrapped_delta_degrees(359.0, 1.0) - 2.0).abs() < 1e-9);
        assert!((wrapped_delta_degrees(1.0, 359.0) + 2.0).abs() < 1e-9);
        assert!((wrapped_delta_degrees(10.0, 15.0) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_hours() {
        assert!((normalize_hours(25.5) - 1.5).abs() < 1e-9);
        assert!((normalize_hours(-1.0) - 23.0).abs() < 1e-9);
    }
}
