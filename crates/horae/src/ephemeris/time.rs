//! Julian day and sidereal time conversions.

use chrono::{DateTime, Utc};

/// Julian day of the Unix epoch.
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;
/// Julian day of J2000.0.
pub const J2000_JD: f64 = 2_451_545.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Convert a UTC instant to a Julian day (UT).
pub fn datetime_to_julian_day(dt: DateTime<Utc>) -> f64 {
    dt.timestamp_millis() as f64 / MILLIS_PER_DAY + UNIX_EPOCH_JD
}

/// Greenwich mean sidereal time in degrees (Meeus 12.4).
pub fn greenwich_mean_sidereal_degrees(jd: f64) -> f64 {
    let d = jd - J2000_JD;
    let t = d / 36_525.0;
    let theta = 280.460_618_37 + 360.985_647_366_29 * d + 0.000_387_933 * t * t
        - t * t * t / 38_710_000.0;
    crate::angles::normalize_degrees(theta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_j2000() {
        let dt = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert!((datetime_to_julian_day(dt) - J2000_JD).abs() < 1e-9);
        let epoch = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(datetime_to_julian_day(epoch), UNIX_EPOCH_JD);
    }

    #[test]
    fn test_gmst_meeus_example() {
        // Meeus example 12.a: 1987 April 10, 0h UT -> 13h10m46.3668s
        let dt = Utc.with_ymd_and_hms(1987, 4, 10, 0, 0, 0).unwrap();
        let gmst = greenwich_mean_sidereal_degrees(datetime_to_julian_day(dt));
        let expected = (13.0 + 10.0 / 60.0 + 46.3668 / 3600.0) * 15.0;
        assert!((gmst - expected).abs() < 1e-3, "gmst {gmst} expected {expected}");
    }
}
