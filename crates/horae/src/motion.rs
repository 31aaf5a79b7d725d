//! Apparent retrograde motion from finite differences of longitude.

use crate::angles::wrapped_delta_degrees;
use crate::body::CelestialBody;
use crate::ephemeris::{EphemerisError, EphemerisProvider};
use chrono::{DateTime, Duration, Utc};

/// Sampling interval. Long enough to rise above ephemeris noise, short enough
/// that the longitude change is close to linear.
pub const RETROGRADE_SAMPLE_DAYS: i64 = 1;

/// True when the longitude decreased from `earlier` to `later`.
///
/// The difference is taken on the circle, so 359° -> 1° is direct motion.
/// Zero change counts as direct.
pub fn is_retrograde_motion(earlier: f64, later: f64) -> bool {
    wrapped_delta_degrees(earlier, later) < 0.0
}

/// Whether `body` is apparently retrograde at `at`, judged from its apparent
/// geocentric ecliptic longitude one day earlier and now.
pub fn is_retrograde<P>(provider: &P, body: CelestialBody, at: DateTime<Utc>) -> Result<bool, EphemerisError>
where
    P: EphemerisProvider + ?Sized,
{
    if body.is_luminary() {
        return Ok(false);
    }
    let before = at - Duration::days(RETROGRADE_SAMPLE_DAYS);
    let earlier = provider.ecliptic_longitude(body, before, true)?;
    let later = provider.ecliptic_longitude(body, at, true)?;
    Ok(is_retrograde_motion(earlier, later))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_across_zero_is_direct() {
        assert!(!is_retrograde_motion(359.0, 1.0));
    }

    #[test]
    fn test_backward_across_zero_is_retrograde() {
        assert!(is_retrograde_motion(1.0, 359.0));
    }

    #[test]
    fn test_plain_motion() {
        assert!(!is_retrograde_motion(100.0, 100.5));
        assert!(is_retrograde_motion(100.5, 100.0));
    }

    #[test]
    fn test_stationary_is_direct() {
        assert!(!is_retrograde_motion(42.0, 42.0));
    }
}
