//! Event searches built on the two position primitives of a provider:
//! horizon crossings, lunar phase instants and eclipse syzygies.

use crate::angles::wrapped_delta_degrees;
use crate::body::CelestialBody;
use crate::ephemeris::provider::{ensure_finite, EphemerisError, EphemerisProvider};
use crate::ephemeris::time::{datetime_to_julian_day, greenwich_mean_sidereal_degrees};
use crate::ephemeris::types::{
    EclipticPosition, EquatorialPosition, ObserverLocation, RiseSetDirection,
};
use chrono::{DateTime, Duration, Utc};

/// Scan step for horizon crossings. Short enough that the Moon cannot rise
/// and set inside one step.
const HORIZON_SCAN_STEP_MINUTES: i64 = 10;
/// Scan step for lunar phase searches; the elongation moves ~12.2°/day.
const PHASE_SCAN_STEP_HOURS: i64 = 24;
/// Bisection stops once the bracket is this narrow.
const REFINE_TOLERANCE_MILLIS: i64 = 1_000;

/// Moon's |ecliptic latitude| at new moon below which a solar eclipse occurs.
pub const SOLAR_ECLIPSE_LATITUDE_LIMIT: f64 = 1.58;
/// Moon's |ecliptic latitude| at full moon below which a (penumbral) lunar
/// eclipse occurs.
pub const LUNAR_ECLIPSE_LATITUDE_LIMIT: f64 = 1.6;
/// Eclipse seasons recur within six lunations; two years is ample.
const MAX_ECLIPSE_LUNATIONS: usize = 26;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syzygy {
    NewMoon,
    FullMoon,
}

impl Syzygy {
    fn elongation(self) -> f64 {
        match self {
            Syzygy::NewMoon => 0.0,
            Syzygy::FullMoon => 180.0,
        }
    }

    fn latitude_limit(self) -> f64 {
        match self {
            Syzygy::NewMoon => SOLAR_ECLIPSE_LATITUDE_LIMIT,
            Syzygy::FullMoon => LUNAR_ECLIPSE_LATITUDE_LIMIT,
        }
    }

    fn eclipse_name(self) -> &'static str {
        match self {
            Syzygy::NewMoon => "solar eclipse",
            Syzygy::FullMoon => "lunar eclipse",
        }
    }
}

/// Altitude of the body's center at the standard rise/set moment, including
/// refraction, semidiameter, the Moon's parallax and the observer's dip.
pub fn standard_altitude(body: CelestialBody, height_meters: f64) -> f64 {
    let base = match body {
        CelestialBody::Sun => -0.8333,
        CelestialBody::Moon => 0.125,
        _ => -0.5667,
    };
    base - 0.0353 * height_meters.max(0.0).sqrt()
}

/// Geometric altitude in degrees of an equatorial position for an observer.
pub fn altitude_degrees(position: &EquatorialPosition, observer: &ObserverLocation, jd: f64) -> f64 {
    let local_sidereal = greenwich_mean_sidereal_degrees(jd) + observer.longitude;
    let hour_angle = (local_sidereal - position.right_ascension_hours * 15.0).to_radians();
    let lat = observer.latitude.to_radians();
    let dec = position.declination.to_radians();
    let sin_alt = lat.sin() * dec.sin() + lat.cos() * dec.cos() * hour_angle.cos();
    sin_alt.clamp(-1.0, 1.0).asin().to_degrees()
}

/// First upward (`Rising`) or downward (`Setting`) zero crossing of `f` in
/// `[start, end]`, sampled every `step` and refined by bisection.
pub fn find_crossing<F>(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    step: Duration,
    direction: RiseSetDirection,
    mut f: F,
) -> Result<Option<DateTime<Utc>>, EphemerisError>
where
    F: FnMut(DateTime<Utc>) -> Result<f64, EphemerisError>,
{
    let before = |value: f64| match direction {
        RiseSetDirection::Rising => value < 0.0,
        RiseSetDirection::Setting => value > 0.0,
    };

    let mut prev_t = start;
    let mut prev = f(start)?;
    while prev_t < end {
        let t = (prev_t + step).min(end);
        let current = f(t)?;
        if before(prev) && !before(current) {
            let (mut lo, mut hi) = (prev_t, t);
            while (hi - lo).num_milliseconds() > REFINE_TOLERANCE_MILLIS {
                let mid = lo + (hi - lo) / 2;
                if before(f(mid)?) {
                    lo = mid;
                } else {
                    hi = mid;
                }
            }
            return Ok(Some(lo + (hi - lo) / 2));
        }
        prev_t = t;
        prev = current;
    }
    Ok(None)
}

fn window_end(start: DateTime<Utc>, window_days: f64) -> Option<DateTime<Utc>> {
    if !window_days.is_finite() || window_days <= 0.0 {
        return None;
    }
    let millis = (window_days * 86_400_000.0).round() as i64;
    start.checked_add_signed(Duration::milliseconds(millis))
}

/// Horizon crossing search used by the default `search_rise_set`.
pub fn rise_set<P>(
    provider: &P,
    body: CelestialBody,
    observer: &ObserverLocation,
    direction: RiseSetDirection,
    start: DateTime<Utc>,
    window_days: f64,
) -> Result<Option<DateTime<Utc>>, EphemerisError>
where
    P: EphemerisProvider + ?Sized,
{
    let Some(end) = window_end(start, window_days) else {
        return Ok(None);
    };
    let target = standard_altitude(body, observer.height_meters);
    find_crossing(
        start,
        end,
        Duration::minutes(HORIZON_SCAN_STEP_MINUTES),
        direction,
        |t| {
            let position = provider.equatorial_position(body, t)?;
            ensure_finite(position.right_ascension_hours, body, t)?;
            ensure_finite(position.declination, body, t)?;
            Ok(altitude_degrees(&position, observer, datetime_to_julian_day(t)) - target)
        },
    )
}

/// Next instant within `window_days` after `start` where the Moon-Sun
/// elongation equals `target` degrees.
pub fn moon_phase_instant<P>(
    provider: &P,
    target: f64,
    start: DateTime<Utc>,
    window_days: f64,
) -> Result<Option<DateTime<Utc>>, EphemerisError>
where
    P: EphemerisProvider + ?Sized,
{
    let Some(end) = window_end(start, window_days) else {
        return Ok(None);
    };
    // The wrapped offset only climbs through zero at the target itself; the
    // +180 -> -180 wrap half a month away is a downward jump and is skipped.
    find_crossing(
        start,
        end,
        Duration::hours(PHASE_SCAN_STEP_HOURS),
        RiseSetDirection::Rising,
        |t| Ok(wrapped_delta_degrees(target, provider.moon_elongation(t)?)),
    )
}

/// Next syzygy after `after` at which the Moon is close enough to the
/// ecliptic for an eclipse.
pub fn eclipse_peak<P>(
    provider: &P,
    syzygy: Syzygy,
    after: DateTime<Utc>,
) -> Result<DateTime<Utc>, EphemerisError>
where
    P: EphemerisProvider + ?Sized,
{
    let mut from = after;
    for _ in 0..MAX_ECLIPSE_LUNATIONS {
        let peak = moon_phase_instant(provider, syzygy.elongation(), from, 35.0)?.ok_or_else(|| {
            EphemerisError::EventNotFound {
                event: syzygy.eclipse_name().to_string(),
                start: from,
                window_days: 35.0,
            }
        })?;
        let moon = provider.ecliptic_position(CelestialBody::Moon, peak, true)?;
        if ensure_finite(moon.latitude, CelestialBody::Moon, peak)?.abs() <= syzygy.latitude_limit() {
            return Ok(peak);
        }
        from = peak + Duration::days(1);
    }
    Err(EphemerisError::EventNotFound {
        event: syzygy.eclipse_name().to_string(),
        start: after,
        window_days: MAX_ECLIPSE_LUNATIONS as f64 * 29.530588,
    })
}

/// Illuminated fraction from geocentric Moon and Sun positions (Meeus 48.2, 48.3).
pub fn illuminated_fraction(moon: &EclipticPosition, sun: &EclipticPosition) -> Option<f64> {
    if !(moon.distance_au > 0.0 && sun.distance_au > 0.0) {
        return None;
    }
    let beta = moon.latitude.to_radians();
    let dlon = (moon.longitude - sun.longitude).to_radians();
    let cos_psi = (beta.cos() * dlon.cos()).clamp(-1.0, 1.0);
    let sin_psi = (1.0 - cos_psi * cos_psi).sqrt();
    let phase_angle = (sun.distance_au * sin_psi).atan2(moon.distance_au - sun.distance_au * cos_psi);
    let fraction = (1.0 + phase_angle.cos()) / 2.0;
    fraction.is_finite().then(|| fraction.clamp(0.0, 1.0))
}
