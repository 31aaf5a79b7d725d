#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use horae::body::CelestialBody;
use horae::ephemeris::search;
use horae::ephemeris::{
    EclipticPosition, EphemerisError, EphemerisProvider, EquatorialPosition, ObserverLocation,
    RiseSetDirection,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

pub const SUN_LONGITUDE_AT_EPOCH: f64 = 71.0;
pub const SUN_RATE: f64 = 0.9856;
pub const MOON_RATE: f64 = 13.1764;
pub const MOON_DISTANCE_AU: f64 = 0.00257;

/// A Sunday, 00:00 UTC.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap()
}

pub fn at(hour: u32) -> DateTime<Utc> {
    epoch() + Duration::hours(hour as i64)
}

pub fn chicago() -> ObserverLocation {
    ObserverLocation::new(41.8781, -87.6298, 180.0).unwrap()
}

/// Deterministic provider: every body moves linearly in longitude from the
/// epoch, the Sun rises at 06:00 UTC and sets at 18:00 UTC every day.
pub struct MockEphemeris {
    motion: HashMap<CelestialBody, (f64, f64)>,
    polar: bool,
    moon_distance: f64,
    solar_eclipse: Option<DateTime<Utc>>,
    lunar_eclipse: Option<DateTime<Utc>>,
    failing: HashSet<CelestialBody>,
    elongation_override: Option<f64>,
    fraction_override: Option<f64>,
    pub delay_millis: AtomicU64,
    pub position_calls: AtomicUsize,
    pub rise_set_calls: AtomicUsize,
}

impl MockEphemeris {
    /// Moon 90 degrees ahead of the Sun at the epoch; Mercury retrograde.
    pub fn new() -> Self {
        let motion = HashMap::from([
            (CelestialBody::Sun, (SUN_LONGITUDE_AT_EPOCH, SUN_RATE)),
            (CelestialBody::Moon, (SUN_LONGITUDE_AT_EPOCH + 90.0, MOON_RATE)),
            (CelestialBody::Mercury, (62.0, -0.6)),
            (CelestialBody::Venus, (75.0, 1.2)),
            (CelestialBody::Mars, (10.0, 0.7)),
            (CelestialBody::Jupiter, (58.0, 0.23)),
            (CelestialBody::Saturn, (349.0, 0.05)),
            // crossing 0 degrees forward
            (CelestialBody::Uranus, (359.99, 0.04)),
            (CelestialBody::Neptune, (359.5, -0.01)),
            (CelestialBody::Pluto, (301.8, -0.01)),
        ]);
        Self {
            motion,
            polar: false,
            moon_distance: MOON_DISTANCE_AU,
            solar_eclipse: None,
            lunar_eclipse: None,
            failing: HashSet::new(),
            elongation_override: None,
            fraction_override: None,
            delay_millis: AtomicU64::new(0),
            position_calls: AtomicUsize::new(0),
            rise_set_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_elongation(mut self, elongation: f64) -> Self {
        self.motion
            .insert(CelestialBody::Moon, (SUN_LONGITUDE_AT_EPOCH + elongation, MOON_RATE));
        self
    }

    pub fn with_motion(mut self, body: CelestialBody, longitude: f64, rate: f64) -> Self {
        self.motion.insert(body, (longitude, rate));
        self
    }

    /// No sunrise or sunset, as in polar day.
    pub fn polar(mut self) -> Self {
        self.polar = true;
        self
    }

    /// Zero Moon distance, which makes the illuminated fraction uncomputable.
    pub fn without_moon_distance(mut self) -> Self {
        self.moon_distance = 0.0;
        self
    }

    pub fn with_solar_eclipse(mut self, peak: DateTime<Utc>) -> Self {
        self.solar_eclipse = Some(peak);
        self
    }

    pub fn with_lunar_eclipse(mut self, peak: DateTime<Utc>) -> Self {
        self.lunar_eclipse = Some(peak);
        self
    }

    pub fn failing(mut self, body: CelestialBody) -> Self {
        self.failing.insert(body);
        self
    }

    /// Report this elongation regardless of the positions.
    pub fn with_reported_elongation(mut self, elongation: f64) -> Self {
        self.elongation_override = Some(elongation);
        self
    }

    /// Report this illuminated fraction regardless of the positions.
    pub fn with_reported_fraction(mut self, fraction: f64) -> Self {
        self.fraction_override = Some(fraction);
        self
    }

    pub fn with_delay_millis(self, millis: u64) -> Self {
        self.delay_millis.store(millis, Ordering::SeqCst);
        self
    }

    fn longitude(&self, body: CelestialBody, t: DateTime<Utc>) -> f64 {
        let (base, rate) = self.motion[&body];
        let days = (t - epoch()).num_milliseconds() as f64 / 86_400_000.0;
        (base + rate * days).rem_euclid(360.0)
    }

    fn next_at_hour(start: DateTime<Utc>, hour: u32) -> DateTime<Utc> {
        let candidate = Utc
            .from_utc_datetime(&start.date_naive().and_hms_opt(hour, 0, 0).unwrap());
        if candidate < start {
            candidate + Duration::days(1)
        } else {
            candidate
        }
    }

    fn next_eclipse(configured: Option<DateTime<Utc>>, after: DateTime<Utc>) -> DateTime<Utc> {
        match configured {
            Some(peak) if peak >= after => peak,
            _ => after + Duration::days(100),
        }
    }
}

impl EphemerisProvider for MockEphemeris {
    fn ecliptic_position(
        &self,
        body: CelestialBody,
        at: DateTime<Utc>,
        _aberration: bool,
    ) -> Result<EclipticPosition, EphemerisError> {
        self.position_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delay_millis.load(Ordering::SeqCst);
        if delay > 0 {
            std::thread::sleep(std::time::Duration::from_millis(delay));
        }
        if self.failing.contains(&body) {
            return Err(EphemerisError::CalculationFailed {
                body,
                datetime: at,
                message: "outside ephemeris range".to_string(),
            });
        }
        let distance_au = match body {
            CelestialBody::Moon => self.moon_distance,
            _ => 1.0,
        };
        Ok(EclipticPosition {
            longitude: self.longitude(body, at),
            latitude: 0.0,
            distance_au,
        })
    }

    fn equatorial_position(
        &self,
        body: CelestialBody,
        at: DateTime<Utc>,
    ) -> Result<EquatorialPosition, EphemerisError> {
        let ecliptic = self.ecliptic_position(body, at, true)?;
        Ok(EquatorialPosition {
            right_ascension_hours: ecliptic.longitude / 15.0,
            declination: 0.0,
            distance_au: ecliptic.distance_au,
        })
    }

    fn search_rise_set(
        &self,
        _body: CelestialBody,
        _observer: &ObserverLocation,
        direction: RiseSetDirection,
        start: DateTime<Utc>,
        window_days: f64,
    ) -> Result<Option<DateTime<Utc>>, EphemerisError> {
        self.rise_set_calls.fetch_add(1, Ordering::SeqCst);
        if self.polar {
            return Ok(None);
        }
        let event = match direction {
            RiseSetDirection::Rising => Self::next_at_hour(start, 6),
            RiseSetDirection::Setting => Self::next_at_hour(start, 18),
        };
        let window = Duration::milliseconds((window_days * 86_400_000.0) as i64);
        Ok((event <= start + window).then_some(event))
    }

    fn moon_elongation(&self, at: DateTime<Utc>) -> Result<f64, EphemerisError> {
        if let Some(elongation) = self.elongation_override {
            return Ok(elongation);
        }
        let moon = self.ecliptic_position(CelestialBody::Moon, at, true)?;
        let sun = self.ecliptic_position(CelestialBody::Sun, at, true)?;
        Ok((moon.longitude - sun.longitude).rem_euclid(360.0))
    }

    fn moon_illuminated_fraction(&self, at: DateTime<Utc>) -> Result<f64, EphemerisError> {
        if let Some(fraction) = self.fraction_override {
            return Ok(fraction);
        }
        let moon = self.ecliptic_position(CelestialBody::Moon, at, true)?;
        let sun = self.ecliptic_position(CelestialBody::Sun, at, true)?;
        search::illuminated_fraction(&moon, &sun).ok_or_else(|| EphemerisError::CalculationFailed {
            body: CelestialBody::Moon,
            datetime: at,
            message: "degenerate geometry".to_string(),
        })
    }

    fn search_solar_eclipse_peak(&self, after: DateTime<Utc>) -> Result<DateTime<Utc>, EphemerisError> {
        Ok(Self::next_eclipse(self.solar_eclipse, after))
    }

    fn search_lunar_eclipse_peak(&self, after: DateTime<Utc>) -> Result<DateTime<Utc>, EphemerisError> {
        Ok(Self::next_eclipse(self.lunar_eclipse, after))
    }
}
