use crate::angles::{normalize_degrees, normalize_hours};
use crate::body::CelestialBody;
use crate::ephemeris::search;
use crate::ephemeris::types::{
    EclipticPosition, EquatorialPosition, ObserverLocation, RiseSetDirection,
};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during ephemeris calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EphemerisError {
    #[error("Ephemeris file not found at path: {path}. {message}")]
    FileNotFound { path: String, message: String },
    #[error("Failed to calculate position for {body} at {datetime}: {message}")]
    CalculationFailed {
        body: CelestialBody,
        datetime: DateTime<Utc>,
        message: String,
    },
    #[error("No {event} found within {window_days} days after {start}")]
    EventNotFound {
        event: String,
        start: DateTime<Utc>,
        window_days: f64,
    },
}

/// Source of body positions and astronomical event searches.
///
/// Implementors supply the two position primitives; everything else has a
/// default built on top of them and may be overridden by providers with a
/// native routine (or a remote service) for it.
pub trait EphemerisProvider: Send + Sync {
    /// Geocentric ecliptic position of date, optionally corrected for aberration.
    fn ecliptic_position(
        &self,
        body: CelestialBody,
        at: DateTime<Utc>,
        aberration: bool,
    ) -> Result<EclipticPosition, EphemerisError>;

    /// Geocentric apparent equatorial position of date.
    fn equatorial_position(
        &self,
        body: CelestialBody,
        at: DateTime<Utc>,
    ) -> Result<EquatorialPosition, EphemerisError>;

    /// Ecliptic longitude in degrees, normalized to [0, 360).
    fn ecliptic_longitude(
        &self,
        body: CelestialBody,
        at: DateTime<Utc>,
        aberration: bool,
    ) -> Result<f64, EphemerisError> {
        let position = self.ecliptic_position(body, at, aberration)?;
        Ok(normalize_degrees(ensure_finite(position.longitude, body, at)?))
    }

    /// Right ascension in hours, normalized to [0, 24).
    fn right_ascension(&self, body: CelestialBody, at: DateTime<Utc>) -> Result<f64, EphemerisError> {
        let position = self.equatorial_position(body, at)?;
        Ok(normalize_hours(ensure_finite(position.right_ascension_hours, body, at)?))
    }

    /// Next rise or set of `body` within `window_days` of `start`.
    fn search_rise_set(
        &self,
        body: CelestialBody,
        observer: &ObserverLocation,
        direction: RiseSetDirection,
        start: DateTime<Utc>,
        window_days: f64,
    ) -> Result<Option<DateTime<Utc>>, EphemerisError> {
        search::rise_set(self, body, observer, direction, start, window_days)
    }

    /// Moon-Sun elongation in ecliptic longitude: 0 new, 90 first quarter,
    /// 180 full, 270 third quarter.
    fn moon_elongation(&self, at: DateTime<Utc>) -> Result<f64, EphemerisError> {
        let moon = self.ecliptic_longitude(CelestialBody::Moon, at, true)?;
        let sun = self.ecliptic_longitude(CelestialBody::Sun, at, true)?;
        Ok(normalize_degrees(moon - sun))
    }

    /// Illuminated fraction of the lunar disk in [0, 1].
    fn moon_illuminated_fraction(&self, at: DateTime<Utc>) -> Result<f64, EphemerisError> {
        let moon = self.ecliptic_position(CelestialBody::Moon, at, true)?;
        let sun = self.ecliptic_position(CelestialBody::Sun, at, true)?;
        search::illuminated_fraction(&moon, &sun).ok_or_else(|| EphemerisError::CalculationFailed {
            body: CelestialBody::Moon,
            datetime: at,
            message: "degenerate Sun/Moon geometry for illumination".to_string(),
        })
    }

    /// Peak of the next solar eclipse after `after`.
    fn search_solar_eclipse_peak(&self, after: DateTime<Utc>) -> Result<DateTime<Utc>, EphemerisError> {
        search::eclipse_peak(self, search::Syzygy::NewMoon, after)
    }

    /// Peak of the next lunar eclipse after `after`.
    fn search_lunar_eclipse_peak(&self, after: DateTime<Utc>) -> Result<DateTime<Utc>, EphemerisError> {
        search::eclipse_peak(self, search::Syzygy::FullMoon, after)
    }
}

/// Reject NaN and infinities coming out of a provider.
pub(crate) fn ensure_finite(
    value: f64,
    body: CelestialBody,
    at: DateTime<Utc>,
) -> Result<f64, EphemerisError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EphemerisError::CalculationFailed {
            body,
            datetime: at,
            message: format!("non-finite value {value}"),
        })
    }
}
