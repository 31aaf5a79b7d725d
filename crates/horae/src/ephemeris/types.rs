use crate::error::AlmanacError;
use serde::{Deserialize, Serialize};

/// Observer coordinates on the Earth's surface.
///
/// Fields are public for reading; values built by hand are re-checked with
/// [`ObserverLocation::validate`] before any ephemeris query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawObserverLocation")]
pub struct ObserverLocation {
    /// Geodetic latitude in degrees, north positive
    pub latitude: f64,
    /// Longitude in degrees, east positive
    pub longitude: f64,
    /// Height above sea level in meters
    #[serde(rename = "heightMeters")]
    pub height_meters: f64,
}

impl ObserverLocation {
    /// Validated constructor. Out-of-range or non-finite values are rejected.
    pub fn new(latitude: f64, longitude: f64, height_meters: f64) -> Result<Self, AlmanacError> {
        let location = Self {
            latitude,
            longitude,
            height_meters,
        };
        location.validate()?;
        Ok(location)
    }

    pub fn validate(&self) -> Result<(), AlmanacError> {
        let Self {
            latitude,
            longitude,
            height_meters,
        } = *self;
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(AlmanacError::InvalidInput(format!(
                "latitude must be within [-90, 90], got {latitude}"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(AlmanacError::InvalidInput(format!(
                "longitude must be within [-180, 180], got {longitude}"
            )));
        }
        if !height_meters.is_finite() || height_meters < 0.0 {
            return Err(AlmanacError::InvalidInput(format!(
                "height must be a non-negative number of meters, got {height_meters}"
            )));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct RawObserverLocation {
    latitude: f64,
    longitude: f64,
    #[serde(rename = "heightMeters")]
    height_meters: f64,
}

impl TryFrom<RawObserverLocation> for ObserverLocation {
    type Error = AlmanacError;

    fn try_from(raw: RawObserverLocation) -> Result<Self, Self::Error> {
        ObserverLocation::new(raw.latitude, raw.longitude, raw.height_meters)
    }
}

/// Geocentric ecliptic coordinates of a body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EclipticPosition {
    /// Longitude in degrees (0-360)
    pub longitude: f64,
    /// Latitude in degrees
    pub latitude: f64,
    /// Distance from the Earth in AU
    pub distance_au: f64,
}

/// Geocentric apparent equatorial coordinates of a body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquatorialPosition {
    /// Right ascension in hours (0-24)
    pub right_ascension_hours: f64,
    /// Declination in degrees
    pub declination: f64,
    /// Distance from the Earth in AU
    pub distance_au: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiseSetDirection {
    Rising,
    Setting,
}
