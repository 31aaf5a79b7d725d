use crate::body::CelestialBody;
use crate::ephemeris::provider::{EphemerisError, EphemerisProvider};
use crate::ephemeris::time::datetime_to_julian_day;
use crate::ephemeris::types::{EclipticPosition, EquatorialPosition};
use chrono::{DateTime, Utc};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use swisseph::swe::calc_ut;

// Swiss Ephemeris calculation flags
const FLG_SWIEPH: i32 = 2;
const FLG_MOSEPH: i32 = 4;
const FLG_SPEED: i32 = 256;
const FLG_NOABERR: i32 = 1024;
const FLG_EQUATORIAL: i32 = 2048;

// The C library keeps its state in globals and is not reentrant.
lazy_static::lazy_static! {
    static ref SWE_LOCK: Mutex<()> = Mutex::new(());
}

/// Swiss Ephemeris planet number for a body.
fn swiss_body_id(body: CelestialBody) -> i32 {
    match body {
        CelestialBody::Sun => 0,
        CelestialBody::Moon => 1,
        CelestialBody::Mercury => 2,
        CelestialBody::Venus => 3,
        CelestialBody::Mars => 4,
        CelestialBody::Jupiter => 5,
        CelestialBody::Saturn => 6,
        CelestialBody::Uranus => 7,
        CelestialBody::Neptune => 8,
        CelestialBody::Pluto => 9,
    }
}

/// Ephemeris provider backed by the Swiss Ephemeris.
///
/// Without a data directory the built-in Moshier ephemeris is used, which
/// needs no files and is accurate to well under an arc-minute.
pub struct SwissEphemerisAdapter {
    ephemeris_path: Option<PathBuf>,
    base_flags: i32,
}

impl SwissEphemerisAdapter {
    /// Create a new adapter with optional ephemeris path.
    ///
    /// Falls back to `SWISS_EPHEMERIS_PATH` when no path is given. A path
    /// that is given but missing is an error rather than a silent fallback.
    pub fn new(ephemeris_path: Option<PathBuf>) -> Result<Self, EphemerisError> {
        let path = ephemeris_path.or_else(|| env::var("SWISS_EPHEMERIS_PATH").ok().map(PathBuf::from));

        let base_flags = match &path {
            Some(path) => {
                if !path.exists() {
                    return Err(EphemerisError::FileNotFound {
                        path: path.display().to_string(),
                        message: "Ephemeris path does not exist. Please ensure Swiss Ephemeris data files are installed.".to_string(),
                    });
                }
                log::debug!("Using Swiss Ephemeris data files from {}", path.display());
                // read by the C library when it first opens data files
                env::set_var("SE_EPHE_PATH", path);
                FLG_SWIEPH
            }
            None => {
                log::debug!("No ephemeris data path configured, using Moshier ephemeris");
                FLG_MOSEPH
            }
        };

        Ok(Self {
            ephemeris_path: path,
            base_flags: base_flags | FLG_SPEED,
        })
    }

    pub fn ephemeris_path(&self) -> Option<&Path> {
        self.ephemeris_path.as_deref()
    }

    /// Raw `calc_ut` output: [lon/ra, lat/dec, distance, speed...].
    fn calc(&self, body: CelestialBody, at: DateTime<Utc>, flags: i32) -> Result<[f64; 6], EphemerisError> {
        let jd = datetime_to_julian_day(at);
        let result = {
            let _guard = SWE_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            calc_ut(jd, swiss_body_id(body) as u32, flags as u32)
        }
        .map_err(|e| EphemerisError::CalculationFailed {
            body,
            datetime: at,
            message: format!("Swiss Ephemeris error: {}", e),
        })?;

        let out = result.out;
        let values = [out[0], out[1], out[2], out[3], out[4], out[5]];
        if let Some(bad) = values[..3].iter().find(|v| !v.is_finite()) {
            return Err(EphemerisError::CalculationFailed {
                body,
                datetime: at,
                message: format!("Swiss Ephemeris returned non-finite value {bad}"),
            });
        }
        Ok(values)
    }
}

impl EphemerisProvider for SwissEphemerisAdapter {
    fn ecliptic_position(
        &self,
        body: CelestialBody,
        at: DateTime<Utc>,
        aberration: bool,
    ) -> Result<EclipticPosition, EphemerisError> {
        let mut flags = self.base_flags;
        if !aberration {
            flags |= FLG_NOABERR;
        }
        let out = self.calc(body, at, flags)?;
        Ok(EclipticPosition {
            longitude: out[0] % 360.0,
            latitude: out[1],
            distance_au: out[2],
        })
    }

    fn equatorial_position(
        &self,
        body: CelestialBody,
        at: DateTime<Utc>,
    ) -> Result<EquatorialPosition, EphemerisError> {
        let out = self.calc(body, at, self.base_flags | FLG_EQUATORIAL)?;
        Ok(EquatorialPosition {
            right_ascension_hours: (out[0] % 360.0) / 15.0,
            declination: out[1],
            distance_au: out[2],
        })
    }
}
