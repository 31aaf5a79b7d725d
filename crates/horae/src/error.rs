use crate::ephemeris::EphemerisError;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors surfaced by the almanac query surface.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlmanacError {
    /// Rejected before any ephemeris call: bad coordinates, instant or body name.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The ephemeris could not produce a value. Callers report "unknown".
    #[error("Computation unavailable: {0}")]
    ComputationUnavailable(String),
    /// Sunrise/sunset ordering is broken, e.g. polar day or night.
    #[error("Degenerate interval: sunrise {sunrise}, sunset {sunset}, next sunrise {next_sunrise}")]
    DegenerateInterval {
        sunrise: DateTime<Utc>,
        sunset: DateTime<Utc>,
        next_sunrise: DateTime<Utc>,
    },
    /// A newer snapshot request started before this one finished.
    #[error("Snapshot request superseded by a newer one")]
    Superseded,
}

impl From<EphemerisError> for AlmanacError {
    fn from(err: EphemerisError) -> Self {
        AlmanacError::ComputationUnavailable(err.to_string())
    }
}
