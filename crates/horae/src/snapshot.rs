//! Read-only results composed for presentation.

use crate::body::CelestialBody;
use crate::ephemeris::ObserverLocation;
use crate::error::AlmanacError;
use crate::hours::{HourSchedule, PlanetaryHourSlot};
use crate::lunar::{LuckRating, MoonPhaseReading, MoonPhaseState};
use crate::western::ZodiacSign;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A value that may be unknown. Unavailable values are reported as such and
/// never replaced by a plausible-looking default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum Reading<T> {
    Available(T),
    Unavailable { reason: String },
}

impl<T> Reading<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Reading::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Reading::Available(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Reading::Available(value) => Some(value),
            Reading::Unavailable { .. } => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Reading::Available(value) => Some(value),
            Reading::Unavailable { .. } => None,
        }
    }
}

impl<T> From<Result<T, AlmanacError>> for Reading<T> {
    fn from(result: Result<T, AlmanacError>) -> Self {
        match result {
            Ok(value) => Reading::Available(value),
            Err(err) => Reading::unavailable(err.to_string()),
        }
    }
}

/// The status cell of a body row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BodyStatus {
    Phase { phase: MoonPhaseState },
    SolarEclipse,
    LunarEclipse,
    Retrograde,
}

impl BodyStatus {
    pub fn label(&self) -> String {
        match self {
            BodyStatus::Phase { phase } => format!("{} {}", phase.name(), phase.glyph()),
            BodyStatus::SolarEclipse => "Solar Eclipse".to_string(),
            BodyStatus::LunarEclipse => "Lunar Eclipse".to_string(),
            BodyStatus::Retrograde => "℞ Retrograde".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyReport {
    pub body: CelestialBody,
    pub zodiac: Reading<ZodiacSign>,
    pub retrograde: Reading<bool>,
    /// `Available(None)` when there is nothing to report
    pub status: Reading<Option<BodyStatus>>,
}

impl BodyReport {
    /// A row where nothing could be computed.
    pub fn unavailable(body: CelestialBody, reason: &str) -> Self {
        Self {
            body,
            zodiac: Reading::unavailable(reason),
            retrograde: Reading::unavailable(reason),
            status: Reading::unavailable(reason),
        }
    }
}

/// Everything the almanac shows for one instant and place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySnapshot {
    pub instant: DateTime<Utc>,
    pub location: ObserverLocation,
    /// One row per body in display order
    pub bodies: Vec<BodyReport>,
    #[serde(rename = "moonPhase")]
    pub moon_phase: Reading<MoonPhaseReading>,
    /// Empty schedule when the day has no valid sunrise/sunset anchors
    pub hours: Reading<HourSchedule>,
    #[serde(rename = "currentHour")]
    pub current_hour: Option<PlanetaryHourSlot>,
    #[serde(rename = "showNight")]
    pub show_night: bool,
    pub luck: Reading<LuckRating>,
}

impl DailySnapshot {
    pub fn body(&self, body: CelestialBody) -> Option<&BodyReport> {
        self.bodies.iter().find(|report| report.body == body)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
