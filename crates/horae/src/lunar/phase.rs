//! Moon phase classification.
//!
//! The primary classifier bands the illuminated fraction and uses the
//! elongation only to tell waxing from waning; it names exact new and full
//! moons correctly even when the elongation is a few degrees off. When the
//! fraction cannot be computed, the phase falls back to eight equal 45°
//! elongation bins.

use crate::angles::normalize_degrees;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const NEW_MOON_THRESHOLD: f64 = 0.03;
pub const FULL_MOON_THRESHOLD: f64 = 0.97;
pub const QUARTER_LOWER_THRESHOLD: f64 = 0.45;
pub const QUARTER_UPPER_THRESHOLD: f64 = 0.55;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoonPhaseState {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    ThirdQuarter,
    WaningCrescent,
}

impl MoonPhaseState {
    /// Phases in cycle order starting at new moon.
    pub const CYCLE: [MoonPhaseState; 8] = [
        MoonPhaseState::NewMoon,
        MoonPhaseState::WaxingCrescent,
        MoonPhaseState::FirstQuarter,
        MoonPhaseState::WaxingGibbous,
        MoonPhaseState::FullMoon,
        MoonPhaseState::WaningGibbous,
        MoonPhaseState::ThirdQuarter,
        MoonPhaseState::WaningCrescent,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MoonPhaseState::NewMoon => "New Moon",
            MoonPhaseState::WaxingCrescent => "Waxing Crescent",
            MoonPhaseState::FirstQuarter => "First Quarter",
            MoonPhaseState::WaxingGibbous => "Waxing Gibbous",
            MoonPhaseState::FullMoon => "Full Moon",
            MoonPhaseState::WaningGibbous => "Waning Gibbous",
            MoonPhaseState::ThirdQuarter => "Third Quarter",
            MoonPhaseState::WaningCrescent => "Waning Crescent",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            MoonPhaseState::NewMoon => "🌑\u{fe0e}",
            MoonPhaseState::WaxingCrescent => "🌒\u{fe0e}",
            MoonPhaseState::FirstQuarter => "🌓\u{fe0e}",
            MoonPhaseState::WaxingGibbous => "🌔\u{fe0e}",
            MoonPhaseState::FullMoon => "🌕\u{fe0e}",
            MoonPhaseState::WaningGibbous => "🌖\u{fe0e}",
            MoonPhaseState::ThirdQuarter => "🌗\u{fe0e}",
            MoonPhaseState::WaningCrescent => "🌘\u{fe0e}",
        }
    }
}

impl fmt::Display for MoonPhaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A classified phase together with the inputs it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoonPhaseReading {
    pub phase: MoonPhaseState,
    /// Moon-Sun elongation in degrees [0, 360)
    pub elongation: f64,
    /// Illuminated fraction; `None` when only the elongation was available
    #[serde(rename = "illuminatedFraction")]
    pub illuminated_fraction: Option<f64>,
}

impl MoonPhaseReading {
    /// Classify from whatever the ephemeris produced.
    pub fn from_measurements(elongation: f64, illuminated_fraction: Option<f64>) -> Self {
        let elongation = normalize_degrees(elongation);
        let phase = match illuminated_fraction {
            Some(fraction) => classify(elongation, fraction),
            None => classify_by_angle(elongation),
        };
        Self {
            phase,
            elongation,
            illuminated_fraction,
        }
    }
}

/// Fraction-banded classification; the elongation only decides waxing/waning.
pub fn classify(elongation: f64, illuminated_fraction: f64) -> MoonPhaseState {
    let waxing = normalize_degrees(elongation) <= 180.0;
    let fraction = if illuminated_fraction.is_nan() {
        0.0
    } else {
        illuminated_fraction.clamp(0.0, 1.0)
    };

    if fraction <= NEW_MOON_THRESHOLD {
        return MoonPhaseState::NewMoon;
    }
    if fraction >= FULL_MOON_THRESHOLD {
        return MoonPhaseState::FullMoon;
    }
    if (QUARTER_LOWER_THRESHOLD..=QUARTER_UPPER_THRESHOLD).contains(&fraction) {
        return if waxing {
            MoonPhaseState::FirstQuarter
        } else {
            MoonPhaseState::ThirdQuarter
        };
    }
    match (fraction > QUARTER_UPPER_THRESHOLD, waxing) {
        (true, true) => MoonPhaseState::WaxingGibbous,
        (true, false) => MoonPhaseState::WaningGibbous,
        (false, true) => MoonPhaseState::WaxingCrescent,
        (false, false) => MoonPhaseState::WaningCrescent,
    }
}

/// Eight equal bins centred on the principal phases.
pub fn classify_by_angle(elongation: f64) -> MoonPhaseState {
    let segment = (normalize_degrees(elongation) / 45.0).round() as usize % 8;
    MoonPhaseState::CYCLE[segment]
}
