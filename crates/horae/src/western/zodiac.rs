//! Tropical zodiac signs.
//!
//! Each sign spans a fixed 30° of ecliptic longitude starting at Aries 0°.

use crate::angles::normalize_degrees;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SIGN_SPAN_DEGREES: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    /// Signs in ecliptic order.
    pub const ALL: [ZodiacSign; 12] = [
        ZodiacSign::Aries,
        ZodiacSign::Taurus,
        ZodiacSign::Gemini,
        ZodiacSign::Cancer,
        ZodiacSign::Leo,
        ZodiacSign::Virgo,
        ZodiacSign::Libra,
        ZodiacSign::Scorpio,
        ZodiacSign::Sagittarius,
        ZodiacSign::Capricorn,
        ZodiacSign::Aquarius,
        ZodiacSign::Pisces,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Aries",
            ZodiacSign::Taurus => "Taurus",
            ZodiacSign::Gemini => "Gemini",
            ZodiacSign::Cancer => "Cancer",
            ZodiacSign::Leo => "Leo",
            ZodiacSign::Virgo => "Virgo",
            ZodiacSign::Libra => "Libra",
            ZodiacSign::Scorpio => "Scorpio",
            ZodiacSign::Sagittarius => "Sagittarius",
            ZodiacSign::Capricorn => "Capricorn",
            ZodiacSign::Aquarius => "Aquarius",
            ZodiacSign::Pisces => "Pisces",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            ZodiacSign::Aries => "♈\u{fe0e}",
            ZodiacSign::Taurus => "♉\u{fe0e}",
            ZodiacSign::Gemini => "♊\u{fe0e}",
            ZodiacSign::Cancer => "♋\u{fe0e}",
            ZodiacSign::Leo => "♌\u{fe0e}",
            ZodiacSign::Virgo => "♍\u{fe0e}",
            ZodiacSign::Libra => "♎\u{fe0e}",
            ZodiacSign::Scorpio => "♏\u{fe0e}",
            ZodiacSign::Sagittarius => "♐\u{fe0e}",
            ZodiacSign::Capricorn => "♑\u{fe0e}",
            ZodiacSign::Aquarius => "♒\u{fe0e}",
            ZodiacSign::Pisces => "♓\u{fe0e}",
        }
    }

    /// Position in ecliptic order, 0 for Aries.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Get sign index (0-11) from longitude. Any real longitude is accepted.
pub fn get_sign_index(longitude: f64) -> usize {
    let normalized = normalize_degrees(longitude);
    // NaN casts to 0
    ((normalized / SIGN_SPAN_DEGREES).floor() as usize) % 12
}

/// Sign containing the given ecliptic longitude.
pub fn resolve(longitude: f64) -> ZodiacSign {
    ZodiacSign::ALL[get_sign_index(longitude)]
}
