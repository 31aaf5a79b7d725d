//! The bodies tracked by the almanac.
//!
//! Earth is deliberately absent: it is only ever an implicit observer
//! position inside the ephemeris provider.

use crate::error::AlmanacError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CelestialBody {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

/// Light and dark theme colors for a body row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorPair {
    pub light: &'static str,
    pub dark: &'static str,
}

impl CelestialBody {
    /// Display order used by the almanac table.
    pub const ALL: [CelestialBody; 10] = [
        CelestialBody::Sun,
        CelestialBody::Moon,
        CelestialBody::Mercury,
        CelestialBody::Venus,
        CelestialBody::Mars,
        CelestialBody::Jupiter,
        CelestialBody::Saturn,
        CelestialBody::Uranus,
        CelestialBody::Neptune,
        CelestialBody::Pluto,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CelestialBody::Sun => "Sol",
            CelestialBody::Moon => "Luna",
            CelestialBody::Mercury => "Mercury",
            CelestialBody::Venus => "Venus",
            CelestialBody::Mars => "Mars",
            CelestialBody::Jupiter => "Jupiter",
            CelestialBody::Saturn => "Saturn",
            CelestialBody::Uranus => "Uranus",
            CelestialBody::Neptune => "Neptune",
            CelestialBody::Pluto => "Pluto",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            CelestialBody::Sun => "☉",
            CelestialBody::Moon => "☽\u{fe0e}",
            CelestialBody::Mercury => "☿",
            CelestialBody::Venus => "♀",
            CelestialBody::Mars => "♂",
            CelestialBody::Jupiter => "♃",
            CelestialBody::Saturn => "♄",
            CelestialBody::Uranus => "♅",
            CelestialBody::Neptune => "♆",
            CelestialBody::Pluto => "♇",
        }
    }

    pub fn colors(self) -> ColorPair {
        let (light, dark) = match self {
            CelestialBody::Sun => ("#ffd071", "#ac7403"),
            CelestialBody::Moon => ("#d1d1d1", "#919191"),
            CelestialBody::Mercury => ("#fff59c", "#918308"),
            CelestialBody::Venus => ("#95f3ad", "#004812"),
            CelestialBody::Mars => ("#ffc5c5", "#7a0000"),
            CelestialBody::Jupiter => ("#9fdcff", "#00467f"),
            CelestialBody::Saturn => ("#a5a5a5", "#1d1d1d"),
            CelestialBody::Uranus => ("#c9bcff", "#250076"),
            CelestialBody::Neptune => ("#f9b6ff", "#7b0085"),
            CelestialBody::Pluto => ("#e5baa5", "#4f2916"),
        };
        ColorPair { light, dark }
    }

    /// Sun and Moon never show apparent retrograde motion.
    pub fn is_luminary(self) -> bool {
        matches!(self, CelestialBody::Sun | CelestialBody::Moon)
    }

    /// The seven bodies of the Chaldean hour sequence.
    pub fn is_classical(self) -> bool {
        !matches!(
            self,
            CelestialBody::Uranus | CelestialBody::Neptune | CelestialBody::Pluto
        )
    }
}

impl fmt::Display for CelestialBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Lowercase alias -> body. Both the traditional and the astronomical names
// of the luminaries are accepted.
lazy_static::lazy_static! {
    static ref BODY_NAMES: HashMap<&'static str, CelestialBody> = HashMap::from([
        ("sol", CelestialBody::Sun),
        ("sun", CelestialBody::Sun),
        ("luna", CelestialBody::Moon),
        ("moon", CelestialBody::Moon),
        ("mercury", CelestialBody::Mercury),
        ("venus", CelestialBody::Venus),
        ("mars", CelestialBody::Mars),
        ("jupiter", CelestialBody::Jupiter),
        ("saturn", CelestialBody::Saturn),
        ("uranus", CelestialBody::Uranus),
        ("neptune", CelestialBody::Neptune),
        ("pluto", CelestialBody::Pluto),
    ]);
}

impl FromStr for CelestialBody {
    type Err = AlmanacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BODY_NAMES
            .get(s.trim().to_lowercase().as_str())
            .copied()
            .ok_or_else(|| AlmanacError::InvalidInput(format!("unknown body name: {s:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("Sol".parse::<CelestialBody>().unwrap(), CelestialBody::Sun);
        assert_eq!("sun".parse::<CelestialBody>().unwrap(), CelestialBody::Sun);
        assert_eq!(" LUNA ".parse::<CelestialBody>().unwrap(), CelestialBody::Moon);
        assert_eq!("Pluto".parse::<CelestialBody>().unwrap(), CelestialBody::Pluto);
    }

    #[test]
    fn test_unknown_name_is_invalid_input() {
        let err = "Earth".parse::<CelestialBody>().unwrap_err();
        assert!(matches!(err, AlmanacError::InvalidInput(_)));
    }

    #[test]
    fn test_display_name_round_trips() {
        for body in CelestialBody::ALL {
            assert_eq!(body.name().parse::<CelestialBody>().unwrap(), body);
        }
    }

    #[test]
    fn test_classical_bodies() {
        let classical: Vec<_> = CelestialBody::ALL
            .into_iter()
            .filter(|b| b.is_classical())
            .collect();
        assert_eq!(classical.len(), 7);
        assert!(CelestialBody::Sun.is_luminary());
        assert!(!CelestialBody::Mars.is_luminary());
    }

    #[test]
    fn test_colors_are_hex_and_distinct() {
        let mut seen = Vec::new();
        for body in CelestialBody::ALL {
            let ColorPair { light, dark } = body.colors();
            for color in [light, dark] {
                assert_eq!(color.len(), 7, "{body}: {color}");
                assert!(color.starts_with('#'));
                assert!(u32::from_str_radix(&color[1..], 16).is_ok(), "{body}: {color}");
            }
            assert_ne!(light, dark);
            seen.push(light);
        }
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), CelestialBody::ALL.len());
    }
}
