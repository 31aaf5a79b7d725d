pub mod almanac;
pub mod angles;
pub mod body;
pub mod ephemeris;
pub mod error;
pub mod hours;
pub mod lunar;
pub mod motion;
pub mod snapshot;
pub mod source;
pub mod western;

pub use almanac::{parse_instant, Almanac, AlmanacSettings};
pub use body::CelestialBody;
pub use ephemeris::{EphemerisProvider, ObserverLocation, SwissEphemerisAdapter};
pub use error::AlmanacError;
pub use hours::{DayAnchors, HourSchedule, PlanetaryHourSlot};
pub use lunar::{LuckRating, MoonPhaseReading, MoonPhaseState};
pub use snapshot::{BodyReport, BodyStatus, DailySnapshot, Reading};
pub use source::{AlmanacSource, Source};
pub use western::ZodiacSign;
