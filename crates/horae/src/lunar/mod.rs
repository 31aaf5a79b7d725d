pub mod luck;
pub mod phase;

pub use luck::{cycle_day, LuckRating};
pub use phase::{MoonPhaseReading, MoonPhaseState};
