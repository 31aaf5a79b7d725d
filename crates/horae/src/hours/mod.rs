pub mod anchors;
pub mod scheduler;

pub use anchors::{anchors_for_date, resolve_day_anchors};
pub use scheduler::{
    current_slot, day_ruler, schedule, DayAnchors, HourSchedule, PlanetaryHourSlot, CHALDEAN_ORDER,
};
