//! Unequal planetary hours.
//!
//! The daylight span [sunrise, sunset) and the night span [sunset,
//! next sunrise) are each cut into twelve equal hours. Hour 1 belongs to the
//! ruler of the weekday and the rulers then follow the Chaldean order,
//! carrying on from day into night.

use crate::body::CelestialBody;
use crate::error::AlmanacError;
use chrono::{DateTime, Duration, Utc, Weekday};
use serde::{Deserialize, Serialize};

pub const HOURS_PER_HALF_DAY: usize = 12;
pub const HOURS_PER_DAY: usize = 24;

/// Descending orbital period order of the classical bodies.
pub const CHALDEAN_ORDER: [CelestialBody; 7] = [
    CelestialBody::Saturn,
    CelestialBody::Jupiter,
    CelestialBody::Mars,
    CelestialBody::Sun,
    CelestialBody::Venus,
    CelestialBody::Mercury,
    CelestialBody::Moon,
];

/// Ruling body of a weekday, which also rules its first hour.
pub fn day_ruler(weekday: Weekday) -> CelestialBody {
    match weekday {
        Weekday::Sun => CelestialBody::Sun,
        Weekday::Mon => CelestialBody::Moon,
        Weekday::Tue => CelestialBody::Mars,
        Weekday::Wed => CelestialBody::Mercury,
        Weekday::Thu => CelestialBody::Jupiter,
        Weekday::Fri => CelestialBody::Venus,
        Weekday::Sat => CelestialBody::Saturn,
    }
}

/// Position of the weekday's ruler in the Chaldean order.
pub fn chaldean_start_index(weekday: Weekday) -> usize {
    let ruler = day_ruler(weekday);
    // Every weekday ruler is one of the seven
    CHALDEAN_ORDER.iter().position(|b| *b == ruler).unwrap_or(0)
}

/// Ruler of the zero-based hour `offset` counted from sunrise.
pub fn hour_ruler(weekday: Weekday, offset: usize) -> CelestialBody {
    CHALDEAN_ORDER[(chaldean_start_index(weekday) + offset) % CHALDEAN_ORDER.len()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanetaryHourSlot {
    /// 1-12 for day hours, 13-24 for night hours
    pub index: u8,
    pub body: CelestialBody,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl PlanetaryHourSlot {
    pub fn is_night(&self) -> bool {
        self.index as usize > HOURS_PER_HALF_DAY
    }

    /// Half-open containment: `start <= instant < end`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// The three horizon events that bound one planetary day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAnchors {
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    #[serde(rename = "nextSunrise")]
    pub next_sunrise: DateTime<Utc>,
    /// Local weekday of the sunrise
    pub weekday: Weekday,
}

impl DayAnchors {
    /// Require sunrise < sunset < next sunrise.
    pub fn validate(&self) -> Result<(), AlmanacError> {
        if self.sunset <= self.sunrise || self.next_sunrise <= self.sunset {
            return Err(AlmanacError::DegenerateInterval {
                sunrise: self.sunrise,
                sunset: self.sunset,
                next_sunrise: self.next_sunrise,
            });
        }
        Ok(())
    }
}

/// Boundary `k` of twelve equal parts of `span` starting at `anchor`.
/// Computed from the whole span each time so part twelve ends exactly at
/// `anchor + span` with no accumulated rounding.
fn split_point(anchor: DateTime<Utc>, span: Duration, k: usize) -> DateTime<Utc> {
    match span.num_nanoseconds() {
        Some(nanos) => {
            let offset = (nanos as i128 * k as i128) / HOURS_PER_HALF_DAY as i128;
            anchor + Duration::nanoseconds(offset as i64)
        }
        None => anchor + (span / HOURS_PER_HALF_DAY as i32) * k as i32,
    }
}

/// All 24 hours of the planetary day, or none when the anchors are
/// degenerate (polar day or night, or inconsistent searches).
pub fn schedule(anchors: &DayAnchors) -> Vec<PlanetaryHourSlot> {
    if let Err(err) = anchors.validate() {
        log::warn!("No planetary hours: {}", err);
        return Vec::new();
    }

    let day_span = anchors.sunset - anchors.sunrise;
    let night_span = anchors.next_sunrise - anchors.sunset;

    let mut slots = Vec::with_capacity(HOURS_PER_DAY);
    for (base, anchor, span) in [
        (0, anchors.sunrise, day_span),
        (HOURS_PER_HALF_DAY, anchors.sunset, night_span),
    ] {
        for i in 0..HOURS_PER_HALF_DAY {
            slots.push(PlanetaryHourSlot {
                index: (base + i + 1) as u8,
                body: hour_ruler(anchors.weekday, base + i),
                start: split_point(anchor, span, i),
                end: split_point(anchor, span, i + 1),
            });
        }
    }
    slots
}

/// The slot containing `instant`, if any.
pub fn current_slot(slots: &[PlanetaryHourSlot], instant: DateTime<Utc>) -> Option<&PlanetaryHourSlot> {
    // Slots are sorted and contiguous: find the first one ending after the instant.
    let idx = slots.partition_point(|slot| slot.end <= instant);
    slots.get(idx).filter(|slot| slot.contains(instant))
}

/// A planetary day: the anchors it was derived from and its hours.
///
/// Replaced as a whole when the anchors go stale; never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourSchedule {
    pub anchors: Option<DayAnchors>,
    pub slots: Vec<PlanetaryHourSlot>,
}

impl HourSchedule {
    pub fn from_anchors(anchors: Option<DayAnchors>) -> Self {
        let slots = anchors.as_ref().map(schedule).unwrap_or_default();
        Self { anchors, slots }
    }

    pub fn empty() -> Self {
        Self {
            anchors: None,
            slots: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn current_slot(&self, instant: DateTime<Utc>) -> Option<&PlanetaryHourSlot> {
        current_slot(&self.slots, instant)
    }

    /// Whether the night half (hours 13-24) should be shown at `instant`.
    pub fn show_night(&self, instant: DateTime<Utc>) -> bool {
        match self.current_slot(instant) {
            Some(slot) => slot.is_night(),
            None => self
                .slots
                .get(HOURS_PER_HALF_DAY)
                .map(|first_night| instant >= first_night.start)
                .unwrap_or(false),
        }
    }

    /// True once `instant` reaches the next sunrise; the caller must then
    /// resolve new anchors.
    pub fn is_stale(&self, instant: DateTime<Utc>) -> bool {
        self.anchors
            .map(|anchors| instant >= anchors.next_sunrise)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn anchors(weekday: Weekday) -> DayAnchors {
        let sunrise = Utc.with_ymd_and_hms(2024, 6, 2, 6, 0, 0).unwrap();
        DayAnchors {
            sunrise,
            sunset: sunrise + Duration::hours(12),
            next_sunrise: sunrise + Duration::hours(24),
            weekday,
        }
    }

    #[test]
    fn test_day_rulers() {
        assert_eq!(day_ruler(Weekday::Sun), CelestialBody::Sun);
        assert_eq!(day_ruler(Weekday::Sat), CelestialBody::Saturn);
        assert_eq!(chaldean_start_index(Weekday::Sun), 3);
        assert_eq!(chaldean_start_index(Weekday::Sat), 0);
    }

    #[test]
    fn test_hour_one_is_day_ruler_every_weekday() {
        for weekday in [
            Weekday::Sun,
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
        ] {
            let slots = schedule(&anchors(weekday));
            assert_eq!(slots[0].body, day_ruler(weekday));
            // the hour after the last night hour rules the next day
            assert_eq!(hour_ruler(weekday, 24), day_ruler(weekday.succ()));
        }
    }

    #[test]
    fn test_sunday_scenario() {
        let a = anchors(Weekday::Sun);
        let slots = schedule(&a);
        assert_eq!(slots.len(), 24);

        assert_eq!(slots[0].index, 1);
        assert_eq!(slots[0].body, CelestialBody::Sun);
        assert_eq!(slots[0].start, a.sunrise);
        assert_eq!(slots[0].end, a.sunrise + Duration::hours(1));

        assert_eq!(slots[1].body, CelestialBody::Venus);
        assert_eq!(slots[1].start, a.sunrise + Duration::hours(1));

        assert_eq!(slots[12].index, 13);
        assert_eq!(slots[12].body, CelestialBody::Jupiter);
        assert_eq!(slots[12].start, a.sunset);
        assert_eq!(slots[12].end, a.sunset + Duration::hours(1));
    }

    #[test]
    fn test_degenerate_anchors_give_no_hours() {
        let mut a = anchors(Weekday::Mon);
        a.sunset = a.sunrise;
        assert!(schedule(&a).is_empty());
        assert!(matches!(a.validate(), Err(AlmanacError::DegenerateInterval { .. })));

        let mut b = anchors(Weekday::Mon);
        b.next_sunrise = b.sunset - Duration::minutes(1);
        assert!(schedule(&b).is_empty());
    }

    #[test]
    fn test_split_point_exact_for_odd_spans() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 7, 13, 0).unwrap();
        let span = Duration::milliseconds(34_567_891);
        assert_eq!(split_point(start, span, 12), start + span);
        assert_eq!(split_point(start, span, 0), start);
    }

    #[test]
    fn test_current_slot_boundaries() {
        let a = anchors(Weekday::Sun);
        let schedule = HourSchedule::from_anchors(Some(a));

        assert_eq!(schedule.current_slot(a.sunrise).unwrap().index, 1);
        assert_eq!(schedule.current_slot(a.sunset).unwrap().index, 13);
        assert_eq!(
            schedule
                .current_slot(a.next_sunrise - Duration::nanoseconds(1))
                .unwrap()
                .index,
            24
        );
        assert!(schedule.current_slot(a.next_sunrise).is_none());
        assert!(schedule.current_slot(a.sunrise - Duration::seconds(1)).is_none());
    }

    #[test]
    fn test_show_night() {
        let a = anchors(Weekday::Sun);
        let schedule = HourSchedule::from_anchors(Some(a));
        assert!(!schedule.show_night(a.sunrise + Duration::hours(3)));
        assert!(schedule.show_night(a.sunset + Duration::hours(3)));
        // past the end of the day: falls back to comparing with sunset
        assert!(schedule.show_night(a.next_sunrise));
        assert!(!schedule.show_night(a.sunrise - Duration::hours(1)));
        assert!(!HourSchedule::empty().show_night(a.sunset));
    }

    #[test]
    fn test_staleness() {
        let a = anchors(Weekday::Sun);
        let schedule = HourSchedule::from_anchors(Some(a));
        assert!(!schedule.is_stale(a.next_sunrise - Duration::seconds(1)));
        assert!(schedule.is_stale(a.next_sunrise));
        assert!(!HourSchedule::empty().is_stale(a.next_sunrise));
    }

    fn uneven_anchors(weekday: Weekday) -> DayAnchors {
        let sunrise = Utc.with_ymd_and_hms(2024, 6, 2, 10, 17, 3).unwrap() + Duration::nanoseconds(123_456_789);
        DayAnchors {
            sunrise,
            sunset: sunrise + Duration::seconds(15 * 3600 + 731) + Duration::nanoseconds(987_654_321),
            next_sunrise: sunrise + Duration::seconds(24 * 3600 + 17) + Duration::nanoseconds(3),
            weekday,
        }
    }

    #[test]
    fn test_uneven_spans_partition_exactly() {
        let a = uneven_anchors(Weekday::Wed);
        let slots = schedule(&a);
        assert_eq!(slots.len(), HOURS_PER_DAY);

        assert_eq!(slots[0].start, a.sunrise);
        assert_eq!(slots[11].end, a.sunset);
        assert_eq!(slots[12].start, a.sunset);
        assert_eq!(slots[23].end, a.next_sunrise);
        for pair in slots.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }

        let total = slots
            .iter()
            .fold(Duration::zero(), |acc, slot| acc + slot.duration());
        assert_eq!(total, a.next_sunrise - a.sunrise);

        // equal parts within rounding, and night hours shorter than day hours here
        let day_hour = slots[0].duration();
        for slot in &slots[..12] {
            assert!((slot.duration() - day_hour).num_nanoseconds().unwrap().abs() <= 1);
        }
        assert!(slots[12].duration() < day_hour);
    }

    #[test]
    fn test_rulers_repeat_every_seven_hours() {
        for weekday in [Weekday::Sun, Weekday::Wed, Weekday::Sat] {
            let slots = schedule(&uneven_anchors(weekday));
            for i in 0..HOURS_PER_DAY - CHALDEAN_ORDER.len() {
                assert_eq!(slots[i].body, slots[i + CHALDEAN_ORDER.len()].body, "{weekday} hour {}", i + 1);
            }
            // across the day/night seam
            assert_eq!(slots[12].body, hour_ruler(weekday, 12));
            assert_eq!(slots[12].body, slots[5].body);
        }
    }
}
