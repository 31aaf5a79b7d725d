//! Resolution of the sunrise / sunset / next-sunrise triple for the
//! planetary day containing an instant.

use crate::body::CelestialBody;
use crate::ephemeris::{EphemerisError, EphemerisProvider, ObserverLocation, RiseSetDirection};
use crate::hours::scheduler::DayAnchors;
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone, Utc};

/// Sunset is searched from this long after sunrise.
pub const SUNSET_SEARCH_DELAY_HOURS: i64 = 1;
/// The next sunrise is searched from this long after sunrise, safely past
/// the sunset of even the longest non-polar day's evening.
pub const NEXT_SUNRISE_SEARCH_DELAY_HOURS: i64 = 18;
const SEARCH_WINDOW_DAYS: f64 = 1.0;

fn local_midnight(date: NaiveDate, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(0, 0, 0)?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Anchors starting at the first sunrise of the local calendar `date`.
///
/// `Ok(None)` when any of the three events does not occur within its search
/// window, which is what polar day and polar night look like.
pub fn anchors_for_date<P>(
    provider: &P,
    observer: &ObserverLocation,
    date: NaiveDate,
    offset: FixedOffset,
) -> Result<Option<DayAnchors>, EphemerisError>
where
    P: EphemerisProvider + ?Sized,
{
    let Some(midnight) = local_midnight(date, offset) else {
        return Ok(None);
    };
    let sun = CelestialBody::Sun;

    let Some(sunrise) =
        provider.search_rise_set(sun, observer, RiseSetDirection::Rising, midnight, SEARCH_WINDOW_DAYS)?
    else {
        log::debug!("No sunrise on {} at {:?}", date, observer);
        return Ok(None);
    };
    let Some(sunset) = provider.search_rise_set(
        sun,
        observer,
        RiseSetDirection::Setting,
        sunrise + Duration::hours(SUNSET_SEARCH_DELAY_HOURS),
        SEARCH_WINDOW_DAYS,
    )?
    else {
        log::debug!("No sunset after {} at {:?}", sunrise, observer);
        return Ok(None);
    };
    let Some(next_sunrise) = provider.search_rise_set(
        sun,
        observer,
        RiseSetDirection::Rising,
        sunrise + Duration::hours(NEXT_SUNRISE_SEARCH_DELAY_HOURS),
        SEARCH_WINDOW_DAYS,
    )?
    else {
        log::debug!("No sunrise following {} at {:?}", sunrise, observer);
        return Ok(None);
    };

    Ok(Some(DayAnchors {
        sunrise,
        sunset,
        next_sunrise,
        weekday: sunrise.with_timezone(&offset).weekday(),
    }))
}

/// Anchors of the planetary day containing `instant`.
///
/// A planetary day runs from sunrise to sunrise, so an instant before the
/// local date's sunrise belongs to the previous date's day.
pub fn resolve_day_anchors<P>(
    provider: &P,
    instant: DateTime<Utc>,
    observer: &ObserverLocation,
    offset: FixedOffset,
) -> Result<Option<DayAnchors>, EphemerisError>
where
    P: EphemerisProvider + ?Sized,
{
    let today = instant.with_timezone(&offset).date_naive();
    let anchors = anchors_for_date(provider, observer, today, offset)?;

    match anchors {
        Some(current) if instant < current.sunrise => {
            let Some(yesterday) = today.pred_opt() else {
                return Ok(Some(current));
            };
            let previous = anchors_for_date(provider, observer, yesterday, offset)?;
            log::debug!("{} is before sunrise, using anchors of {}", instant, yesterday);
            Ok(previous.or(Some(current)))
        }
        other => Ok(other),
    }
}
