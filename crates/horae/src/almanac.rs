//! The query surface and the snapshot aggregator.

use crate::body::CelestialBody;
use crate::ephemeris::{EphemerisProvider, ObserverLocation};
use crate::error::AlmanacError;
use crate::hours::{resolve_day_anchors, DayAnchors, HourSchedule, PlanetaryHourSlot};
use crate::lunar::{luck, LuckRating, MoonPhaseReading};
use crate::motion;
use crate::snapshot::{BodyReport, BodyStatus, DailySnapshot, Reading};
use crate::western::{self, ZodiacSign};
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinSet;

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlmanacSettings {
    /// Offset used for local calendar dates and weekdays
    pub utc_offset: FixedOffset,
    /// Upper bound on each ephemeris task of a snapshot
    pub call_timeout: Duration,
}

impl Default for AlmanacSettings {
    fn default() -> Self {
        Self {
            utc_offset: Utc.fix(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

/// Parse an RFC 3339 timestamp.
pub fn parse_instant(text: &str) -> Result<DateTime<Utc>, AlmanacError> {
    DateTime::parse_from_rfc3339(text.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AlmanacError::InvalidInput(format!("unparseable instant {text:?}: {e}")))
}

/// Stateless almanac over an ephemeris provider.
///
/// Every query takes the instant (and location where needed) explicitly.
/// Cloning is cheap and clones share the snapshot generation counter, so a
/// snapshot started from any clone supersedes older ones.
#[derive(Clone)]
pub struct Almanac {
    provider: Arc<dyn EphemerisProvider>,
    settings: AlmanacSettings,
    generation: Arc<watch::Sender<u64>>,
}

enum Part {
    Body(usize, BodyReport),
    Moon(Reading<MoonPhaseReading>),
    Luck(Reading<LuckRating>),
    Hours(Reading<HourSchedule>),
}

/// Run blocking ephemeris work off the async runtime with a deadline.
async fn run_bounded<T, F>(timeout: Duration, work: F) -> Result<T, AlmanacError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AlmanacError> + Send + 'static,
{
    match tokio::time::timeout(timeout, tokio::task::spawn_blocking(work)).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(AlmanacError::ComputationUnavailable(format!(
            "ephemeris task failed: {join_err}"
        ))),
        Err(_) => Err(AlmanacError::ComputationUnavailable(format!(
            "ephemeris call timed out after {timeout:?}"
        ))),
    }
}

impl Almanac {
    pub fn new(provider: Arc<dyn EphemerisProvider>, settings: AlmanacSettings) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            provider,
            settings,
            generation: Arc::new(generation),
        }
    }

    pub fn settings(&self) -> &AlmanacSettings {
        &self.settings
    }

    pub fn provider(&self) -> &dyn EphemerisProvider {
        self.provider.as_ref()
    }

    /// Local calendar date of an instant.
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.settings.utc_offset).date_naive()
    }

    pub fn zodiac(&self, body: CelestialBody, at: DateTime<Utc>) -> Result<ZodiacSign, AlmanacError> {
        let longitude = self.provider.ecliptic_longitude(body, at, true)?;
        Ok(western::resolve(longitude))
    }

    /// An error means the status is unknown, not that the body is direct.
    pub fn retrograde_status(&self, body: CelestialBody, at: DateTime<Utc>) -> Result<bool, AlmanacError> {
        Ok(motion::is_retrograde(self.provider.as_ref(), body, at)?)
    }

    /// Phase from elongation and illumination. A failed illumination lookup
    /// degrades to the elongation-only classification.
    pub fn moon_phase(&self, at: DateTime<Utc>) -> Result<MoonPhaseReading, AlmanacError> {
        let elongation = self.finite_elongation(at)?;
        let fraction = match self.provider.moon_illuminated_fraction(at) {
            Ok(fraction) if fraction.is_finite() => Some(fraction),
            Ok(fraction) => {
                log::warn!("Moon illumination is {}, classifying by elongation", fraction);
                None
            }
            Err(err) => {
                log::warn!("Moon illumination unavailable, classifying by elongation: {}", err);
                None
            }
        };
        Ok(MoonPhaseReading::from_measurements(elongation, fraction))
    }

    pub fn luck_rating(&self, at: DateTime<Utc>) -> Result<LuckRating, AlmanacError> {
        let elongation = self.finite_elongation(at)?;
        Ok(luck::rate(elongation))
    }

    /// Providers may override `moon_elongation`, so its output is checked here.
    fn finite_elongation(&self, at: DateTime<Utc>) -> Result<f64, AlmanacError> {
        let elongation = self.provider.moon_elongation(at)?;
        if !elongation.is_finite() {
            return Err(AlmanacError::ComputationUnavailable(format!(
                "moon elongation at {at} is {elongation}"
            )));
        }
        Ok(elongation)
    }

    /// Anchors of the planetary day containing `at`.
    pub fn day_anchors(
        &self,
        at: DateTime<Utc>,
        location: &ObserverLocation,
    ) -> Result<Option<DayAnchors>, AlmanacError> {
        location.validate()?;
        Ok(resolve_day_anchors(
            self.provider.as_ref(),
            at,
            location,
            self.settings.utc_offset,
        )?)
    }

    /// The 24 hours of the planetary day containing `at`; empty when the
    /// location has no sunrise/sunset that day.
    pub fn planetary_hours(
        &self,
        at: DateTime<Utc>,
        location: &ObserverLocation,
    ) -> Result<HourSchedule, AlmanacError> {
        let anchors = self.day_anchors(at, location)?;
        Ok(HourSchedule::from_anchors(anchors))
    }

    pub fn current_hour(&self, at: DateTime<Utc>, hours: &HourSchedule) -> Option<PlanetaryHourSlot> {
        hours.current_slot(at).copied()
    }

    fn same_local_day(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
        self.local_date(a) == self.local_date(b)
    }

    fn local_midnight(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        self.local_date(at)
            .and_hms_opt(0, 0, 0)
            .and_then(|naive| self.settings.utc_offset.from_local_datetime(&naive).single())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(at)
    }

    /// The status cell of a body: phase for the Moon, an eclipse falling on
    /// the same local day for the Sun, retrograde motion for the rest.
    pub fn body_status(
        &self,
        body: CelestialBody,
        at: DateTime<Utc>,
    ) -> Result<Option<BodyStatus>, AlmanacError> {
        match body {
            CelestialBody::Moon => Ok(Some(BodyStatus::Phase {
                phase: self.moon_phase(at)?.phase,
            })),
            CelestialBody::Sun => {
                let day_start = self.local_midnight(at);
                let solar = self.provider.search_solar_eclipse_peak(day_start)?;
                if self.same_local_day(at, solar) {
                    return Ok(Some(BodyStatus::SolarEclipse));
                }
                let lunar = self.provider.search_lunar_eclipse_peak(day_start)?;
                if self.same_local_day(at, lunar) {
                    return Ok(Some(BodyStatus::LunarEclipse));
                }
                Ok(None)
            }
            _ => Ok(self
                .retrograde_status(body, at)?
                .then_some(BodyStatus::Retrograde)),
        }
    }

    /// Zodiac, retrograde and status of one body. Each part fails independently.
    pub fn body_report(&self, body: CelestialBody, at: DateTime<Utc>) -> BodyReport {
        let retrograde = Reading::from(self.retrograde_status(body, at));
        let status = match (&retrograde, body.is_luminary()) {
            // the status of a planet is its retrograde flag
            (Reading::Available(flag), false) => Reading::Available(flag.then_some(BodyStatus::Retrograde)),
            (Reading::Unavailable { reason }, false) => Reading::unavailable(reason.clone()),
            (_, true) => Reading::from(self.body_status(body, at)),
        };
        let report = BodyReport {
            body,
            zodiac: Reading::from(self.zodiac(body, at)),
            retrograde,
            status,
        };
        if let Reading::Unavailable { reason } = &report.zodiac {
            log::warn!("Zodiac of {} unavailable: {}", body, reason);
        }
        if let Reading::Unavailable { reason } = &report.retrograde {
            log::warn!("Retrograde status of {} unavailable: {}", body, reason);
        }
        report
    }

    /// Compose a full snapshot.
    ///
    /// Per-body work, the moon phase, the luck rating and the anchor search
    /// run concurrently on the blocking pool, each bounded by the configured
    /// timeout. If another snapshot is requested before this one completes,
    /// the remaining work is dropped and `Superseded` is returned.
    pub async fn snapshot(
        &self,
        at: DateTime<Utc>,
        location: ObserverLocation,
    ) -> Result<DailySnapshot, AlmanacError> {
        self.snapshot_with_hours(at, location, None).await
    }

    /// Like [`Almanac::snapshot`], reusing `hours` instead of resolving the
    /// anchors again when the caller knows they are still current.
    pub async fn snapshot_with_hours(
        &self,
        at: DateTime<Utc>,
        location: ObserverLocation,
        hours: Option<HourSchedule>,
    ) -> Result<DailySnapshot, AlmanacError> {
        location.validate()?;
        let mut ticket = 0;
        self.generation.send_modify(|generation| {
            *generation += 1;
            ticket = *generation;
        });
        let mut newer = self.generation.subscribe();
        if *newer.borrow() != ticket {
            return Err(AlmanacError::Superseded);
        }

        let timeout = self.settings.call_timeout;
        let mut tasks = JoinSet::new();

        for (idx, body) in CelestialBody::ALL.into_iter().enumerate() {
            let almanac = self.clone();
            tasks.spawn(async move {
                let report = run_bounded(timeout, move || Ok(almanac.body_report(body, at)))
                    .await
                    .unwrap_or_else(|err| {
                        log::warn!("{} row unavailable: {}", body, err);
                        BodyReport::unavailable(body, &err.to_string())
                    });
                Part::Body(idx, report)
            });
        }

        let almanac = self.clone();
        tasks.spawn(async move {
            Part::Moon(Reading::from(
                run_bounded(timeout, move || almanac.moon_phase(at)).await,
            ))
        });

        let almanac = self.clone();
        tasks.spawn(async move {
            Part::Luck(Reading::from(
                run_bounded(timeout, move || almanac.luck_rating(at)).await,
            ))
        });

        match hours {
            Some(schedule) => {
                tasks.spawn(async move { Part::Hours(Reading::Available(schedule)) });
            }
            None => {
                let almanac = self.clone();
                tasks.spawn(async move {
                    let result = run_bounded(timeout, move || almanac.planetary_hours(at, &location)).await;
                    if let Err(err) = &result {
                        log::warn!("Planetary hours unavailable: {}", err);
                    }
                    Part::Hours(Reading::from(result))
                });
            }
        }

        let mut bodies: Vec<Option<BodyReport>> = vec![None; CelestialBody::ALL.len()];
        let mut moon_phase = Reading::unavailable("not computed");
        let mut luck = Reading::unavailable("not computed");
        let mut hours = Reading::unavailable("not computed");
        let mut watching = true;

        loop {
            tokio::select! {
                joined = tasks.join_next() => match joined {
                    None => break,
                    Some(Ok(Part::Body(idx, report))) => bodies[idx] = Some(report),
                    Some(Ok(Part::Moon(reading))) => moon_phase = reading,
                    Some(Ok(Part::Luck(reading))) => luck = reading,
                    Some(Ok(Part::Hours(reading))) => hours = reading,
                    Some(Err(err)) => log::warn!("Snapshot task failed: {}", err),
                },
                changed = newer.changed(), if watching => {
                    if changed.is_err() {
                        watching = false;
                    } else if *newer.borrow_and_update() != ticket {
                        tasks.abort_all();
                        log::debug!("Snapshot for {} superseded", at);
                        return Err(AlmanacError::Superseded);
                    }
                }
            }
        }

        let bodies = CelestialBody::ALL
            .into_iter()
            .zip(bodies)
            .map(|(body, report)| report.unwrap_or_else(|| BodyReport::unavailable(body, "task failed")))
            .collect();

        let (current_hour, show_night) = match &hours {
            Reading::Available(schedule) => (self.current_hour(at, schedule), schedule.show_night(at)),
            Reading::Unavailable { .. } => (None, false),
        };

        Ok(DailySnapshot {
            instant: at,
            location,
            bodies,
            moon_phase,
            hours,
            current_hour,
            show_night,
            luck,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_instant() {
        let dt = parse_instant("2024-06-02T06:00:00-05:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 6, 2, 11, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_instant_rejects_garbage() {
        assert!(matches!(
            parse_instant("yesterday at noon"),
            Err(AlmanacError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_default_settings() {
        let settings = AlmanacSettings::default();
        assert_eq!(settings.utc_offset.local_minus_utc(), 0);
        assert_eq!(settings.call_timeout, DEFAULT_CALL_TIMEOUT);
    }
}
