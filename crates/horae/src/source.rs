use crate::almanac::Almanac;
use crate::ephemeris::ObserverLocation;
use crate::error::AlmanacError;
use crate::hours::HourSchedule;
use crate::snapshot::{DailySnapshot, Reading};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Something polled periodically for fresh snapshots.
#[async_trait]
pub trait Source: Send + Sync {
    fn name(&self) -> &str;
    async fn poll(&mut self) -> Option<DailySnapshot>;
}

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

struct CachedHours {
    schedule: HourSchedule,
    location: ObserverLocation,
    date: NaiveDate,
}

/// Polls the almanac on an interval for the current instant.
///
/// The planetary hour schedule is kept between polls and only recomputed
/// once the next sunrise has been reached or the location changes.
pub struct AlmanacSource {
    almanac: Almanac,
    location: ObserverLocation,
    clock: Clock,
    interval: Duration,
    last_poll: Option<Instant>,
    cached: Option<CachedHours>,
}

impl AlmanacSource {
    pub fn new(almanac: Almanac, location: ObserverLocation, interval_secs: u64) -> Self {
        Self {
            almanac,
            location,
            clock: Arc::new(Utc::now),
            interval: Duration::from_secs(interval_secs),
            last_poll: None,
            cached: None,
        }
    }

    /// Replace the wall clock, for replays and tests.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn location(&self) -> ObserverLocation {
        self.location
    }

    pub fn set_location(&mut self, location: ObserverLocation) {
        if location != self.location {
            log::info!(
                "Almanac location changed to {:.4}, {:.4}",
                location.latitude,
                location.longitude
            );
            self.location = location;
            self.cached = None;
        }
    }

    /// The cached schedule, if it still covers `now`.
    fn current_hours(&self, now: DateTime<Utc>) -> Option<HourSchedule> {
        let cached = self.cached.as_ref()?;
        if cached.location != self.location {
            return None;
        }
        match cached.schedule.anchors {
            Some(anchors) if now >= anchors.sunrise && !cached.schedule.is_stale(now) => {
                Some(cached.schedule.clone())
            }
            Some(_) => None,
            // no anchors (polar day/night): retry once per local date
            None if cached.date == self.almanac.local_date(now) => Some(cached.schedule.clone()),
            None => None,
        }
    }

    /// Compute a snapshot for the clock's current instant.
    pub async fn refresh(&mut self) -> Result<DailySnapshot, AlmanacError> {
        let now = (self.clock)();
        let hours = self.current_hours(now);
        if hours.is_none() {
            log::debug!("Resolving planetary day anchors for {}", now);
        }

        let snapshot = self
            .almanac
            .snapshot_with_hours(now, self.location, hours)
            .await?;

        if let Reading::Available(schedule) = &snapshot.hours {
            self.cached = Some(CachedHours {
                schedule: schedule.clone(),
                location: self.location,
                date: self.almanac.local_date(now),
            });
        }
        Ok(snapshot)
    }
}

#[async_trait]
impl Source for AlmanacSource {
    fn name(&self) -> &str {
        "almanac"
    }

    async fn poll(&mut self) -> Option<DailySnapshot> {
        // Simple throttling
        if let Some(last) = self.last_poll {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                sleep(self.interval - elapsed).await;
            }
        }
        self.last_poll = Some(Instant::now());

        match self.refresh().await {
            Ok(snapshot) => Some(snapshot),
            Err(AlmanacError::Superseded) => None,
            Err(e) => {
                log::error!("Almanac refresh failed: {}", e);
                None
            }
        }
    }
}
