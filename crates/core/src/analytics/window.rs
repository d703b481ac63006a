//! Time windows.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::error::AnalyticsError;

/// Half-open time window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Inclusive start.
    pub start: DateTime<Utc>,
    /// Exclusive end.
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a window.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::InvalidWindow` if `start >= end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, AnalyticsError> {
        if start >= end {
            return Err(AnalyticsError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// The local calendar day `date` in `tz`.
    #[must_use]
    pub fn day(date: NaiveDate, tz: Tz) -> Self {
        let start = local_midnight(date, tz);
        let end = date
            .succ_opt()
            .map_or(start + Duration::days(1), |next| local_midnight(next, tz));
        Self { start, end }
    }

    /// The local day in `tz` that contains `now`.
    #[must_use]
    pub fn today(tz: Tz, now: DateTime<Utc>) -> Self {
        Self::day(now.with_timezone(&tz).date_naive(), tz)
    }

    /// Returns true if `at` falls inside the window.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

/// First instant of `date` in `tz`. Zones that skip midnight on a DST change
/// start the day at the first valid local time after it.
fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    (0..=2)
        .find_map(|h| {
            tz.from_local_datetime(&(midnight + Duration::hours(h)))
                .earliest()
        })
        .map_or_else(
            || Utc.from_utc_datetime(&midnight),
            |local| local.with_timezone(&Utc),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utc_today() {
        let now = Utc.with_ymd_and_hms(2026, 10, 17, 15, 30, 0).unwrap();
        let window = TimeWindow::today(Tz::UTC, now);
        assert_eq!(window.start, Utc.with_ymd_and_hms(2026, 10, 17, 0, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap());
        assert!(window.contains(now));
        assert!(!window.contains(window.end));
    }

    #[test]
    fn test_kolkata_today_starts_at_local_midnight() {
        // 20:00 UTC is 01:30 next day in IST (+05:30)
        let now = Utc.with_ymd_and_hms(2026, 10, 17, 20, 0, 0).unwrap();
        let window = TimeWindow::today(chrono_tz::Asia::Kolkata, now);
        assert_eq!(window.start, Utc.with_ymd_and_hms(2026, 10, 17, 18, 30, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2026, 10, 18, 18, 30, 0).unwrap());
    }

    #[test]
    fn test_dst_day_is_23_hours() {
        // US spring forward, 2026-03-08
        let date = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        let window = TimeWindow::day(date, chrono_tz::America::New_York);
        assert_eq!(window.end - window.start, Duration::hours(23));
    }

    #[test]
    fn test_empty_window_rejected() {
        let t = Utc::now();
        assert!(TimeWindow::new(t, t).is_err());
        assert!(TimeWindow::new(t, t + Duration::seconds(1)).is_ok());
    }
}
