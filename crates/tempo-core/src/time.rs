//! Timestamp formatting and explicit-timezone day bucketing.
//!
//! All persisted timestamps are ISO-8601 UTC strings (`%Y-%m-%dT%H:%M:%SZ`),
//! which sort lexicographically in chronological order. Calendar days are
//! keyed as `YYYY-MM-DD` in the configured reference timezone.
//!
//! [`DayBoundary`] is that configuration made explicit: every operation that
//! buckets records by day (metrics, streaks, the nightly rollover) receives
//! one instead of consulting an ambient system timezone, so day boundaries
//! are deterministic under test and consistent across components.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// The timezone name given at configuration time is not a known IANA zone.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown timezone: {0}")]
pub struct UnknownTimezone(pub String);

/// Get the current UTC timestamp as an ISO 8601 string.
#[must_use]
pub fn now_iso() -> String {
    format_iso(Utc::now())
}

/// Format a UTC instant as an ISO 8601 string (second precision).
#[must_use]
pub fn format_iso(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Parse an ISO 8601 / RFC 3339 timestamp into a UTC instant.
#[must_use]
pub fn parse_iso(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Format a calendar day as its canonical `YYYY-MM-DD` key.
#[must_use]
pub fn format_date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a `YYYY-MM-DD` key back into a calendar day.
#[must_use]
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

/// Short weekday label (`Mon`…`Sun`) for dashboard axes.
#[must_use]
pub fn weekday_label(date: NaiveDate) -> String {
    date.format("%a").to_string()
}

/// The calendar day before `date` (saturating at the calendar minimum).
#[must_use]
pub fn prev_day(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(date)
}

/// The calendar day after `date` (saturating at the calendar maximum).
#[must_use]
pub fn next_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date)
}

/// The reference day boundary: a configured IANA timezone whose midnight
/// defines where one calendar day ends and the next begins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayBoundary {
    tz: Tz,
}

impl DayBoundary {
    /// Create a day boundary in the given timezone.
    #[must_use]
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// The UTC day boundary (the default configuration).
    #[must_use]
    pub fn utc() -> Self {
        Self { tz: Tz::UTC }
    }

    /// Create from an IANA timezone name, e.g. `"Europe/Berlin"`.
    pub fn from_name(name: &str) -> Result<Self, UnknownTimezone> {
        name.parse::<Tz>()
            .map(Self::new)
            .map_err(|_| UnknownTimezone(name.to_owned()))
    }

    /// The underlying timezone.
    #[must_use]
    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// The local calendar day containing `instant`.
    #[must_use]
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    /// Canonical `YYYY-MM-DD` key of the day containing `instant`.
    #[must_use]
    pub fn date_key(&self, instant: DateTime<Utc>) -> String {
        format_date_key(self.local_date(instant))
    }

    /// The UTC instant at which the given local calendar day starts.
    ///
    /// Midnights erased by a DST gap (or duplicated by a fold) resolve to
    /// the earliest valid instant of that day.
    #[must_use]
    pub fn start_of(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_time(NaiveTime::MIN);
        self.tz
            .from_local_datetime(&midnight)
            .earliest()
            .or_else(|| {
                self.tz
                    .from_local_datetime(&(midnight + Duration::hours(1)))
                    .earliest()
            })
            .map_or_else(
                || Utc.from_utc_datetime(&midnight),
                |dt| dt.with_timezone(&Utc),
            )
    }

    /// Start-of-day instant for the day containing `instant`.
    #[must_use]
    pub fn day_start(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        self.start_of(self.local_date(instant))
    }

    /// The half-open window `[day start, next day start)` containing
    /// `instant`.
    #[must_use]
    pub fn day_window(&self, instant: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let date = self.local_date(instant);
        let end = date
            .succ_opt()
            .map_or_else(|| self.start_of(date) + Duration::days(1), |d| self.start_of(d));
        (self.start_of(date), end)
    }

    /// The UTC instant of the next day rollover strictly after `now`.
    #[must_use]
    pub fn next_rollover(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = self.local_date(now);
        match today.succ_opt() {
            Some(tomorrow) => self.start_of(tomorrow),
            // NaiveDate::MAX — pin the rollover far in the future
            None => now + Duration::days(1),
        }
    }

    /// Time remaining until the next day rollover.
    #[must_use]
    pub fn until_next_rollover(&self, now: DateTime<Utc>) -> std::time::Duration {
        (self.next_rollover(now) - now)
            .to_std()
            .unwrap_or(std::time::Duration::ZERO)
    }
}

impl Default for DayBoundary {
    fn default() -> Self {
        Self::utc()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
