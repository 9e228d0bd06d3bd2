//! Reporting windows and interval clamping.
//!
//! A window is a bounded half-open range `[start, end)` of absolute
//! instants, typically one local calendar day. Timezone resolution happens
//! here, at construction; everything downstream consumes absolute instants.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::interval::TimeInterval;

/// A bounded reporting range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl ReportingWindow {
    /// Creates a window from explicit bounds. `end` is clamped to `start`
    /// so a window can never be negative.
    #[must_use]
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// The window covering one calendar day in the given timezone.
    pub fn day<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> Self {
        let start = local_midnight_to_utc(day, tz);
        let end = local_midnight_to_utc(day + Duration::days(1), tz);
        Self::new(start, end)
    }

    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Window length in seconds (86 400 for a normal day).
    #[must_use]
    pub fn length_seconds(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }
}

/// Converts a local date at midnight to UTC.
/// Handles DST ambiguity by picking the earlier time.
fn local_midnight_to_utc<Tz: TimeZone>(local_date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = local_date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        // Single or ambiguous (DST fall-back): use the earlier time
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            // DST spring-forward gap at midnight is rare but possible
            // Use 1am local which is guaranteed to exist
            let one_am = local_date.and_time(NaiveTime::from_hms_opt(1, 0, 0).unwrap());
            tz.from_local_datetime(&one_am)
                .earliest()
                .map_or_else(|| Utc.from_utc_datetime(&one_am), |dt| dt.with_timezone(&Utc))
        }
    }
}

/// An interval restricted to one reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClampedInterval {
    pub effective_start: DateTime<Utc>,
    pub effective_end: DateTime<Utc>,
    pub duration_seconds: i64,
}

/// Clamps one interval to a window, treating an open interval as running up
/// to `now`.
///
/// A result with `duration_seconds == 0` means the interval does not
/// intersect the window (or is malformed upstream); callers skip it. Pure
/// function of its inputs.
#[must_use]
pub fn clamp(interval: &TimeInterval, window: &ReportingWindow, now: DateTime<Utc>) -> ClampedInterval {
    let end_source = interval.end_time.unwrap_or(now);
    let effective_start = interval.start_time.max(window.start);
    let raw_end = end_source.min(window.end);

    let duration_seconds = (raw_end - effective_start).num_seconds().max(0);

    ClampedInterval {
        effective_start,
        effective_end: raw_end.max(effective_start),
        duration_seconds,
    }
}
