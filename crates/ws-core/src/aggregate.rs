//! Per-status duration totals over day and multi-day windows.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::interval::TimeInterval;
use crate::timecode::Timecode;
use crate::window::{self, ReportingWindow};

/// Seconds per status code. Every code is present, defaulting to 0.
pub type DayTotals = BTreeMap<Timecode, i64>;

/// Totals for one enumerated day of a range report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayReport {
    pub day: NaiveDate,
    pub totals: DayTotals,
}

/// Result of aggregating a contiguous span of days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeReport {
    /// Per-day totals, most recent day first.
    pub per_day: Vec<DayReport>,
    /// Sum of the per-day totals across the whole span.
    pub combined: DayTotals,
}

fn empty_totals() -> DayTotals {
    Timecode::ALL.iter().map(|&code| (code, 0)).collect()
}

/// Sums clamped durations per status code within one window.
///
/// Intervals are clamped independently, in any order; an interval outside
/// the window contributes 0. Malformed records (end not after start) also
/// contribute 0 so one corrupt row cannot abort a subject's report.
#[must_use]
pub fn aggregate_day(
    intervals: &[TimeInterval],
    window: &ReportingWindow,
    now: DateTime<Utc>,
) -> DayTotals {
    let mut totals = empty_totals();

    for interval in intervals {
        if interval.validate().is_err() {
            tracing::warn!(
                subject = %interval.subject_id,
                start = %interval.start_time,
                "skipping malformed interval"
            );
            continue;
        }
        let clamped = window::clamp(interval, window, now);
        if clamped.duration_seconds > 0 {
            *totals.entry(interval.code).or_insert(0) += clamped.duration_seconds;
        }
    }

    totals
}

/// Aggregates a trailing span of `num_days` days ending at `anchor_day`.
///
/// Days are enumerated `anchor_day, anchor_day - 1, ...` (descending), each
/// computed independently through [`aggregate_day`] with its own window in
/// `tz`. An interval spanning midnight therefore contributes to both
/// adjacent days, clamped once for each.
#[must_use]
pub fn aggregate_range<Tz: TimeZone>(
    intervals: &[TimeInterval],
    anchor_day: NaiveDate,
    num_days: u32,
    tz: &Tz,
    now: DateTime<Utc>,
) -> RangeReport {
    let mut per_day = Vec::with_capacity(num_days as usize);
    let mut combined = empty_totals();

    for offset in 0..num_days {
        let day = anchor_day - Duration::days(i64::from(offset));
        let totals = aggregate_day(intervals, &ReportingWindow::day(day, tz), now);
        for (&code, &seconds) in &totals {
            *combined.entry(code).or_insert(0) += seconds;
        }
        per_day.push(DayReport { day, totals });
    }

    RangeReport { per_day, combined }
}
