//! Fractional timeline layout for visualization consumers.

use chrono::{DateTime, Utc};

use crate::interval::TimeInterval;
use crate::timecode::Timecode;
use crate::window::{self, ReportingWindow};

/// One renderable segment on a normalized 24-hour axis.
///
/// `offset_fraction` and `width_fraction` are in `[0, 1]` by construction
/// since the underlying bounds are already window-clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineSegment {
    pub code: Timecode,
    pub offset_fraction: f64,
    pub width_fraction: f64,
    pub duration_seconds: i64,
}

/// Lays out a day's intervals as positioned segments.
///
/// One entry per interval intersecting the window; zero-width entries are
/// omitted. Revisited statuses produce independent segments, never merged.
/// Input order is irrelevant; output follows input order of the survivors.
#[must_use]
pub fn layout_day(
    intervals: &[TimeInterval],
    window: &ReportingWindow,
    now: DateTime<Utc>,
) -> Vec<TimelineSegment> {
    #[allow(clippy::cast_precision_loss)]
    let length = window.length_seconds().max(1) as f64;

    intervals
        .iter()
        .filter(|interval| interval.validate().is_ok())
        .filter_map(|interval| {
            let clamped = window::clamp(interval, window, now);
            if clamped.duration_seconds <= 0 {
                return None;
            }
            let from_start = (clamped.effective_start - window.start()).num_seconds();
            #[allow(clippy::cast_precision_loss)]
            Some(TimelineSegment {
                code: interval.code,
                offset_fraction: from_start as f64 / length,
                width_fraction: clamped.duration_seconds as f64 / length,
                duration_seconds: clamped.duration_seconds,
            })
        })
        .collect()
}
