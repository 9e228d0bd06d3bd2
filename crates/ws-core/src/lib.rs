//! Core domain logic for the work-status tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Status intervals: the append-mostly log of what a subject was doing
//! - Window clamping: restricting intervals to a reporting day
//! - Aggregation: per-status totals over days and trailing ranges
//! - Timeline layout: fractional segments on a 24-hour axis
//! - Transitions: the state machine that opens and closes intervals
//!
//! Everything here is pure with respect to wall-clock time: "now" is always
//! an explicit parameter, so repeated calls with identical arguments yield
//! identical results.

pub mod aggregate;
pub mod interval;
pub mod timecode;
pub mod timeline;
pub mod transition;
pub mod window;

pub use aggregate::{DayReport, DayTotals, RangeReport, aggregate_day, aggregate_range};
pub use interval::{
    IntervalId, SubjectId, TimeInterval, ValidationError, bootstrap, current_code, open_interval,
};
pub use timecode::{Timecode, UnknownTimecode};
pub use timeline::{TimelineSegment, layout_day};
pub use transition::{TransitionError, TransitionOutcome, request_change};
pub use window::{ClampedInterval, ReportingWindow, clamp};
