//! The status interval entity and derived current-status queries.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::timecode::Timecode;

/// Validation errors for interval data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A closed interval whose end does not come strictly after its start.
    #[error("interval end {end} is not after start {start}")]
    EndNotAfterStart {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Identifies the agent whose status is tracked.
///
/// Assigned by the persistence collaborator; the engine only compares them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub i64);

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a persisted interval. Absent until the store assigns one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntervalId(pub i64);

impl fmt::Display for IntervalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One contiguous span during which a subject held one status.
///
/// Intervals are append-mostly: the only mutation after creation is setting
/// `end_time` once. `end_time = None` means the interval is still open and
/// represents the subject's current status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub id: Option<IntervalId>,
    pub subject_id: SubjectId,
    pub code: Timecode,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Free text owned by the editing surface; opaque to aggregation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TimeInterval {
    /// Creates a new open interval starting at `start_time`.
    #[must_use]
    pub const fn open(subject_id: SubjectId, code: Timecode, start_time: DateTime<Utc>) -> Self {
        Self {
            id: None,
            subject_id,
            code,
            start_time,
            end_time: None,
            notes: None,
        }
    }

    /// Whether the interval is still open (no end instant yet).
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Checks the closed-interval ordering invariant.
    ///
    /// Open intervals are always valid; aggregation treats violations as
    /// zero-duration rather than propagating this error.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.end_time {
            Some(end) if end <= self.start_time => Err(ValidationError::EndNotAfterStart {
                start: self.start_time,
                end,
            }),
            _ => Ok(()),
        }
    }
}

/// Returns the open interval of a sequence, if any.
///
/// Tolerates unsorted input: picks the open interval with the latest start
/// rather than trusting array position.
#[must_use]
pub fn open_interval(sequence: &[TimeInterval]) -> Option<&TimeInterval> {
    sequence
        .iter()
        .filter(|interval| interval.is_open())
        .max_by_key(|interval| interval.start_time)
}

/// Derives a subject's current status from a snapshot of their sequence.
///
/// The current status is the code of the open interval; with no open
/// interval (or no intervals at all) the subject is idle.
#[must_use]
pub fn current_code(sequence: &[TimeInterval]) -> Timecode {
    open_interval(sequence).map_or(Timecode::IDLE, |interval| interval.code)
}

/// Synthesizes the initial idle interval for a subject with no history.
///
/// Called before first render of an observed subject so totals and timeline
/// never operate on an empty sequence. Sequences with intervals are returned
/// unchanged.
#[must_use]
pub fn bootstrap(
    sequence: Vec<TimeInterval>,
    subject_id: SubjectId,
    now: DateTime<Utc>,
) -> Vec<TimeInterval> {
    if sequence.is_empty() {
        vec![TimeInterval::open(subject_id, Timecode::IDLE, now)]
    } else {
        sequence
    }
}
