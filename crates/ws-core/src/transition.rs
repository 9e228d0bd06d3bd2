//! The status transition state machine.
//!
//! The only mutating part of the core: closing the open interval and
//! appending its successor. The engine operates on a snapshot and returns
//! the updated sequence; applying it atomically toward concurrent readers
//! is the persistence collaborator's job.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::interval::{self, SubjectId, TimeInterval};
use crate::timecode::Timecode;

/// Errors raised by a transition request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// The sequence contains intervals owned by a different subject.
    ///
    /// Access control proper lives outside the engine; this only rejects a
    /// request to transition state the given subject does not own.
    #[error("cannot transition subject {found} on behalf of subject {requested}")]
    SubjectMismatch { requested: SubjectId, found: SubjectId },
}

/// Result of a transition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    /// The sequence after the transition (unchanged when `noop`).
    pub sequence: Vec<TimeInterval>,
    /// True when the requested code was already the open status, so the
    /// request was suppressed without touching the sequence.
    pub noop: bool,
}

/// Applies a status change to a subject's sequence.
///
/// Closes the open interval (if any) at `now` and appends a new open
/// interval with `new_code`. Requesting the code that is already open is a
/// no-op; rapid repeated requests therefore cannot create duplicates. The
/// close and append are returned together and must be persisted atomically.
pub fn request_change(
    sequence: Vec<TimeInterval>,
    subject_id: SubjectId,
    new_code: Timecode,
    now: DateTime<Utc>,
) -> Result<TransitionOutcome, TransitionError> {
    if let Some(other) = sequence
        .iter()
        .map(|interval| interval.subject_id)
        .find(|&owner| owner != subject_id)
    {
        return Err(TransitionError::SubjectMismatch {
            requested: subject_id,
            found: other,
        });
    }

    let open_start = interval::open_interval(&sequence).map(|open| (open.code, open.start_time));
    if let Some((open_code, _)) = open_start {
        if open_code == new_code {
            return Ok(TransitionOutcome {
                sequence,
                noop: true,
            });
        }
    }

    let mut sequence = sequence;
    if let Some((_, start)) = open_start {
        // Close only that interval's end_time; everything else is immutable.
        if let Some(open) = sequence
            .iter_mut()
            .find(|interval| interval.is_open() && interval.start_time == start)
        {
            open.end_time = Some(now);
        }
    }
    sequence.push(TimeInterval::open(subject_id, new_code, now));

    Ok(TransitionOutcome {
        sequence,
        noop: false,
    })
}
