//! Set command: record a status transition for a subject.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use ws_db::Database;

use ws_core::{SubjectId, Timecode, current_code, open_interval};

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    subject_id: SubjectId,
    code: Timecode,
    notes: Option<&str>,
    now: DateTime<Utc>,
) -> Result<()> {
    let subject = db.subject(subject_id)?;
    let before = db.fetch_sequence(subject_id)?;
    let previous = current_code(&before);

    let after = db
        .record_transition(subject_id, code, now)
        .context("failed to record transition")?;

    // A non-noop transition always appends exactly one interval.
    if after.len() == before.len() {
        writeln!(writer, "{} is already {}; nothing to do.", subject.name, code)?;
        return Ok(());
    }

    writeln!(writer, "{} is now {} (was {}).", subject.name, code, previous)?;

    if let Some(text) = notes {
        let opened = open_interval(&after)
            .and_then(|interval| interval.id)
            .context("no open interval after transition")?;
        db.update_notes(opened, text)?;
        writeln!(writer, "Notes attached to interval {opened}.")?;
    }

    Ok(())
}
