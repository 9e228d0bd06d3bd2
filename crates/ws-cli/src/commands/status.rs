//! Status command: every agent's current status, live.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use ws_db::Database;

use ws_core::{SubjectId, Timecode, current_code, open_interval};

use super::util::format_duration;

/// One row of the status overview.
#[derive(Debug, Serialize)]
struct StatusRow {
    subject_id: i64,
    name: String,
    code: Timecode,
    #[serde(skip_serializing_if = "Option::is_none")]
    open_since: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    open_seconds: Option<i64>,
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    subject: Option<SubjectId>,
    json: bool,
    now: DateTime<Utc>,
) -> Result<()> {
    let subjects = match subject {
        Some(id) => vec![db.subject(id)?],
        None => db.list_subjects()?,
    };
    let sequences = db.fetch_all_sequences()?;

    let empty = Vec::new();
    let rows: Vec<StatusRow> = subjects
        .into_iter()
        .map(|subject| {
            let sequence = sequences.get(&subject.id).unwrap_or(&empty);
            let open = open_interval(sequence);
            StatusRow {
                subject_id: subject.id.0,
                name: subject.name,
                code: current_code(sequence),
                open_since: open.map(|interval| interval.start_time),
                open_seconds: open.map(|interval| (now - interval.start_time).num_seconds().max(0)),
            }
        })
        .collect();

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&rows)?)?;
        return Ok(());
    }

    writeln!(writer, "Status as of {}", now.format("%Y-%m-%d %H:%M:%S UTC"))?;
    if rows.is_empty() {
        writeln!(writer, "No subjects registered.")?;
        return Ok(());
    }
    for row in rows {
        match row.open_seconds {
            Some(seconds) => writeln!(
                writer,
                "- {} ({}): {} for {}",
                row.name,
                row.subject_id,
                row.code,
                format_duration(seconds)
            )?,
            None => writeln!(writer, "- {} ({}): {}", row.name, row.subject_id, row.code)?,
        }
    }

    Ok(())
}
