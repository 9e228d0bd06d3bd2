//! Note command: edit the free-text notes on a recorded interval.

use std::io::Write;

use anyhow::Result;
use ws_core::IntervalId;
use ws_db::Database;

pub fn run<W: Write>(writer: &mut W, db: &Database, interval_id: IntervalId, text: &str) -> Result<()> {
    let updated = db.update_notes(interval_id, text)?;
    writeln!(
        writer,
        "Updated notes on interval {} ({}, started {}).",
        interval_id,
        updated.code,
        updated.start_time.format("%Y-%m-%d %H:%M UTC")
    )?;
    Ok(())
}
