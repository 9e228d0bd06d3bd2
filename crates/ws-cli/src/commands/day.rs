//! Day command: per-status totals and a 24-hour timeline for one day.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use ws_db::Database;

use ws_core::{
    DayTotals, ReportingWindow, SubjectId, Timecode, TimelineSegment, aggregate_day, bootstrap,
    layout_day,
};

use super::util::{AXIS, format_duration, render_bar};

/// JSON payload for a day report.
#[derive(Debug, Serialize)]
struct DayReportJson {
    subject_id: i64,
    subject_name: String,
    day: NaiveDate,
    timezone: String,
    generated_at: DateTime<Utc>,
    totals: DayTotals,
    segments: Vec<SegmentJson>,
}

#[derive(Debug, Serialize)]
struct SegmentJson {
    code: Timecode,
    offset_fraction: f64,
    width_fraction: f64,
    duration_seconds: i64,
}

#[allow(clippy::too_many_arguments)]
pub fn run<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &Database,
    subject_id: SubjectId,
    day: NaiveDate,
    tz: &Tz,
    tz_label: &str,
    json: bool,
    now: DateTime<Utc>,
) -> Result<()> {
    let subject = db.subject(subject_id)?;
    // An observed subject with no history gets a synthesized idle interval.
    let sequence = bootstrap(db.fetch_sequence(subject_id)?, subject_id, now);

    let window = ReportingWindow::day(day, tz);
    let totals = aggregate_day(&sequence, &window, now);
    let segments = layout_day(&sequence, &window, now);

    if json {
        let report = DayReportJson {
            subject_id: subject.id.0,
            subject_name: subject.name,
            day,
            timezone: tz_label.to_string(),
            generated_at: now,
            totals,
            segments: segments
                .into_iter()
                .map(|s| SegmentJson {
                    code: s.code,
                    offset_fraction: s.offset_fraction,
                    width_fraction: s.width_fraction,
                    duration_seconds: s.duration_seconds,
                })
                .collect(),
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(());
    }

    writeln!(writer, "Day report for {} — {} ({})", subject.name, day, tz_label)?;
    writeln!(writer)?;
    writeln!(writer, "{:13}{AXIS}", "")?;
    for code in Timecode::ALL {
        let code_segments: Vec<&TimelineSegment> =
            segments.iter().filter(|s| s.code == code).collect();
        writeln!(
            writer,
            "{:<12} {} {}",
            code.as_str(),
            render_bar(&code_segments),
            format_duration(totals[&code])
        )?;
    }
    writeln!(writer)?;
    writeln!(writer, "Tracked: {}", format_duration(totals.values().sum()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use ws_db::Role;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, hour, minute, 0)
            .single()
            .unwrap()
    }

    fn seeded_db() -> (Database, SubjectId) {
        let mut db = Database::open_in_memory().unwrap();
        let subject = db.insert_subject("Ram", "ram@example.com", Role::Agent).unwrap();
        // 00:00-06:00 Production, 06:00-09:00 Break, then open Session.
        db.record_transition(subject.id, Timecode::Production, at(0, 0)).unwrap();
        db.record_transition(subject.id, Timecode::Break, at(6, 0)).unwrap();
        db.record_transition(subject.id, Timecode::Session, at(9, 0)).unwrap();
        (db, subject.id)
    }

    #[test]
    fn renders_bars_and_totals() {
        let (db, subject) = seeded_db();

        let mut output = Vec::new();
        run(&mut output, &db, subject, date(), &Utc, "UTC", false, at(12, 0)).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        Day report for Ram — 2025-03-10 (UTC)

                     00:00       06:00       12:00       18:00       24:00
        Production   ████████████░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░ 06:00:00
        Session      ░░░░░░░░░░░░░░░░░░██████░░░░░░░░░░░░░░░░░░░░░░░░ 03:00:00
        Lunch        ░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░ 00:00:00
        Break        ░░░░░░░░░░░░██████░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░ 03:00:00
        Unavailable  ░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░ 00:00:00

        Tracked: 12:00:00
        ");
    }

    #[test]
    fn json_report_is_complete() {
        let (db, subject) = seeded_db();

        let mut output = Vec::new();
        run(&mut output, &db, subject, date(), &Utc, "UTC", true, at(12, 0)).unwrap();

        let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(report["subject_name"], "Ram");
        assert_eq!(report["totals"]["Production"], 6 * 3600);
        assert_eq!(report["totals"]["Session"], 3 * 3600);
        assert_eq!(report["totals"]["Lunch"], 0);
        assert_eq!(report["segments"].as_array().unwrap().len(), 3);
        assert_eq!(report["segments"][0]["offset_fraction"], 0.0);
        assert_eq!(report["segments"][0]["width_fraction"], 0.25);
    }

    #[test]
    fn subject_without_history_is_bootstrapped_idle() {
        let db = Database::open_in_memory().unwrap();
        let subject = db.insert_subject("Sita", "sita@example.com", Role::Agent).unwrap();

        let mut output = Vec::new();
        run(&mut output, &db, subject.id, date(), &Utc, "UTC", true, at(9, 0)).unwrap();

        let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
        // The synthesized idle interval starts at `now`, so totals stay zero.
        assert_eq!(report["totals"]["Unavailable"], 0);
    }
}
