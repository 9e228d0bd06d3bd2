//! Week command: per-day and combined totals for a trailing range.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use ws_db::Database;

use ws_core::{DayTotals, SubjectId, Timecode, aggregate_range, bootstrap};

use super::util::format_duration;

/// JSON payload for a range report.
#[derive(Debug, Serialize)]
struct WeekReportJson {
    subject_id: i64,
    subject_name: String,
    anchor_day: NaiveDate,
    num_days: u32,
    timezone: String,
    generated_at: DateTime<Utc>,
    per_day: Vec<DayJson>,
    combined: DayTotals,
}

#[derive(Debug, Serialize)]
struct DayJson {
    day: NaiveDate,
    totals: DayTotals,
}

#[allow(clippy::too_many_arguments)]
pub fn run<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &Database,
    subject_id: SubjectId,
    anchor_day: NaiveDate,
    num_days: u32,
    tz: &Tz,
    tz_label: &str,
    json: bool,
    now: DateTime<Utc>,
) -> Result<()> {
    let subject = db.subject(subject_id)?;
    let sequence = bootstrap(db.fetch_sequence(subject_id)?, subject_id, now);
    let report = aggregate_range(&sequence, anchor_day, num_days, tz, now);

    if json {
        let payload = WeekReportJson {
            subject_id: subject.id.0,
            subject_name: subject.name,
            anchor_day,
            num_days,
            timezone: tz_label.to_string(),
            generated_at: now,
            per_day: report
                .per_day
                .into_iter()
                .map(|day| DayJson {
                    day: day.day,
                    totals: day.totals,
                })
                .collect(),
            combined: report.combined,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&payload)?)?;
        return Ok(());
    }

    writeln!(
        writer,
        "Week report for {} — {} days ending {} ({})",
        subject.name, num_days, anchor_day, tz_label
    )?;
    writeln!(writer)?;

    write!(writer, "{:<12}", "Day")?;
    for code in Timecode::ALL {
        write!(writer, "{:<13}", code.as_str())?;
    }
    writeln!(writer)?;

    for day in &report.per_day {
        write!(writer, "{:<12}", day.day.to_string())?;
        for code in Timecode::ALL {
            write!(writer, "{:<13}", format_duration(day.totals[&code]))?;
        }
        writeln!(writer)?;
    }

    write!(writer, "{:<12}", "Combined")?;
    for code in Timecode::ALL {
        write!(writer, "{:<13}", format_duration(report.combined[&code]))?;
    }
    writeln!(writer)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ws_db::Role;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).single().unwrap()
    }

    fn seeded_db() -> (Database, SubjectId) {
        let mut db = Database::open_in_memory().unwrap();
        let subject = db.insert_subject("Ram", "ram@example.com", Role::Agent).unwrap();
        // A midnight-spanning Production stint and a Lunch break days later.
        db.record_transition(subject.id, Timecode::Production, at(6, 23)).unwrap();
        db.record_transition(subject.id, Timecode::Unavailable, at(7, 1)).unwrap();
        db.record_transition(subject.id, Timecode::Lunch, at(9, 12)).unwrap();
        db.record_transition(subject.id, Timecode::Unavailable, at(9, 13)).unwrap();
        (db, subject.id)
    }

    #[test]
    fn combined_matches_per_day_sum() {
        let (db, subject) = seeded_db();

        let mut output = Vec::new();
        run(&mut output, &db, subject, date(10), 7, &Utc, "UTC", true, at(10, 9)).unwrap();

        let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
        let per_day = report["per_day"].as_array().unwrap();
        assert_eq!(per_day.len(), 7);

        for code in Timecode::ALL {
            let key = code.as_str();
            let sum: i64 = per_day
                .iter()
                .map(|d| d["totals"][key].as_i64().unwrap())
                .sum();
            assert_eq!(report["combined"][key].as_i64().unwrap(), sum);
        }
        // The 23:00->01:00 stint split across two days.
        assert_eq!(report["combined"]["Production"], 2 * 3600);
        assert_eq!(report["combined"]["Lunch"], 3600);
        // Break never used this week.
        assert_eq!(report["combined"]["Break"], 0);
    }

    #[test]
    fn days_are_listed_descending_from_anchor() {
        let (db, subject) = seeded_db();

        let mut output = Vec::new();
        run(&mut output, &db, subject, date(10), 3, &Utc, "UTC", true, at(10, 9)).unwrap();

        let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
        let days: Vec<&str> = report["per_day"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["day"].as_str().unwrap())
            .collect();
        assert_eq!(days, vec!["2025-03-10", "2025-03-09", "2025-03-08"]);
    }

    #[test]
    fn human_table_has_header_days_and_combined_row() {
        let (db, subject) = seeded_db();

        let mut output = Vec::new();
        run(&mut output, &db, subject, date(10), 7, &Utc, "UTC", false, at(10, 9)).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("Week report for Ram — 7 days ending 2025-03-10 (UTC)"));
        assert!(output.contains("Day"));
        assert!(output.contains("2025-03-04"));
        assert!(output.contains("Combined"));
        // Production combined: 02:00:00 across the midnight split.
        assert!(output.lines().last().unwrap().contains("02:00:00"));
    }
}
