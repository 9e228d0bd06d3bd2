//! Storage layer for the work-status tracker.
//!
//! Provides persistence for subjects and their status intervals using
//! `rusqlite`, and applies engine transitions atomically.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but
//! not `Sync`. For multi-threaded access, serialize behind a `Mutex` or use
//! one `Database` per thread.
//!
//! # Schema
//!
//! Timestamps are stored as TEXT in ISO 8601 format (e.g.,
//! `2024-01-15T10:30:00.000Z`), so lexicographic ordering matches
//! chronological ordering and values stay human-readable. They are parsed to
//! `DateTime<Utc>` at this boundary; the engine never sees strings.
//!
//! Interval rows are append-mostly by construction: the only UPDATE ever
//! issued against a row's times sets `end_time` once, when the next
//! transition closes it. Notes may be edited freely; they are opaque to the
//! engine.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use ws_core::{
    IntervalId, SubjectId, TimeInterval, Timecode, TransitionError, UnknownTimecode, open_interval,
    request_change,
};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for interval {interval_id}: {timestamp}")]
    TimestampParse {
        interval_id: i64,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored status code is not a known timecode.
    #[error(transparent)]
    UnknownTimecode(#[from] UnknownTimecode),
    /// A stored role string is not a known role.
    #[error("unknown role: {0}")]
    UnknownRole(String),
    /// No subject with the given id.
    #[error("subject {0} not found")]
    SubjectNotFound(SubjectId),
    /// No interval with the given id.
    #[error("interval {0} not found")]
    IntervalNotFound(IntervalId),
    /// The engine rejected the transition.
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// A subject's role in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Agent,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Agent => "agent",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "agent" => Ok(Self::Agent),
            _ => Err(DbError::UnknownRole(s.to_string())),
        }
    }
}

/// A tracked agent or administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS subjects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                role TEXT NOT NULL DEFAULT 'agent'
            );

            -- Intervals table: the per-subject status log
            -- start_time/end_time: ISO 8601 (e.g., '2024-01-15T10:30:00.000Z')
            -- end_time NULL means the interval is still open
            CREATE TABLE IF NOT EXISTS intervals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                subject_id INTEGER NOT NULL,
                code TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT,
                notes TEXT,
                FOREIGN KEY (subject_id) REFERENCES subjects(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_intervals_subject ON intervals(subject_id);
            CREATE INDEX IF NOT EXISTS idx_intervals_start ON intervals(start_time);
            ",
        )?;
        Ok(())
    }

    /// Inserts a subject and returns it with its assigned id.
    pub fn insert_subject(&self, name: &str, email: &str, role: Role) -> Result<Subject, DbError> {
        self.conn.execute(
            "INSERT INTO subjects (name, email, role) VALUES (?, ?, ?)",
            params![name, email, role.as_str()],
        )?;
        let id = SubjectId(self.conn.last_insert_rowid());
        tracing::debug!(%id, name, "subject created");
        Ok(Subject {
            id,
            name: name.to_string(),
            email: email.to_string(),
            role,
        })
    }

    /// Lists all subjects ordered by id.
    pub fn list_subjects(&self) -> Result<Vec<Subject>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, email, role FROM subjects ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut subjects = Vec::new();
        for row in rows {
            let (id, name, email, role) = row?;
            subjects.push(Subject {
                id: SubjectId(id),
                name,
                email,
                role: role.parse()?,
            });
        }
        Ok(subjects)
    }

    /// Fetches one subject by id.
    pub fn subject(&self, id: SubjectId) -> Result<Subject, DbError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, email, role FROM subjects WHERE id = ?",
                params![id.0],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        let (id, name, email, role) = row.ok_or(DbError::SubjectNotFound(id))?;
        Ok(Subject {
            id: SubjectId(id),
            name,
            email,
            role: role.parse()?,
        })
    }

    /// Fetches a subject's full interval sequence, chronological.
    pub fn fetch_sequence(&self, subject_id: SubjectId) -> Result<Vec<TimeInterval>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, subject_id, code, start_time, end_time, notes
            FROM intervals
            WHERE subject_id = ?
            ORDER BY start_time ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map(params![subject_id.0], row_to_raw)?;

        let mut sequence = Vec::new();
        for row in rows {
            sequence.push(raw_to_interval(row?)?);
        }
        Ok(sequence)
    }

    /// Fetches every subject's sequence, grouped by subject.
    ///
    /// Independent of [`Self::list_subjects`]; the two reads back the
    /// administrative overview and may run in any order.
    pub fn fetch_all_sequences(&self) -> Result<BTreeMap<SubjectId, Vec<TimeInterval>>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, subject_id, code, start_time, end_time, notes
            FROM intervals
            ORDER BY start_time ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([], row_to_raw)?;

        let mut sequences: BTreeMap<SubjectId, Vec<TimeInterval>> = BTreeMap::new();
        for row in rows {
            let interval = raw_to_interval(row?)?;
            sequences
                .entry(interval.subject_id)
                .or_default()
                .push(interval);
        }
        Ok(sequences)
    }

    /// Records a status change for a subject and returns the authoritative
    /// sequence.
    ///
    /// Runs the engine against the latest stored sequence, then applies the
    /// close and the append inside one transaction so no reader can observe
    /// two open intervals or a closed log with no successor. A suppressed
    /// duplicate performs no write.
    pub fn record_transition(
        &mut self,
        subject_id: SubjectId,
        code: Timecode,
        now: DateTime<Utc>,
    ) -> Result<Vec<TimeInterval>, DbError> {
        // Ensure the subject exists before touching the log.
        let _ = self.subject(subject_id)?;

        let sequence = self.fetch_sequence(subject_id)?;
        let open_id = open_interval(&sequence).and_then(|interval| interval.id);
        let outcome = request_change(sequence, subject_id, code, now)?;

        if outcome.noop {
            tracing::debug!(%subject_id, %code, "transition suppressed as duplicate");
            return Ok(outcome.sequence);
        }

        // A non-noop transition closes the open interval (if any) at `now`
        // and opens a new one starting at `now`.
        let tx = self.conn.transaction()?;
        if let Some(IntervalId(id)) = open_id {
            tx.execute(
                "UPDATE intervals SET end_time = ? WHERE id = ? AND end_time IS NULL",
                params![format_instant(now), id],
            )?;
        }
        tx.execute(
            "INSERT INTO intervals (subject_id, code, start_time, end_time, notes)
             VALUES (?, ?, ?, NULL, NULL)",
            params![subject_id.0, code.as_str(), format_instant(now)],
        )?;
        tx.commit()?;

        tracing::info!(%subject_id, %code, "status transition recorded");
        self.fetch_sequence(subject_id)
    }

    /// Replaces an interval's notes and returns the updated interval.
    pub fn update_notes(
        &self,
        interval_id: IntervalId,
        notes: &str,
    ) -> Result<TimeInterval, DbError> {
        let updated = self.conn.execute(
            "UPDATE intervals SET notes = ? WHERE id = ?",
            params![notes, interval_id.0],
        )?;
        if updated == 0 {
            return Err(DbError::IntervalNotFound(interval_id));
        }

        let row = self.conn.query_row(
            "SELECT id, subject_id, code, start_time, end_time, notes
             FROM intervals WHERE id = ?",
            params![interval_id.0],
            row_to_raw,
        )?;
        raw_to_interval(row)
    }
}

/// An interval row before timestamp/code parsing.
type RawInterval = (i64, i64, String, String, Option<String>, Option<String>);

fn row_to_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawInterval> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn raw_to_interval(raw: RawInterval) -> Result<TimeInterval, DbError> {
    let (id, subject_id, code, start_time, end_time, notes) = raw;
    Ok(TimeInterval {
        id: Some(IntervalId(id)),
        subject_id: SubjectId(subject_id),
        code: code.parse()?,
        start_time: parse_instant(id, &start_time)?,
        end_time: end_time
            .map(|timestamp| parse_instant(id, &timestamp))
            .transpose()?,
        notes,
    })
}

fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_instant(interval_id: i64, timestamp: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            interval_id,
            timestamp: timestamp.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ws_core::current_code;

    fn ts(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0)
            .single()
            .expect("valid test timestamp")
            + chrono::Duration::minutes(minutes)
    }

    fn db_with_agent() -> (Database, SubjectId) {
        let db = Database::open_in_memory().unwrap();
        let subject = db.insert_subject("Ram", "ram@example.com", Role::Agent).unwrap();
        (db, subject.id)
    }

    #[test]
    fn open_is_idempotent_on_existing_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("ws.db");
        {
            let db = Database::open(&path).unwrap();
            db.insert_subject("Ram", "ram@example.com", Role::Agent).unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.list_subjects().unwrap().len(), 1);
    }

    #[test]
    fn subjects_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let admin = db.insert_subject("Richard", "admin@example.com", Role::Admin).unwrap();
        let agent = db.insert_subject("Sita", "sita@example.com", Role::Agent).unwrap();

        let listed = db.list_subjects().unwrap();
        assert_eq!(listed, vec![admin.clone(), agent]);
        assert_eq!(db.subject(admin.id).unwrap(), admin);
    }

    #[test]
    fn missing_subject_is_an_error() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            db.subject(SubjectId(99)),
            Err(DbError::SubjectNotFound(SubjectId(99)))
        ));
    }

    #[test]
    fn transition_appends_and_closes() {
        let (mut db, subject) = db_with_agent();

        let sequence = db.record_transition(subject, Timecode::Production, ts(0)).unwrap();
        assert_eq!(sequence.len(), 1);
        assert!(sequence[0].is_open());
        assert!(sequence[0].id.is_some());

        let sequence = db.record_transition(subject, Timecode::Lunch, ts(90)).unwrap();
        assert_eq!(sequence.len(), 2);
        assert_eq!(sequence[0].end_time, Some(ts(90)));
        assert_eq!(current_code(&sequence), Timecode::Lunch);
    }

    #[test]
    fn duplicate_transition_writes_nothing() {
        let (mut db, subject) = db_with_agent();

        let first = db.record_transition(subject, Timecode::Production, ts(0)).unwrap();
        let second = db.record_transition(subject, Timecode::Production, ts(5)).unwrap();
        assert_eq!(first, second);
        assert_eq!(second.len(), 1);
        assert!(second[0].is_open());
    }

    #[test]
    fn transition_for_unknown_subject_fails() {
        let mut db = Database::open_in_memory().unwrap();
        assert!(matches!(
            db.record_transition(SubjectId(42), Timecode::Break, ts(0)),
            Err(DbError::SubjectNotFound(SubjectId(42)))
        ));
    }

    #[test]
    fn timestamps_survive_storage_exactly() {
        let (mut db, subject) = db_with_agent();
        let instant = ts(0) + chrono::Duration::milliseconds(250);

        let sequence = db.record_transition(subject, Timecode::Session, instant).unwrap();
        assert_eq!(sequence[0].start_time, instant);
    }

    #[test]
    fn update_notes_round_trips() {
        let (mut db, subject) = db_with_agent();
        let sequence = db.record_transition(subject, Timecode::Production, ts(0)).unwrap();
        let id = sequence[0].id.unwrap();

        let updated = db.update_notes(id, "handover call with QA").unwrap();
        assert_eq!(updated.notes.as_deref(), Some("handover call with QA"));

        // Notes edits never touch the times.
        assert_eq!(updated.start_time, sequence[0].start_time);
        assert!(updated.is_open());
    }

    #[test]
    fn update_notes_on_missing_interval_fails() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            db.update_notes(IntervalId(7), "x"),
            Err(DbError::IntervalNotFound(IntervalId(7)))
        ));
    }

    #[test]
    fn all_sequences_group_by_subject() {
        let mut db = Database::open_in_memory().unwrap();
        let ram = db.insert_subject("Ram", "ram@example.com", Role::Agent).unwrap();
        let sita = db.insert_subject("Sita", "sita@example.com", Role::Agent).unwrap();

        db.record_transition(ram.id, Timecode::Production, ts(0)).unwrap();
        db.record_transition(sita.id, Timecode::Break, ts(5)).unwrap();
        db.record_transition(ram.id, Timecode::Lunch, ts(60)).unwrap();

        let sequences = db.fetch_all_sequences().unwrap();
        assert_eq!(sequences.len(), 2);
        assert_eq!(sequences[&ram.id].len(), 2);
        assert_eq!(sequences[&sita.id].len(), 1);
        assert_eq!(current_code(&sequences[&ram.id]), Timecode::Lunch);
    }

    #[test]
    fn sequences_come_back_chronological() {
        let (mut db, subject) = db_with_agent();
        for (minute, code) in [(0, Timecode::Production), (30, Timecode::Break), (45, Timecode::Production)] {
            db.record_transition(subject, code, ts(minute)).unwrap();
        }

        let sequence = db.fetch_sequence(subject).unwrap();
        assert!(sequence.windows(2).all(|w| w[0].start_time <= w[1].start_time));
        assert_eq!(sequence.iter().filter(|i| i.is_open()).count(), 1);
    }
}
