//! Agents command: roster management.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use ws_db::{Database, Role};

#[derive(Debug, Serialize)]
struct SubjectJson {
    id: i64,
    name: String,
    email: String,
    role: String,
}

pub fn list<W: Write>(writer: &mut W, db: &Database, json: bool) -> Result<()> {
    let subjects = db.list_subjects()?;

    if json {
        let rows: Vec<SubjectJson> = subjects
            .into_iter()
            .map(|s| SubjectJson {
                id: s.id.0,
                name: s.name,
                email: s.email,
                role: s.role.to_string(),
            })
            .collect();
        writeln!(writer, "{}", serde_json::to_string_pretty(&rows)?)?;
        return Ok(());
    }

    if subjects.is_empty() {
        writeln!(writer, "No subjects registered.")?;
        return Ok(());
    }
    for subject in subjects {
        writeln!(
            writer,
            "{:<4} {:<16} {:<28} {}",
            subject.id.0, subject.name, subject.email, subject.role
        )?;
    }
    Ok(())
}

pub fn add<W: Write>(
    writer: &mut W,
    db: &Database,
    name: &str,
    email: &str,
    admin: bool,
) -> Result<()> {
    let role = if admin { Role::Admin } else { Role::Agent };
    let subject = db.insert_subject(name, email, role)?;
    writeln!(writer, "Created {} {} ({}).", subject.role, subject.name, subject.id)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_list_round_trips() {
        let db = Database::open_in_memory().unwrap();

        let mut output = Vec::new();
        add(&mut output, &db, "Ram", "ram@example.com", false).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "Created agent Ram (1).\n");

        let mut output = Vec::new();
        add(&mut output, &db, "Richard", "admin@example.com", true).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "Created admin Richard (2).\n");

        let mut output = Vec::new();
        list(&mut output, &db, false).unwrap();
        let listing = String::from_utf8(output).unwrap();
        assert!(listing.contains("Ram"));
        assert!(listing.contains("admin@example.com"));
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        add(&mut Vec::new(), &db, "Ram", "ram@example.com", false).unwrap();
        let result = add(&mut Vec::new(), &db, "Impostor", "ram@example.com", false);
        assert!(result.is_err());
    }

    #[test]
    fn json_listing_is_structured() {
        let db = Database::open_in_memory().unwrap();
        add(&mut Vec::new(), &db, "Ram", "ram@example.com", false).unwrap();

        let mut output = Vec::new();
        list(&mut output, &db, true).unwrap();
        let rows: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(rows[0]["name"], "Ram");
        assert_eq!(rows[0]["role"], "agent");
    }
}
