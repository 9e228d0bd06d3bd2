use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ws_cli::commands::{agents, day, note, set, status, week};
use ws_cli::{AgentsAction, Cli, Commands, Config};
use ws_core::{IntervalId, SubjectId, Timecode};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(ws_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = ws_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

/// Parses an explicit `--at` instant, defaulting to the current time.
fn resolve_now(at: Option<&str>) -> Result<DateTime<Utc>> {
    at.map_or_else(
        || Ok(Utc::now()),
        |s| {
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .with_context(|| format!("invalid RFC 3339 instant: {s}"))
        },
    )
}

/// The IANA name of the local timezone, for report labels.
fn local_tz_label() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "local".to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let mut stdout = std::io::stdout().lock();

    match &cli.command {
        Some(Commands::Status { subject, json }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            status::run(
                &mut stdout,
                &db,
                subject.map(SubjectId),
                *json,
                Utc::now(),
            )?;
        }
        Some(Commands::Set {
            code,
            subject,
            notes,
            at,
        }) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            let code: Timecode = code.parse()?;
            let now = resolve_now(at.as_deref())?;
            set::run(
                &mut stdout,
                &mut db,
                SubjectId(*subject),
                code,
                notes.as_deref(),
                now,
            )?;
        }
        Some(Commands::Day {
            subject,
            date,
            json,
        }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            let day = date.unwrap_or_else(|| Local::now().date_naive());
            day::run(
                &mut stdout,
                &db,
                SubjectId(*subject),
                day,
                &Local,
                &local_tz_label(),
                *json,
                Utc::now(),
            )?;
        }
        Some(Commands::Week {
            subject,
            date,
            days,
            json,
        }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            let anchor = date.unwrap_or_else(|| Local::now().date_naive());
            week::run(
                &mut stdout,
                &db,
                SubjectId(*subject),
                anchor,
                *days,
                &Local,
                &local_tz_label(),
                *json,
                Utc::now(),
            )?;
        }
        Some(Commands::Note { interval, text }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            note::run(&mut stdout, &db, IntervalId(*interval), text)?;
        }
        Some(Commands::Agents { action }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            match action {
                AgentsAction::List { json } => agents::list(&mut stdout, &db, *json)?,
                AgentsAction::Add { name, email, admin } => {
                    agents::add(&mut stdout, &db, name, email, *admin)?;
                }
            }
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
