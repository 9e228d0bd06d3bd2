//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Work-status tracker.
///
/// Records which status an agent is in as an append-mostly interval log and
/// reports per-status totals and timelines over days and trailing weeks.
#[derive(Debug, Parser)]
#[command(name = "ws", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show every agent's current status, or one agent's.
    Status {
        /// Limit to a single subject.
        #[arg(long)]
        subject: Option<i64>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Record a status change for a subject.
    Set {
        /// The new timecode (Production, Session, Lunch, Break, Unavailable).
        code: String,

        /// The acting subject.
        #[arg(long)]
        subject: i64,

        /// Notes to attach to the newly opened interval.
        #[arg(long)]
        notes: Option<String>,

        /// Transition instant (RFC 3339); defaults to the current time.
        #[arg(long)]
        at: Option<String>,
    },

    /// Per-status totals and timeline for one day.
    Day {
        /// Subject to report on.
        #[arg(long)]
        subject: i64,

        /// Day to report (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Per-day and combined totals for a trailing range of days.
    Week {
        /// Subject to report on.
        #[arg(long)]
        subject: i64,

        /// Last day of the range (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Number of days in the range.
        #[arg(long, default_value_t = 7)]
        days: u32,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Edit the notes on a recorded interval.
    Note {
        /// The interval id.
        interval: i64,

        /// The new notes text.
        text: String,
    },

    /// Manage the agent roster.
    Agents {
        #[command(subcommand)]
        action: AgentsAction,
    },
}

/// Roster management actions.
#[derive(Debug, Subcommand)]
pub enum AgentsAction {
    /// List all registered subjects.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Register a new subject.
    Add {
        /// Display name.
        #[arg(long)]
        name: String,

        /// Email address (unique).
        #[arg(long)]
        email: String,

        /// Register as an administrator instead of an agent.
        #[arg(long)]
        admin: bool,
    },
}
