//! Timecode enum as the single source of truth for status strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical work-status codes.
///
/// Declaration order is display order; it carries no computational meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Timecode {
    Production,
    Session,
    Lunch,
    Break,
    Unavailable,
}

impl Timecode {
    /// All codes in display order.
    pub const ALL: [Self; 5] = [
        Self::Production,
        Self::Session,
        Self::Lunch,
        Self::Break,
        Self::Unavailable,
    ];

    /// The idle code: a subject with no open interval is `Unavailable`.
    pub const IDLE: Self = Self::Unavailable;

    /// String representation for storage and display.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Production => "Production",
            Self::Session => "Session",
            Self::Lunch => "Lunch",
            Self::Break => "Break",
            Self::Unavailable => "Unavailable",
        }
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timecode {
    type Err = UnknownTimecode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Production" => Ok(Self::Production),
            "Session" => Ok(Self::Session),
            "Lunch" => Ok(Self::Lunch),
            "Break" => Ok(Self::Break),
            "Unavailable" => Ok(Self::Unavailable),
            _ => Err(UnknownTimecode(s.to_string())),
        }
    }
}

impl Serialize for Timecode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Timecode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown timecode strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown timecode: {0}")]
pub struct UnknownTimecode(pub String);
