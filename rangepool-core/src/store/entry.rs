//! Persisted pool entries

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Comments are cut to this many characters before they are stored
pub const MAX_COMMENT_CHARS: usize = 60;

/// Row identifier assigned by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(pub i64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Classification of a range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Whitelisted,
    Blocked,
}

impl EntryStatus {
    /// Single letter persisted in the `status` column
    pub fn as_code(&self) -> &'static str {
        match self {
            EntryStatus::Whitelisted => "w",
            EntryStatus::Blocked => "b",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "w" => Some(EntryStatus::Whitelisted),
            "b" => Some(EntryStatus::Blocked),
            _ => None,
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            EntryStatus::Whitelisted => "whitelisted",
            EntryStatus::Blocked => "blocked",
        })
    }
}

impl FromStr for EntryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "w" | "white" | "whitelist" | "whitelisted" => Ok(EntryStatus::Whitelisted),
            "b" | "block" | "blocked" | "blocklist" => Ok(EntryStatus::Blocked),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

/// One stored range with its pool membership
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolEntry {
    pub id: EntryId,
    pub start: u32,
    pub end: u32,
    pub cidr: String,
    pub pool_name: String,
    pub comment: String,
    pub status: EntryStatus,
}

impl PoolEntry {
    pub fn contains(&self, ip: u32) -> bool {
        self.start <= ip && ip <= self.end
    }

    pub fn width(&self) -> u32 {
        self.end - self.start
    }

    /// Stored comment, never longer than [`MAX_COMMENT_CHARS`]
    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn is_whitelisted(&self) -> bool {
        self.status == EntryStatus::Whitelisted
    }
}

/// Cut a comment to at most [`MAX_COMMENT_CHARS`] characters
pub fn truncate_comment(comment: &str) -> String {
    comment.chars().take(MAX_COMMENT_CHARS).collect()
}
