//! Apache-style access lists
//!
//! One directive per line, `Require ip <cidr>` for whitelists and
//! `Require not ip <cidr>` for blocklists, each optionally followed by
//! `# <comment>`.

mod parse;
mod render;

pub use parse::{parse_directive, parse_list, Directive};
pub use render::{render_list, BANNER_RULE};

use crate::store::EntryStatus;
use std::fmt;

/// Which side of a pool a list file represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Whitelist,
    Blocklist,
}

impl ListKind {
    pub const ALL: [ListKind; 2] = [ListKind::Whitelist, ListKind::Blocklist];

    /// Entries with this status end up in this kind of list
    pub fn status(&self) -> EntryStatus {
        match self {
            ListKind::Whitelist => EntryStatus::Whitelisted,
            ListKind::Blocklist => EntryStatus::Blocked,
        }
    }

    pub fn for_status(status: EntryStatus) -> Self {
        match status {
            EntryStatus::Whitelisted => ListKind::Whitelist,
            EntryStatus::Blocked => ListKind::Blocklist,
        }
    }

    pub fn directive(&self) -> &'static str {
        match self {
            ListKind::Whitelist => "Require ip",
            ListKind::Blocklist => "Require not ip",
        }
    }

    /// Subdirectory of a list root holding this kind of file
    pub fn dir_name(&self) -> &'static str {
        match self {
            ListKind::Whitelist => "whitelists",
            ListKind::Blocklist => "blocklists",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            ListKind::Whitelist => "WHITELIST",
            ListKind::Blocklist => "BLOCKLIST",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}
