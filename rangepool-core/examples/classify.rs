//! Classify a few addresses against an in-memory pool
//!
//! Run with:
//! ```bash
//! cargo run --example classify -- 10.1.2.5 10.2.0.0 11.0.0.0
//! ```

use rangepool_core::address::parse_ipv4;
use rangepool_core::codec::parse_list;
use rangepool_core::logging::{init_logging_with_config, LogConfig, LogLevel};
use rangepool_core::{EntryStatus, RangeStore};
use tracing::info;

const BLOCKLIST: &str = "\
#----------------------------------------
# BLOCKLIST corp
#----------------------------------------
Require not ip 10.0.0.0/8 # whole corp range
";

const WHITELIST: &str = "\
Require ip 10.1.2.0/24 # helpdesk
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging_with_config(LogConfig::new(LogLevel::Debug).with_target(false))?;

    let store = RangeStore::memory()?;
    let blocked = parse_list(&store, BLOCKLIST, "corp", EntryStatus::Blocked)?;
    let whitelisted = parse_list(&store, WHITELIST, "helpdesk", EntryStatus::Whitelisted)?;
    info!(blocked, whitelisted, "Lists loaded");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let addresses = if args.is_empty() {
        vec!["10.1.2.5".to_string(), "10.2.0.0".to_string(), "11.0.0.0".to_string()]
    } else {
        args
    };

    for addr in addresses {
        match store.find_containing(parse_ipv4(&addr)?)? {
            Some(entry) => println!("{:<15} {} ({}, pool {})", addr, entry.status, entry.cidr, entry.pool_name),
            None => println!("{:<15} unknown", addr),
        }
    }
    Ok(())
}
