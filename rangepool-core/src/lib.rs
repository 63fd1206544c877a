//! IPv4 pool classification
//!
//! Ranges (CIDR blocks) are stored in named pools and marked whitelisted or
//! blocked. An address is classified by the narrowest stored range that
//! contains it. Pools are exchanged with the web server as
//! `Require ip` / `Require not ip` list files.

pub mod address;
pub mod bulk;
pub mod codec;
pub mod config;
pub mod error;
pub mod logging;
pub mod lookup;
pub mod store;

pub use address::AddressRange;
pub use config::Config;
pub use error::{PoolError, PoolResult};
pub use logging::{init_logging, LogLevel};
pub use store::{AsyncRangeStore, EntryId, EntryStatus, OverlapPolicy, PoolEntry, RangeStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let _ = LogLevel::Info;
        let _ = EntryStatus::Blocked;
        assert!(AddressRange::parse("10.0.0.0/8").is_ok());
    }
}
