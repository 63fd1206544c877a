//! IPv4 address ranges
//!
//! Every range is a closed interval `[start, end]` over big-endian `u32`
//! addresses. This is the only module that knows the width of an address.

use crate::error::{PoolError, PoolResult};
use ipnet::Ipv4Net;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

static IPV4_AT_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{1,3}\.){3}[0-9]{1,3}").expect("static regex is valid")
});

/// A CIDR block as a numeric interval
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AddressRange {
    /// Network address
    pub start: u32,
    /// Broadcast address
    pub end: u32,
    /// The CIDR text the range was parsed from, always with a prefix
    pub cidr: String,
}

impl AddressRange {
    /// Parse a dotted quad with an optional `/prefix`.
    ///
    /// A bare address is treated as `/32`. Host bits below the prefix are
    /// masked off, so `10.1.2.3/8` covers `10.0.0.0 - 10.255.255.255`.
    pub fn parse(text: &str) -> PoolResult<Self> {
        let text = text.trim();
        let cidr = if text.contains('/') {
            text.to_string()
        } else {
            format!("{}/32", text)
        };

        let net = Ipv4Net::from_str(&cidr).map_err(|e| PoolError::invalid_cidr(&cidr, e))?;
        let start = u32::from(net.network());
        let end = start | !prefix_mask(net.prefix_len());

        Ok(Self { start, end, cidr })
    }

    pub fn contains(&self, ip: u32) -> bool {
        self.start <= ip && ip <= self.end
    }

    /// Number of addresses covered minus one
    pub fn width(&self) -> u32 {
        self.end - self.start
    }

    pub fn first(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.start)
    }

    pub fn last(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.end)
    }
}

impl FromStr for AddressRange {
    type Err = PoolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} - {})", self.cidr, self.first(), self.last())
    }
}

fn prefix_mask(prefix: u8) -> u32 {
    match prefix {
        0 => 0,
        p => u32::MAX << (32 - u32::from(p.min(32))),
    }
}

/// Big-endian packing of an IPv4 address
pub fn ipv4_to_u32(ip: Ipv4Addr) -> u32 {
    u32::from(ip)
}

/// Big-endian packing of any address; IPv6 packs to 0
pub fn ip_to_u32(ip: IpAddr) -> u32 {
    match ip {
        IpAddr::V4(v4) => ipv4_to_u32(v4),
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(ipv4_to_u32).unwrap_or(0),
    }
}

/// Parse user supplied address text for a lookup
pub fn parse_ipv4(text: &str) -> PoolResult<u32> {
    let text = text.trim();
    text.parse::<Ipv4Addr>()
        .map(ipv4_to_u32)
        .map_err(|e| PoolError::invalid_cidr(text, e))
}

/// The valid dotted quad a piece of text starts with, if any
pub fn leading_ipv4(text: &str) -> Option<Ipv4Addr> {
    let found = IPV4_AT_START.find(text)?;
    found.as_str().parse().ok()
}
