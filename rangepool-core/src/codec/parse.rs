use crate::address::leading_ipv4;
use crate::error::PoolResult;
use crate::store::{truncate_comment, EntryStatus, RangeSink};
use tracing::{debug, trace, warn};

/// One recognised directive line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Address or CIDR text as written
    pub cidr: String,
    /// Trailing comment, trimmed and truncated
    pub comment: String,
    /// Status the line spells out: `Require ip` whitelists, `Require not ip`
    /// blocks. `None` for bare address lines.
    pub stated: Option<EntryStatus>,
}

/// Recognise a single line.
///
/// Returns `None` for blank lines, comment lines, lines that neither start
/// with `Require` nor with a dotted quad, and `Require` lines that carry no
/// address (`Require all granted`).
pub fn parse_directive(line: &str) -> Option<Directive> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    if !line.starts_with("Require") && leading_ipv4(line).is_none() {
        return None;
    }

    let (body, comment) = match line.find('#') {
        Some(idx) => (line[..idx].trim(), truncate_comment(line[idx + 1..].trim())),
        None => (line, String::new()),
    };

    let cidr = body
        .split_whitespace()
        .filter(|token| leading_ipv4(token).is_some())
        .last()?;
    let stated = if !body.starts_with("Require") {
        None
    } else if body.split_whitespace().nth(1) == Some("not") {
        Some(EntryStatus::Blocked)
    } else {
        Some(EntryStatus::Whitelisted)
    };

    Some(Directive {
        cidr: cidr.to_string(),
        comment,
        stated,
    })
}

/// Feed every directive of `text` into `sink`.
///
/// Returns the number of directive lines processed, dedup hits included.
/// The first malformed CIDR aborts the parse; entries inserted before it stay.
pub fn parse_list<S: RangeSink + ?Sized>(
    sink: &S,
    text: &str,
    pool_name: &str,
    status: EntryStatus,
) -> PoolResult<usize> {
    let mut count = 0;

    for (index, line) in text.lines().enumerate() {
        let Some(directive) = parse_directive(line) else {
            trace!(pool = pool_name, line = index + 1, "Skipping non-directive line");
            continue;
        };
        if directive.stated.is_some_and(|stated| stated != status) {
            warn!(
                pool = pool_name,
                line = index + 1,
                cidr = %directive.cidr,
                %status,
                "Directive contradicts the list it was imported from"
            );
        }

        if let Some(existing) = sink.insert(&directive.cidr, pool_name, &directive.comment, status)? {
            debug!(
                pool = pool_name,
                cidr = %directive.cidr,
                existing_pool = %existing.pool_name,
                existing_cidr = %existing.cidr,
                "Directive already covered"
            );
        }
        count += 1;
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::parse_ipv4;
    use crate::store::RangeStore;

    #[test]
    fn test_parse_require_ip() {
        let d = parse_directive("Require ip 10.0.0.0/8").unwrap();
        assert_eq!(d.cidr, "10.0.0.0/8");
        assert_eq!(d.comment, "");
        assert_eq!(d.stated, Some(EntryStatus::Whitelisted));
    }

    #[test]
    fn test_parse_require_not_ip_with_comment() {
        let d = parse_directive("  Require not ip 1.2.3.4   #  scanner from ISP x ").unwrap();
        assert_eq!(d.cidr, "1.2.3.4");
        assert_eq!(d.comment, "scanner from ISP x");
        assert_eq!(d.stated, Some(EntryStatus::Blocked));
    }

    #[test]
    fn test_parse_bare_address_line() {
        let d = parse_directive("192.0.2.0/24 # documentation").unwrap();
        assert_eq!(d.cidr, "192.0.2.0/24");
        assert_eq!(d.comment, "documentation");
        assert_eq!(d.stated, None);
    }

    #[test]
    fn test_last_address_token_wins() {
        let d = parse_directive("Require ip 10.0.0.1 10.0.0.2").unwrap();
        assert_eq!(d.cidr, "10.0.0.2");
    }

    #[test]
    fn test_non_directives_skipped() {
        for line in [
            "",
            "   ",
            "# Require ip 1.2.3.4",
            "<RequireAll>",
            "Require all granted",
            "Require host example.com",
            "999.1.1.1/8",
            "Order deny,allow",
        ] {
            assert!(parse_directive(line).is_none(), "{:?} should be skipped", line);
        }
    }

    #[test]
    fn test_long_comment_truncated() {
        let line = format!("Require ip 1.2.3.4 # {}", "z".repeat(75));
        let d = parse_directive(&line).unwrap();
        assert_eq!(d.comment, "z".repeat(60));
    }

    #[test]
    fn test_parse_list_counts_dedup_hits() {
        let store = RangeStore::memory().unwrap();
        let text = "\
# BLOCKLIST test
Require not ip 10.0.0.0/8 # big
Require not ip 10.1.0.0/16
<RequireAll>
Require not ip 192.168.1.1
";
        let count = parse_list(&store, text, "test", EntryStatus::Blocked).unwrap();
        assert_eq!(count, 3);
        assert_eq!(store.count().unwrap(), 2);

        let entry = store.find_containing(parse_ipv4("10.1.1.1").unwrap()).unwrap().unwrap();
        assert_eq!(entry.cidr, "10.0.0.0/8");
        assert_eq!(entry.comment, "big");
    }

    #[test]
    fn test_contradicting_directive_takes_list_status() {
        let store = RangeStore::memory().unwrap();
        let text = "Require ip 10.0.0.1\nRequire not ip 10.0.0.2\n";

        let count = parse_list(&store, text, "mixed", EntryStatus::Whitelisted).unwrap();
        assert_eq!(count, 2);
        let entries = store.list_by_pool("mixed").unwrap();
        assert!(entries.iter().all(|e| e.status == EntryStatus::Whitelisted));
    }

    #[test]
    fn test_parse_list_aborts_on_bad_cidr() {
        let store = RangeStore::memory().unwrap();
        let text = "Require ip 1.1.1.1\nRequire ip 2.2.2.2/40\nRequire ip 3.3.3.3\n";

        let err = parse_list(&store, text, "p", EntryStatus::Whitelisted).unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(store.count().unwrap(), 1);
    }
}
