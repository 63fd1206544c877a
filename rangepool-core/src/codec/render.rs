use super::ListKind;
use crate::store::PoolEntry;
use std::fmt::Write;

pub const BANNER_RULE: &str = "#----------------------------------------";

/// Render the entries of `kind`'s status as a list file, in input order
pub fn render_list(entries: &[PoolEntry], pool_name: &str, kind: ListKind) -> String {
    let mut out = String::new();
    out.push_str(BANNER_RULE);
    out.push('\n');
    // Writing to a String cannot fail
    let _ = writeln!(out, "# {} {}", kind.title(), pool_name);
    out.push_str(BANNER_RULE);
    out.push('\n');

    for entry in entries.iter().filter(|e| e.status == kind.status()) {
        let comment = entry.comment.trim();
        if comment.is_empty() {
            let _ = writeln!(out, "{} {}", kind.directive(), entry.cidr);
        } else {
            let _ = writeln!(out, "{} {} # {}", kind.directive(), entry.cidr, comment);
        }
    }

    out
}
