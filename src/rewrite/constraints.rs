//! Constraint-name shortener for generated MySQL DDL.
//!
//! Drizzle's generated foreign-key constraint names concatenate table and
//! column names and routinely blow past MySQL's 64-character identifier
//! limit. Names over the limit are shortened to per-segment prefixes plus
//! a fixed `_fk` suffix; names within the limit are left byte-identical.
//! In-limit names are reserved up front, so a shortened name can never
//! collide with a name that is kept as-is.

use std::collections::HashSet;

use regex::Regex;

use crate::rewrite::Rewritten;

/// MySQL's maximum identifier length.
const MAX_IDENTIFIER_LEN: usize = 64;
/// Budget for the shortened body, leaving room for the suffix.
const BODY_BUDGET: usize = 60;
/// Suffix appended to every shortened name.
const FK_SUFFIX: &str = "_fk";
/// Characters kept from each underscore-separated segment.
const SEGMENT_KEEP: usize = 3;

/// Shorten every over-length constraint name in a DDL source unit.
pub fn rewrite_constraints(source: &str) -> Rewritten {
    let pattern = Regex::new(r"CONSTRAINT `([^`]+)`").unwrap();

    // Reserve the names that stay as-is before shortening anything.
    let mut used: HashSet<String> = pattern
        .captures_iter(source)
        .map(|caps| caps[1].to_string())
        .filter(|name| name.chars().count() <= MAX_IDENTIFIER_LEN)
        .collect();

    let mut changes = 0;
    let text = pattern
        .replace_all(source, |caps: &regex::Captures| {
            let name = &caps[1];
            if name.chars().count() <= MAX_IDENTIFIER_LEN {
                return caps[0].to_string();
            }
            let short = shorten(name, &used);
            used.insert(short.clone());
            changes += 1;
            format!("CONSTRAINT `{short}`")
        })
        .into_owned();

    Rewritten { text, changes }
}

/// Shorten one over-length name: per-segment prefixes joined by `_`,
/// truncated to the body budget, suffixed, and disambiguated against
/// names already in use.
fn shorten(name: &str, used: &HashSet<String>) -> String {
    let body = name
        .split('_')
        .map(|seg| seg.chars().take(SEGMENT_KEEP).collect::<String>())
        .collect::<Vec<_>>()
        .join("_");

    let candidate = format!("{}{FK_SUFFIX}", truncated(&body, BODY_BUDGET));
    if !used.contains(&candidate) {
        return candidate;
    }
    // Another name shortened to the same prefix: insert a numeric
    // disambiguator while staying inside the body budget.
    let mut n = 2usize;
    loop {
        let tag = format!("_{n}");
        let keep = BODY_BUDGET.saturating_sub(tag.chars().count());
        let candidate = format!("{}{tag}{FK_SUFFIX}", truncated(&body, keep));
        if !used.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Truncate to at most `max` characters, on a char boundary.
fn truncated(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
