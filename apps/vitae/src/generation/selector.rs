//! Content selector: resolves a role's ordered key list against the master store
//! and applies the length limits.
//!
//! No ranking happens here. Config order is authoritative; the only reasons an
//! entry is dropped are "missing from the master store" and "limit reached".

use indexmap::IndexMap;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// One master entry picked by the role configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Selected<'a, T> {
    /// Index of the key in the role's list.
    pub rank: usize,
    pub key: &'a str,
    pub item: &'a T,
}

/// Result of resolving one include-list.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<'a, T> {
    pub selected: Vec<Selected<'a, T>>,
    /// Present in the master store but cut by the limit, in config order.
    pub overflow: Vec<Selected<'a, T>>,
    /// Keys the master store does not contain.
    pub missing: Vec<&'a str>,
    pub excluded: Vec<(String, String)>, // (key, reason)
}

// ────────────────────────────────────────────────────────────────────────────
// Selection algorithm
// ────────────────────────────────────────────────────────────────────────────

/// Resolves `keys` against `source` in order, keeping at most `limit` hits.
///
/// `section` only feeds the exclusion reasons.
pub fn select_keys<'a, T>(
    keys: &'a [String],
    source: &'a IndexMap<String, T>,
    limit: Option<usize>,
    section: &str,
) -> Selection<'a, T> {
    let mut selected = Vec::new();
    let mut overflow = Vec::new();
    let mut missing = Vec::new();
    let mut excluded = Vec::new();

    for (rank, key) in keys.iter().enumerate() {
        let Some(item) = source.get(key) else {
            missing.push(key.as_str());
            excluded.push((key.clone(), format!("Not in master store ({section})")));
            continue;
        };

        let hit = Selected {
            rank,
            key: key.as_str(),
            item,
        };
        match limit {
            Some(max) if selected.len() >= max => {
                excluded.push((
                    key.clone(),
                    format!("Length limit reached ({max} max for {section})"),
                ));
                overflow.push(hit);
            }
            _ => selected.push(hit),
        }
    }

    Selection {
        selected,
        overflow,
        missing,
        excluded,
    }
}

/// Keeps the first `cap` lines.
pub fn trim_lines(lines: &[String], cap: usize) -> Vec<String> {
    lines.iter().take(cap).cloned().collect()
}

/// Clips `text` to `max_chars` characters and appends `...` when anything was cut.
pub fn clip_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(max_chars).collect();
    clipped.push_str("...");
    clipped
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
