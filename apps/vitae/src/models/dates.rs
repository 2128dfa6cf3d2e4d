//! Date ranges. This is the only place a free-form master string is parsed
//! back into structure, and only for chronological display.
//!
//! Accepted points: `YYYY`, `YYYY-MM`, `MM/YYYY`, `Mon YYYY`, `Month YYYY`
//! (plus `Sept` and a trailing period on the month), and
//! `Present` / `Current` / `Now` (any case) for an open end.
//! Accepted separators: en dash, em dash, ` to `, ` - `, or a bare `-` between years.
//! Unparseable text is kept verbatim, logged at warn, and sorts below every
//! parsed range.

use std::cmp::Ordering;
use std::fmt;

use chrono::{Month, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One end of a date range. `Present` orders above every concrete date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DatePoint {
    At(NaiveDate),
    Present,
}

/// A date range as written in the master store, plus its parsed bounds.
///
/// The original text is what every emitter renders; the bounds only drive ordering.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct DateRange {
    text: String,
    start: Option<NaiveDate>,
    end: Option<DatePoint>,
}

impl DateRange {
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Self::default();
        }

        let (left, right) = split_range(trimmed);
        let first = parse_point(left);
        let start = match first {
            Some(DatePoint::At(d)) => Some(d),
            _ => None,
        };
        let end = match right {
            Some(r) => parse_point(r),
            None => first,
        };
        if start.is_none() && end.is_none() {
            warn!(text = trimmed, "Unrecognised date range, it will sort last");
        }

        Self {
            text: trimmed.to_string(),
            start,
            end,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn end(&self) -> Option<DatePoint> {
        self.end
    }

    pub fn is_current(&self) -> bool {
        self.end == Some(DatePoint::Present)
    }

    /// Orders two ranges most-recent first: by end (`Present` highest), then by start.
    /// Returns `Equal` for ties so callers can apply their own tiebreak.
    pub fn cmp_recent_first(&self, other: &Self) -> Ordering {
        other
            .end
            .cmp(&self.end)
            .then_with(|| other.start.cmp(&self.start))
    }
}

impl From<String> for DateRange {
    fn from(text: String) -> Self {
        Self::parse(&text)
    }
}

impl From<&str> for DateRange {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl From<DateRange> for String {
    fn from(range: DateRange) -> Self {
        range.text
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

fn split_range(s: &str) -> (&str, Option<&str>) {
    for sep in ["–", "—", " to ", " - "] {
        if let Some((a, b)) = s.split_once(sep) {
            return (a.trim(), Some(b.trim()));
        }
    }

    // Bare hyphen: "2015-2017" is a range, "2015-03" is a single point.
    if let Some((a, b)) = s.split_once('-') {
        let b = b.trim();
        let is_month_suffix = b.len() <= 2 && b.chars().all(|c| c.is_ascii_digit());
        if !is_month_suffix {
            return (a.trim(), Some(b));
        }
    }

    (s, None)
}

fn parse_point(s: &str) -> Option<DatePoint> {
    let s = s.trim().trim_end_matches('.');
    let lower = s.to_lowercase();
    if matches!(lower.as_str(), "present" | "current" | "now" | "ongoing") {
        return Some(DatePoint::Present);
    }

    if let Some(year) = parse_year(s) {
        return ymd(year, 1);
    }

    if let Some((y, m)) = s.split_once('-') {
        return ymd(parse_year(y)?, m.trim().parse().ok()?);
    }

    if let Some((m, y)) = s.split_once('/') {
        return ymd(parse_year(y)?, m.trim().parse().ok()?);
    }

    if let Some((m, y)) = s.split_once(' ') {
        return ymd(parse_year(y)?, parse_month(m)?);
    }

    None
}

/// Month name or abbreviation, 1-based.
fn parse_month(s: &str) -> Option<u32> {
    let s = s.trim().trim_end_matches(&[',', '.'][..]);
    if let Ok(month) = s.parse::<Month>() {
        return Some(month.number_from_month());
    }
    match s.to_lowercase().as_str() {
        "sept" => Some(9),
        _ => None,
    }
}

fn parse_year(s: &str) -> Option<i32> {
    let s = s.trim();
    if s.len() == 4 && s.chars().all(|c| c.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

fn ymd(year: i32, month: u32) -> Option<DatePoint> {
    NaiveDate::from_ymd_opt(year, month, 1).map(DatePoint::At)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
