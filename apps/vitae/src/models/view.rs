//! Derived view: the immutable, per-document content every emitter consumes.
//!
//! A view is built once per (role, length, audience) and then shared read-only
//! across every color scheme and output format that needs it.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::content::Contact;
use crate::models::dates::DateRange;
use crate::models::master::SourceKey;

// ────────────────────────────────────────────────────────────────────────────
// Tags
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct TagParseError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl TagParseError {
    pub fn new(kind: &'static str, value: &str, expected: &'static str) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Length {
    Full,
    Abbreviated,
}

impl Length {
    pub const ALL: [Length; 2] = [Length::Full, Length::Abbreviated];

    /// Directory and file-name component: `long` / `short`.
    pub fn dir_name(self) -> &'static str {
        match self {
            Length::Full => "long",
            Length::Abbreviated => "short",
        }
    }

    pub fn is_abbreviated(self) -> bool {
        self == Length::Abbreviated
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for Length {
    type Err = TagParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "long" | "full" => Ok(Length::Full),
            "short" | "abbreviated" => Ok(Length::Abbreviated),
            _ => Err(TagParseError {
                kind: "length",
                value: s.to_string(),
                expected: "long, short",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    Ats,
    Human,
}

impl Audience {
    pub const ALL: [Audience; 2] = [Audience::Ats, Audience::Human];

    pub fn as_str(self) -> &'static str {
        match self {
            Audience::Ats => "ats",
            Audience::Human => "human",
        }
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Audience {
    type Err = TagParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ats" => Ok(Audience::Ats),
            "human" => Ok(Audience::Human),
            _ => Err(TagParseError {
                kind: "audience",
                value: s.to_string(),
                expected: "ats, human",
            }),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

/// Closed set of document sections, declared in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SectionKind {
    Summary,
    Achievements,
    Competencies,
    Experience,
    Projects,
    Education,
    AdditionalInfo,
    TechnicalSkills,
}

impl SectionKind {
    pub const ORDER: [SectionKind; 8] = [
        SectionKind::Summary,
        SectionKind::Achievements,
        SectionKind::Competencies,
        SectionKind::Experience,
        SectionKind::Projects,
        SectionKind::Education,
        SectionKind::AdditionalInfo,
        SectionKind::TechnicalSkills,
    ];

    pub fn title(self) -> &'static str {
        match self {
            SectionKind::Summary => "PROFESSIONAL SUMMARY",
            SectionKind::Achievements => "KEY ACHIEVEMENTS & IMPACT",
            SectionKind::Competencies => "CORE COMPETENCIES",
            SectionKind::Experience => "PROFESSIONAL EXPERIENCE",
            SectionKind::Projects => "KEY PROJECTS",
            SectionKind::Education => "EDUCATION",
            SectionKind::AdditionalInfo => "ADDITIONAL INFORMATION",
            SectionKind::TechnicalSkills => "TECHNICAL SKILLS",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// View items
// ────────────────────────────────────────────────────────────────────────────

/// A single string lifted from the master store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcedText {
    pub source: SourceKey,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewPosition {
    pub source: SourceKey,
    /// Position of this key in the role's `include_positions`; chronological tiebreak.
    pub config_rank: usize,
    pub title: String,
    pub employer: String,
    pub location: String,
    pub dates: DateRange,
    pub subtitle: Option<String>,
    pub responsibilities: Vec<String>,
}

/// Styled pieces of an employer line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployerPart {
    Employer,
    Title,
    Location,
    Dates,
    Separator,
}

impl ViewPosition {
    /// Pieces of `Company | Title - Location Dates`; missing fields are elided
    /// together with their separator.
    pub fn employer_line_parts(&self) -> Vec<(EmployerPart, String)> {
        let mut parts: Vec<(EmployerPart, String)> = Vec::new();
        let fields = [
            (EmployerPart::Employer, " | ", self.employer.trim()),
            (EmployerPart::Title, " | ", self.title.trim()),
            (EmployerPart::Location, " - ", self.location.trim()),
            (EmployerPart::Dates, " ", self.dates.text()),
        ];
        for (part, sep, value) in fields {
            if value.is_empty() {
                continue;
            }
            if !parts.is_empty() {
                parts.push((EmployerPart::Separator, sep.to_string()));
            }
            parts.push((part, value.to_string()));
        }
        parts
    }

    pub fn employer_line(&self) -> String {
        self.employer_line_parts()
            .into_iter()
            .map(|(_, text)| text)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewProject {
    pub source: SourceKey,
    pub name: String,
    pub dates: Option<DateRange>,
    pub description: String,
    pub technologies: Vec<String>,
    pub impact: Option<String>,
    /// Empty unless the role shows technical details.
    pub technical_details: Vec<String>,
}

impl ViewProject {
    /// `Name (dates)` heading.
    pub fn heading(&self) -> String {
        match &self.dates {
            Some(d) if !d.is_empty() => format!("{} ({})", self.name, d),
            _ => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub source: SourceKey,
    /// Display name of the sub-skill; `None` when the master entry is a bare string.
    pub name: Option<String>,
    pub detail: String,
}

impl SkillEntry {
    /// `Name: detail`, or just the detail for bare entries.
    pub fn display(&self) -> String {
        match &self.name {
            Some(name) if self.detail.is_empty() => name.clone(),
            Some(name) => format!("{name}: {}", self.detail),
            None => self.detail.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGroup {
    pub source: SourceKey,
    pub name: String,
    pub entries: Vec<SkillEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewEducation {
    pub source: SourceKey,
    pub degree: String,
    pub institution: String,
    pub location: Option<String>,
    pub dates: Option<DateRange>,
    pub details: Vec<String>,
}

impl ViewEducation {
    /// `Degree | Institution - Location Dates`.
    pub fn line(&self) -> String {
        let mut line = [self.degree.trim(), self.institution.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" | ");
        if let Some(loc) = self.location.as_deref().filter(|l| !l.trim().is_empty()) {
            line.push_str(" - ");
            line.push_str(loc.trim());
        }
        if let Some(d) = self.dates.as_ref().filter(|d| !d.is_empty()) {
            line.push(' ');
            line.push_str(d.text());
        }
        line
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewCertification {
    pub source: SourceKey,
    pub name: String,
    pub issuer: Option<String>,
    pub dates: Option<DateRange>,
}

impl ViewCertification {
    pub fn line(&self) -> String {
        let mut line = self.name.clone();
        if let Some(issuer) = self.issuer.as_deref().filter(|s| !s.is_empty()) {
            line.push_str(" | ");
            line.push_str(issuer);
        }
        if let Some(d) = self.dates.as_ref().filter(|d| !d.is_empty()) {
            line.push(' ');
            line.push_str(d.text());
        }
        line
    }
}

/// A role dropped by the abbreviated length, listed in one line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarlierRole {
    pub source: SourceKey,
    pub title: String,
    pub employer: String,
    pub dates: DateRange,
}

impl EarlierRole {
    pub fn line(&self) -> String {
        let mut line = [self.title.trim(), self.employer.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        if !self.dates.is_empty() {
            line.push_str(&format!(" ({})", self.dates));
        }
        line
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdditionalInfo {
    pub earlier_roles: Vec<EarlierRole>,
    pub website: Option<String>,
}

impl AdditionalInfo {
    pub fn is_empty(&self) -> bool {
        self.earlier_roles.is_empty() && self.website.is_none()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// View
// ────────────────────────────────────────────────────────────────────────────

/// The fully derived content for one (role, length, audience).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub role: String,
    pub length: Length,
    pub audience: Audience,
    pub contact: Contact,
    pub summary: SourcedText,
    /// All selected achievement statements, flattened under one category.
    pub achievements: Vec<SourcedText>,
    /// Display order: most recent first.
    pub positions: Vec<ViewPosition>,
    pub projects: Vec<ViewProject>,
    pub skills: Vec<SkillGroup>,
    pub education: Vec<ViewEducation>,
    pub certifications: Vec<ViewCertification>,
    /// Only populated for abbreviated views.
    pub additional: Option<AdditionalInfo>,
}

impl View {
    /// Core competency labels, one per included skill category.
    pub fn competencies(&self) -> Vec<&str> {
        self.skills.iter().map(|g| g.name.as_str()).collect()
    }

    pub fn has_section(&self, kind: SectionKind) -> bool {
        match kind {
            SectionKind::Summary => !self.summary.text.trim().is_empty(),
            SectionKind::Achievements => !self.achievements.is_empty(),
            SectionKind::Competencies => !self.skills.is_empty(),
            SectionKind::Experience => !self.positions.is_empty(),
            SectionKind::Projects => !self.projects.is_empty(),
            SectionKind::Education => {
                !self.education.is_empty() || !self.certifications.is_empty()
            }
            SectionKind::AdditionalInfo => self
                .additional
                .as_ref()
                .is_some_and(|a| self.length.is_abbreviated() && !a.is_empty()),
            SectionKind::TechnicalSkills => self.skills.iter().any(|g| !g.entries.is_empty()),
        }
    }

    /// Non-empty sections in display order.
    pub fn sections(&self) -> Vec<SectionKind> {
        SectionKind::ORDER
            .into_iter()
            .filter(|k| self.has_section(*k))
            .collect()
    }

    /// Every master key referenced by this view.
    pub fn source_keys(&self) -> Vec<&SourceKey> {
        let mut keys = vec![&self.summary.source];
        keys.extend(self.achievements.iter().map(|a| &a.source));
        keys.extend(self.positions.iter().map(|p| &p.source));
        keys.extend(self.projects.iter().map(|p| &p.source));
        for group in &self.skills {
            keys.push(&group.source);
            keys.extend(group.entries.iter().map(|e| &e.source));
        }
        keys.extend(self.education.iter().map(|e| &e.source));
        keys.extend(self.certifications.iter().map(|c| &c.source));
        if let Some(extra) = &self.additional {
            keys.extend(extra.earlier_roles.iter().map(|r| &r.source));
        }
        keys
    }
}

/// Sorts positions most-recent first; `PRESENT` is maximal, then later start,
/// then config order.
pub fn sort_chronologically(positions: &mut [ViewPosition]) {
    positions.sort_by(chronological_cmp);
}

pub fn chronological_cmp(a: &ViewPosition, b: &ViewPosition) -> Ordering {
    a.dates
        .cmp_recent_first(&b.dates)
        .then_with(|| a.config_rank.cmp(&b.config_rank))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_position(key: &str, rank: usize, dates: &str) -> ViewPosition {
        ViewPosition {
            source: SourceKey::Position(key.to_string()),
            config_rank: rank,
            title: "Engineer".into(),
            employer: key.to_uppercase(),
            location: "Austin, TX".into(),
            dates: DateRange::parse(dates),
            subtitle: None,
            responsibilities: vec![],
        }
    }

    #[test]
    fn test_chronology_scenario() {
        // config order A, B, C with A oldest and B current
        let mut positions = vec![
            make_position("a", 0, "2015–2017"),
            make_position("b", 1, "2020–PRESENT"),
            make_position("c", 2, "2018–2020"),
        ];
        sort_chronologically(&mut positions);
        let order: Vec<String> = positions.iter().map(|p| p.source.to_string()).collect();
        assert_eq!(
            order,
            vec!["work_experience.b", "work_experience.c", "work_experience.a"]
        );
    }

    #[test]
    fn test_identical_dates_keep_config_order() {
        let mut positions = vec![
            make_position("second", 1, "2020 - Present"),
            make_position("first", 0, "2020 - Present"),
        ];
        sort_chronologically(&mut positions);
        assert_eq!(positions[0].config_rank, 0);
        assert_eq!(
            chronological_cmp(&positions[0], &positions[1]),
            Ordering::Less
        );
    }

    #[test]
    fn test_employer_line_full() {
        let p = make_position("acme", 0, "2019 - 2021");
        assert_eq!(p.employer_line(), "ACME | Engineer - Austin, TX 2019 - 2021");
    }

    #[test]
    fn test_employer_line_elides_missing_fields() {
        let mut p = make_position("acme", 0, "");
        p.location.clear();
        assert_eq!(p.employer_line(), "ACME | Engineer");

        p.employer.clear();
        p.dates = DateRange::parse("2020");
        assert_eq!(p.employer_line(), "Engineer 2020");
    }

    #[test]
    fn test_skill_entry_display() {
        let named = SkillEntry {
            source: SourceKey::SkillCategory("x".into()),
            name: Some("Rust".into()),
            detail: "async services".into(),
        };
        assert_eq!(named.display(), "Rust: async services");

        let bare = SkillEntry {
            source: SourceKey::SkillCategory("x".into()),
            name: None,
            detail: "Git: daily".into(),
        };
        assert_eq!(bare.display(), "Git: daily");
    }

    #[test]
    fn test_length_and_audience_parse() {
        assert_eq!("short".parse::<Length>().unwrap(), Length::Abbreviated);
        assert_eq!("LONG".parse::<Length>().unwrap(), Length::Full);
        assert_eq!("ats".parse::<Audience>().unwrap(), Audience::Ats);
        let err = "medium".parse::<Length>().unwrap_err();
        assert!(err.to_string().contains("long, short"));
    }

    #[test]
    fn test_section_order_is_fixed() {
        assert_eq!(SectionKind::ORDER[0], SectionKind::Summary);
        assert_eq!(SectionKind::ORDER[7], SectionKind::TechnicalSkills);
        assert!(SectionKind::Projects < SectionKind::Education);
    }
}
