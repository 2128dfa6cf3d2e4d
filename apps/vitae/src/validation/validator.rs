//! View validator: required fields, placeholder text, and empty-section warnings.
//!
//! Runs on the View before any emitter, so a rejected view produces no output in
//! any format.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::view::View;
use crate::validation::placeholders::find_placeholder;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueKind {
    PlaceholderDetected,
    MissingRequiredField,
    EmptySection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    /// Dotted path into the view, e.g. `positions[acme].employer`.
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
}

impl ValidationReport {
    /// Emission may proceed. Strict mode also refuses on warnings.
    pub fn passed(&self, strict: bool) -> bool {
        self.errors.is_empty() && (!strict || self.warnings.is_empty())
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first = self.errors.first().or_else(|| self.warnings.first());
        match first {
            Some(issue) => write!(
                f,
                "{:?} at {}: {} ({} errors, {} warnings)",
                issue.kind,
                issue.field,
                issue.message,
                self.errors.len(),
                self.warnings.len()
            ),
            None => write!(f, "no issues"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

/// Checks a view for emission eligibility. Pure.
pub fn validate_view(view: &View) -> ValidationReport {
    let mut v = Collector::default();

    // Contact
    let c = &view.contact;
    v.required("contact.name", &c.name);
    v.required("contact.email", &c.email);
    if !c.email.trim().is_empty() && !c.email.contains('@') {
        v.error(
            IssueKind::MissingRequiredField,
            "contact.email",
            format!("'{}' is not an email address", c.email),
        );
    }
    v.scan("contact.name", &c.name);
    v.scan("contact.email", &c.email);
    for (field, value) in [
        ("contact.phone", &c.phone),
        ("contact.website", &c.website),
        ("contact.linkedin", &c.linkedin),
        ("contact.github", &c.github),
        ("contact.location", &c.location),
        ("contact.tagline", &c.tagline),
    ] {
        if let Some(value) = value {
            v.scan(field, value);
        }
    }

    // Summary
    v.required("summary", &view.summary.text);
    v.scan("summary", &view.summary.text);

    // Achievements
    for (i, a) in view.achievements.iter().enumerate() {
        v.scan(&format!("achievements[{i}]"), &a.text);
    }

    // Positions
    for p in &view.positions {
        let source = p.source.to_string();
        let key = item_key(&source);
        let base = format!("positions[{key}]");
        v.required(&format!("{base}.title"), &p.title);
        v.required(&format!("{base}.employer"), &p.employer);
        v.required(&format!("{base}.dates"), p.dates.text());
        v.scan(&format!("{base}.title"), &p.title);
        v.scan(&format!("{base}.employer"), &p.employer);
        v.scan(&format!("{base}.location"), &p.location);
        v.scan(&format!("{base}.dates"), p.dates.text());
        if let Some(sub) = &p.subtitle {
            v.scan(&format!("{base}.subtitle"), sub);
        }
        for (j, line) in p.responsibilities.iter().enumerate() {
            v.scan(&format!("{base}.responsibilities[{j}]"), line);
        }
    }

    // Projects
    for p in &view.projects {
        let source = p.source.to_string();
        let key = item_key(&source);
        let base = format!("projects[{key}]");
        v.scan(&format!("{base}.name"), &p.name);
        v.scan(&format!("{base}.description"), &p.description);
        for (j, tech) in p.technologies.iter().enumerate() {
            v.scan(&format!("{base}.technologies[{j}]"), tech);
        }
        if let Some(impact) = &p.impact {
            v.scan(&format!("{base}.impact"), impact);
        }
        for (j, detail) in p.technical_details.iter().enumerate() {
            v.scan(&format!("{base}.technical_details[{j}]"), detail);
        }
    }

    // Skills
    for group in &view.skills {
        let base = format!("skills[{}]", group.name);
        v.scan(&base, &group.name);
        if group.entries.is_empty() {
            v.warn(&base, "skill category has no entries");
        }
        for (j, entry) in group.entries.iter().enumerate() {
            v.scan(&format!("{base}.entries[{j}]"), &entry.display());
        }
    }

    // Education and certifications
    for (i, e) in view.education.iter().enumerate() {
        v.scan(&format!("education[{i}].degree"), &e.degree);
        v.scan(&format!("education[{i}].institution"), &e.institution);
        for (j, d) in e.details.iter().enumerate() {
            v.scan(&format!("education[{i}].details[{j}]"), d);
        }
    }
    for (i, cert) in view.certifications.iter().enumerate() {
        v.scan(&format!("certifications[{i}]"), &cert.line());
    }

    if let Some(extra) = &view.additional {
        for (i, role) in extra.earlier_roles.iter().enumerate() {
            v.scan(&format!("additional.earlier_roles[{i}]"), &role.line());
        }
    }

    // Warnings
    if view.achievements.is_empty() {
        v.warn("achievements", "achievement list is empty");
    }
    if view.skills.is_empty() {
        v.warn("competencies", "competency list is empty");
    }

    v.report
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Collector {
    report: ValidationReport,
}

impl Collector {
    fn error(&mut self, kind: IssueKind, field: &str, message: String) {
        self.report.errors.push(Issue {
            kind,
            field: field.to_string(),
            message,
        });
    }

    fn warn(&mut self, field: &str, message: &str) {
        self.report.warnings.push(Issue {
            kind: IssueKind::EmptySection,
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    fn required(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.error(
                IssueKind::MissingRequiredField,
                field,
                "required field is empty".to_string(),
            );
        }
    }

    fn scan(&mut self, field: &str, value: &str) {
        if let Some(token) = find_placeholder(value) {
            self.error(
                IssueKind::PlaceholderDetected,
                field,
                format!("contains placeholder text '{token}'"),
            );
        }
    }
}

/// `work_experience.acme` -> `acme`.
fn item_key(path: &str) -> &str {
    path.split_once('.').map(|(_, k)| k).unwrap_or(path)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
