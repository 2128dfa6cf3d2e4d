//! Flat outline of a view for the flow formats (DOCX, RTF, Markdown).
//!
//! Same section order and selection as the PDF layout, without pagination.
//! Each block carries styled runs; the emitters decide how much of the styling
//! their format can express.

use crate::layout::blocks::link_target;
use crate::models::view::{EmployerPart, SectionKind, View};
use crate::theme::colors::ColorRole;
use crate::theme::typography::TypeRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Name,
    Tagline,
    ContactLine,
    Heading(SectionKind),
    /// Employer line, project title, degree line.
    Entry,
    Subtitle,
    Paragraph,
    Bullet,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub color: ColorRole,
    pub size: TypeRole,
    pub link: Option<String>,
}

impl Run {
    fn plain(text: impl Into<String>, size: TypeRole, color: ColorRole) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
            color,
            size,
            link: None,
        }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    fn linked(mut self, uri: String) -> Self {
        self.link = Some(uri);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutlineBlock {
    pub kind: BlockKind,
    pub runs: Vec<Run>,
}

impl OutlineBlock {
    fn new(kind: BlockKind, runs: Vec<Run>) -> Self {
        Self { kind, runs }
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

pub fn outline(view: &View) -> Vec<OutlineBlock> {
    let mut out = header(view);

    for kind in view.sections() {
        out.push(OutlineBlock::new(
            BlockKind::Heading(kind),
            vec![Run::plain(kind.title(), TypeRole::SectionHeader, ColorRole::SectionHeader).bold()],
        ));
        match kind {
            SectionKind::Summary => out.push(body(&view.summary.text)),
            SectionKind::Achievements => {
                let joined = view
                    .achievements
                    .iter()
                    .map(|a| a.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" \u{2022} ");
                out.push(body(&joined));
            }
            SectionKind::Competencies => out.push(OutlineBlock::new(
                BlockKind::Paragraph,
                vec![Run::plain(
                    view.competencies().join(" \u{2022} "),
                    TypeRole::MainCompetency,
                    ColorRole::CompetencyHeader,
                )
                .bold()],
            )),
            SectionKind::Experience => experience(view, &mut out),
            SectionKind::Projects => projects(view, &mut out),
            SectionKind::Education => education(view, &mut out),
            SectionKind::AdditionalInfo => additional(view, &mut out),
            SectionKind::TechnicalSkills => technical_skills(view, &mut out),
        }
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

fn header(view: &View) -> Vec<OutlineBlock> {
    let c = &view.contact;
    let mut out = vec![OutlineBlock::new(
        BlockKind::Name,
        vec![Run::plain(c.name.trim(), TypeRole::Name, ColorRole::Name).bold()],
    )];
    if let Some(tagline) = non_empty(&c.tagline) {
        out.push(OutlineBlock::new(
            BlockKind::Tagline,
            vec![Run::plain(tagline, TypeRole::Title, ColorRole::Title).italic()],
        ));
    }

    let mut parts: Vec<Vec<Run>> = Vec::new();
    let link = |text: &str, uri: String| Run::plain(text, TypeRole::Body, ColorRole::Link).linked(uri);
    let label = |text: &str| Run::plain(text, TypeRole::Body, ColorRole::MediumText);

    if !c.email.trim().is_empty() {
        parts.push(vec![link(c.email.trim(), format!("mailto:{}", c.email.trim()))]);
    }
    if let Some(phone) = non_empty(&c.phone) {
        parts.push(vec![label(phone)]);
    }
    if let Some(loc) = non_empty(&c.location) {
        match non_empty(&c.location_url) {
            Some(url) => parts.push(vec![link(loc, link_target(url))]),
            None => parts.push(vec![label(loc)]),
        }
    }
    for (name, value) in [("Site: ", &c.website), ("LinkedIn: ", &c.linkedin), ("GitHub: ", &c.github)] {
        if let Some(value) = non_empty(value) {
            parts.push(vec![label(name), link(value, link_target(value))]);
        }
    }

    let mut runs = Vec::new();
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            runs.push(label(" | "));
        }
        runs.extend(part);
    }
    if !runs.is_empty() {
        out.push(OutlineBlock::new(BlockKind::ContactLine, runs));
    }
    out
}

fn experience(view: &View, out: &mut Vec<OutlineBlock>) {
    for p in &view.positions {
        let runs = p
            .employer_line_parts()
            .into_iter()
            .map(|(part, text)| match part {
                EmployerPart::Employer => Run::plain(text, TypeRole::Company, ColorRole::Company).bold(),
                EmployerPart::Title => Run::plain(text, TypeRole::JobTitle, ColorRole::JobTitle).bold(),
                EmployerPart::Location | EmployerPart::Dates => {
                    Run::plain(text, TypeRole::Body, ColorRole::MediumText)
                }
                EmployerPart::Separator => Run::plain(text, TypeRole::Body, ColorRole::LightText),
            })
            .collect();
        out.push(OutlineBlock::new(BlockKind::Entry, runs));

        if let Some(sub) = p.subtitle.as_deref().filter(|s| !s.trim().is_empty()) {
            out.push(OutlineBlock::new(
                BlockKind::Subtitle,
                vec![Run::plain(sub, TypeRole::Body, ColorRole::Subtitle).italic()],
            ));
        }
        out.extend(p.responsibilities.iter().map(|r| bullet(r)));
    }
}

fn projects(view: &View, out: &mut Vec<OutlineBlock>) {
    for p in &view.projects {
        out.push(OutlineBlock::new(
            BlockKind::Entry,
            vec![Run::plain(p.heading(), TypeRole::Company, ColorRole::JobTitle).bold()],
        ));
        if !p.description.trim().is_empty() {
            out.push(body(&p.description));
        }
        if !p.technologies.is_empty() {
            out.push(OutlineBlock::new(
                BlockKind::Paragraph,
                vec![
                    Run::plain("Technologies: ", TypeRole::Body, ColorRole::MediumText).bold(),
                    Run::plain(p.technologies.join(", "), TypeRole::Body, ColorRole::Accent).italic(),
                ],
            ));
        }
        if let Some(impact) = p.impact.as_deref().filter(|s| !s.trim().is_empty()) {
            out.push(OutlineBlock::new(
                BlockKind::Paragraph,
                vec![
                    Run::plain("Impact: ", TypeRole::Body, ColorRole::MediumText).bold(),
                    Run::plain(impact, TypeRole::Body, ColorRole::DarkText),
                ],
            ));
        }
        out.extend(p.technical_details.iter().map(|d| bullet(d)));
    }
}

fn education(view: &View, out: &mut Vec<OutlineBlock>) {
    for e in &view.education {
        let mut runs = vec![Run::plain(e.degree.trim(), TypeRole::Company, ColorRole::JobTitle).bold()];
        if let Some(rest) = e.line().strip_prefix(e.degree.trim()) {
            if !rest.is_empty() {
                runs.push(Run::plain(rest, TypeRole::Body, ColorRole::MediumText));
            }
        }
        out.push(OutlineBlock::new(BlockKind::Entry, runs));
        out.extend(e.details.iter().map(|d| bullet(d)));
    }
    out.extend(view.certifications.iter().map(|c| body(&c.line())));
}

fn additional(view: &View, out: &mut Vec<OutlineBlock>) {
    let Some(extra) = &view.additional else {
        return;
    };
    if !extra.earlier_roles.is_empty() {
        let roles = extra
            .earlier_roles
            .iter()
            .map(|r| r.line())
            .collect::<Vec<_>>()
            .join("; ");
        out.push(OutlineBlock::new(
            BlockKind::Paragraph,
            vec![
                Run::plain("Earlier roles: ", TypeRole::Body, ColorRole::MediumText).bold(),
                Run::plain(roles, TypeRole::Body, ColorRole::DarkText),
            ],
        ));
    }
    if let Some(site) = &extra.website {
        out.push(OutlineBlock::new(
            BlockKind::Paragraph,
            vec![
                Run::plain("Portfolio: ", TypeRole::Body, ColorRole::MediumText).bold(),
                Run::plain(site.as_str(), TypeRole::Body, ColorRole::Link).linked(link_target(site)),
            ],
        ));
    }
}

fn technical_skills(view: &View, out: &mut Vec<OutlineBlock>) {
    for group in view.skills.iter().filter(|g| !g.entries.is_empty()) {
        let mut runs = vec![Run::plain(
            format!("{}: ", group.name),
            TypeRole::MainCompetency,
            ColorRole::CompetencyHeader,
        )
        .bold()];
        for (i, entry) in group.entries.iter().enumerate() {
            if i > 0 {
                runs.push(Run::plain("; ", TypeRole::CompetencyDetail, ColorRole::MediumText));
            }
            match &entry.name {
                Some(name) => {
                    runs.push(Run::plain(name.as_str(), TypeRole::SubCompetency, ColorRole::Accent).italic());
                    if !entry.detail.is_empty() {
                        runs.push(Run::plain(
                            format!(" ({})", entry.detail),
                            TypeRole::CompetencyDetail,
                            ColorRole::MediumText,
                        ));
                    }
                }
                None => runs.push(Run::plain(
                    entry.detail.as_str(),
                    TypeRole::CompetencyDetail,
                    ColorRole::MediumText,
                )),
            }
        }
        out.push(OutlineBlock::new(BlockKind::Paragraph, runs));
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

fn body(text: &str) -> OutlineBlock {
    OutlineBlock::new(
        BlockKind::Paragraph,
        vec![Run::plain(text.trim(), TypeRole::Body, ColorRole::DarkText)],
    )
}

fn bullet(text: &str) -> OutlineBlock {
    OutlineBlock::new(
        BlockKind::Bullet,
        vec![Run::plain(text.trim(), TypeRole::Bullet, ColorRole::DarkText)],
    )
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Every user-visible entity string in `view`. The flow emitters must carry
/// each of them through verbatim.
#[cfg(test)]
pub(crate) fn entity_texts(view: &View) -> Vec<String> {
    let mut texts = vec![view.contact.name.clone(), view.contact.email.clone(), view.summary.text.clone()];
    texts.extend(view.achievements.iter().map(|a| a.text.clone()));
    for p in &view.positions {
        texts.push(p.employer.clone());
        texts.push(p.title.clone());
        texts.push(p.dates.text().to_string());
        texts.extend(p.subtitle.clone());
        texts.extend(p.responsibilities.iter().cloned());
    }
    for p in &view.projects {
        texts.push(p.name.clone());
        texts.push(p.description.clone());
        texts.extend(p.technologies.iter().cloned());
        texts.extend(p.impact.clone());
        texts.extend(p.technical_details.iter().cloned());
    }
    for g in &view.skills {
        texts.push(g.name.clone());
        for e in &g.entries {
            texts.extend(e.name.clone());
            texts.push(e.detail.clone());
        }
    }
    for e in &view.education {
        texts.push(e.degree.clone());
        texts.push(e.institution.clone());
        texts.extend(e.details.iter().cloned());
    }
    texts.extend(view.certifications.iter().map(|c| c.name.clone()));
    if let Some(extra) = &view.additional {
        for r in &extra.earlier_roles {
            texts.push(r.title.clone());
            texts.push(r.employer.clone());
        }
        texts.extend(extra.website.clone());
    }
    texts.retain(|t| !t.trim().is_empty());
    texts
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::make_view;
    use crate::models::view::{Audience, Length};

    #[test]
    fn test_headings_follow_section_order() {
        let view = make_view(Length::Full, Audience::Human);
        let headings: Vec<SectionKind> = outline(&view)
            .iter()
            .filter_map(|b| match b.kind {
                BlockKind::Heading(k) => Some(k),
                _ => None,
            })
            .collect();
        assert_eq!(headings, view.sections());
    }

    #[test]
    fn test_every_entity_in_outline() {
        for length in Length::ALL {
            let view = make_view(length, Audience::Human);
            let all: String = outline(&view).iter().map(|b| b.text() + "\n").collect();
            for text in entity_texts(&view) {
                assert!(all.contains(text.trim()), "{length}: missing '{text}'");
            }
        }
    }

    #[test]
    fn test_contact_line_links() {
        let view = make_view(Length::Full, Audience::Human);
        let blocks = outline(&view);
        let contact = blocks.iter().find(|b| b.kind == BlockKind::ContactLine).unwrap();
        let links: Vec<&str> = contact.runs.iter().filter_map(|r| r.link.as_deref()).collect();
        assert_eq!(links[0], "mailto:jordan@example.com");
        assert!(links.contains(&"https://github.com/jrivera"));
    }

    #[test]
    fn test_employer_line_elides_location() {
        let mut view = make_view(Length::Full, Audience::Human);
        let location = std::mem::take(&mut view.positions[0].location);
        assert!(!location.is_empty());
        let blocks = outline(&view);
        let entry = blocks.iter().find(|b| b.kind == BlockKind::Entry).unwrap();
        assert!(!entry.text().contains(&location), "{}", entry.text());
        assert_eq!(entry.text(), view.positions[0].employer_line());
    }
}
