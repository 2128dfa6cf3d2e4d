//! Block composer: turns each view section into measured paragraphs grouped
//! into blocks with an atomic head and a flowable tail.
//!
//! Keep-together rules, in precedence order:
//! - a position with at most `ATOMIC_RESPONSIBILITIES` bullets is one unit;
//!   a longer one keeps {employer line, subtitle, first bullet} together and
//!   lets the remaining bullets flow one at a time
//! - every project is one unit; the first one also carries the section heading
//! - summary, achievements, competencies and additional info are single units
//! - technical skills paragraphs may split between lines
//! - education and certification entries are single units
//!
//! Every section heading sits in the head of its first block, so it cannot be
//! stranded at the bottom of a page.

use crate::layout::font_metrics::{get_metrics, StandardFont};
use crate::layout::text::{wrap_spans, Line, Span};
use crate::models::view::{EmployerPart, SectionKind, View};
use crate::theme::colors::{ColorRole, Rgb};
use crate::theme::spacing::SpacingLevel;
use crate::theme::typography::TypeRole;
use crate::theme::StyleBundle;

/// Positions with this many bullets or fewer never split.
pub const ATOMIC_RESPONSIBILITIES: usize = 4;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Identifies what a paragraph renders, for placement checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    SectionHeading(SectionKind),
    SummaryText,
    AchievementText,
    CompetencyText,
    EmployerLine(usize),
    Subtitle(usize),
    Responsibility(usize, usize),
    ProjectTitle(usize),
    ProjectBody(usize),
    EducationEntry(usize),
    Certification(usize),
    AdditionalLine(usize),
    SkillCategory(usize),
}

/// Rule drawn under a paragraph's last line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleBelow {
    pub color: Rgb,
    pub thickness: f32,
    pub width: f32,
    /// Vertical room reserved for the rule.
    pub gap: f32,
    /// Distance from the last text line down to the rule itself.
    pub drop: f32,
}

/// A wrapped paragraph with everything the paginator needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub tag: Tag,
    pub lines: Vec<Line>,
    /// Absolute x of the text's left edge.
    pub x: f32,
    pub line_height: f32,
    /// Distance from a line box's top to its baseline.
    pub baseline_offset: f32,
    /// Dropped when the paragraph opens a page or its block.
    pub space_before: f32,
    /// Glyph drawn in the indent gutter of the first line.
    pub bullet: Option<(f32, Span)>,
    pub rule_below: Option<RuleBelow>,
    /// Lines of this paragraph may land on different pages.
    pub splittable: bool,
}

impl Paragraph {
    /// Height without `space_before`.
    pub fn content_height(&self) -> f32 {
        self.lines.len() as f32 * self.line_height + self.rule_below.map_or(0.0, |r| r.gap)
    }

    /// Smallest piece the paginator must keep with whatever precedes it.
    pub fn first_unit_height(&self) -> f32 {
        if self.splittable {
            self.line_height
        } else {
            self.content_height()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// For error messages.
    pub label: String,
    pub space_before: f32,
    /// Kept together with the first unit of `tail`.
    pub head: Vec<Paragraph>,
    pub tail: Vec<Paragraph>,
}

impl Block {
    /// Head height plus the first tail unit; inner spacing included.
    pub fn keep_height(&self) -> f32 {
        let mut h = 0.0;
        for (i, p) in self.head.iter().enumerate() {
            if i > 0 {
                h += p.space_before;
            }
            h += p.content_height();
        }
        if let Some(first) = self.tail.first() {
            if !self.head.is_empty() {
                h += first.space_before;
            }
            h += first.first_unit_height();
        }
        h
    }
}

#[derive(Debug, Clone, Copy)]
enum Face {
    Base,
    Bold,
    Italic,
}

// ────────────────────────────────────────────────────────────────────────────
// Composer
// ────────────────────────────────────────────────────────────────────────────

pub struct Composer<'a> {
    view: &'a View,
    style: &'a StyleBundle,
}

impl<'a> Composer<'a> {
    pub fn new(view: &'a View, style: &'a StyleBundle) -> Self {
        Self { view, style }
    }

    pub fn section(&self, kind: SectionKind) -> Vec<Block> {
        let mut blocks = match kind {
            SectionKind::Summary => vec![self.summary()],
            SectionKind::Achievements => vec![self.achievements()],
            SectionKind::Competencies => vec![self.competencies()],
            SectionKind::Experience => self.experience(),
            SectionKind::Projects => self.projects(),
            SectionKind::Education => self.education(),
            SectionKind::AdditionalInfo => vec![self.additional()],
            SectionKind::TechnicalSkills => vec![self.technical_skills()],
        };

        if let Some(first) = blocks.first_mut() {
            first.head.insert(0, self.heading(kind));
            first.space_before = self.space(SpacingLevel::Medium);
        }
        blocks
    }

    // ── Sections ────────────────────────────────────────────────────────────

    fn summary(&self) -> Block {
        let text = self.span(&self.view.summary.text, Face::Base, TypeRole::Body, ColorRole::DarkText);
        self.single("summary", self.paragraph(Tag::SummaryText, vec![text], TypeRole::Body))
    }

    fn achievements(&self) -> Block {
        let joined = self
            .view
            .achievements
            .iter()
            .map(|a| a.text.as_str())
            .collect::<Vec<_>>()
            .join(" \u{2022} ");
        let span = self.span(&joined, Face::Base, TypeRole::Body, ColorRole::DarkText);
        self.single(
            "achievements",
            self.paragraph(Tag::AchievementText, vec![span], TypeRole::Body),
        )
    }

    fn competencies(&self) -> Block {
        let joined = self.view.competencies().join(" \u{2022} ");
        let span = self.span(
            &joined,
            Face::Bold,
            TypeRole::MainCompetency,
            ColorRole::CompetencyHeader,
        );
        self.single(
            "core competencies",
            self.paragraph(Tag::CompetencyText, vec![span], TypeRole::MainCompetency),
        )
    }

    fn experience(&self) -> Vec<Block> {
        self.view
            .positions
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let spans = p
                    .employer_line_parts()
                    .into_iter()
                    .map(|(part, text)| match part {
                        EmployerPart::Employer => {
                            self.span(&text, Face::Bold, TypeRole::Company, ColorRole::Company)
                        }
                        EmployerPart::Title => {
                            self.span(&text, Face::Bold, TypeRole::JobTitle, ColorRole::JobTitle)
                        }
                        EmployerPart::Location | EmployerPart::Dates => {
                            self.span(&text, Face::Base, TypeRole::Body, ColorRole::MediumText)
                        }
                        EmployerPart::Separator => {
                            self.span(&text, Face::Base, TypeRole::Body, ColorRole::LightText)
                        }
                    })
                    .collect();

                let mut head = vec![self.paragraph(Tag::EmployerLine(i), spans, TypeRole::Company)];
                if let Some(sub) = &p.subtitle {
                    let span = self.span(sub, Face::Italic, TypeRole::Body, ColorRole::Subtitle);
                    let mut para = self.paragraph(Tag::Subtitle(i), vec![span], TypeRole::Body);
                    para.space_before = self.space(SpacingLevel::Tiny);
                    head.push(para);
                }

                let mut bullets: Vec<Paragraph> = p
                    .responsibilities
                    .iter()
                    .enumerate()
                    .map(|(j, text)| {
                        let mut para = self.bullet(Tag::Responsibility(i, j), text);
                        if j == 0 {
                            para.space_before = self.space(SpacingLevel::Tiny);
                        }
                        para
                    })
                    .collect();

                let tail = if bullets.len() <= ATOMIC_RESPONSIBILITIES {
                    head.append(&mut bullets);
                    Vec::new()
                } else {
                    let rest = bullets.split_off(1);
                    head.append(&mut bullets);
                    rest
                };

                Block {
                    label: format!("position '{}'", p.employer_line()),
                    space_before: self.space(SpacingLevel::Small),
                    head,
                    tail,
                }
            })
            .collect()
    }

    fn projects(&self) -> Vec<Block> {
        self.view
            .projects
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let title = self.span(&p.heading(), Face::Bold, TypeRole::Company, ColorRole::JobTitle);
                let mut head = vec![self.paragraph(Tag::ProjectTitle(i), vec![title], TypeRole::Company)];

                if !p.description.trim().is_empty() {
                    let span = self.span(&p.description, Face::Base, TypeRole::Body, ColorRole::DarkText);
                    head.push(self.paragraph(Tag::ProjectBody(i), vec![span], TypeRole::Body));
                }
                if !p.technologies.is_empty() {
                    let spans = vec![
                        self.span("Technologies: ", Face::Bold, TypeRole::Body, ColorRole::MediumText),
                        self.span(&p.technologies.join(", "), Face::Italic, TypeRole::Body, ColorRole::Accent),
                    ];
                    head.push(self.paragraph(Tag::ProjectBody(i), spans, TypeRole::Body));
                }
                if let Some(impact) = p.impact.as_deref().filter(|s| !s.trim().is_empty()) {
                    let spans = vec![
                        self.span("Impact: ", Face::Bold, TypeRole::Body, ColorRole::MediumText),
                        self.span(impact, Face::Base, TypeRole::Body, ColorRole::DarkText),
                    ];
                    head.push(self.paragraph(Tag::ProjectBody(i), spans, TypeRole::Body));
                }
                for detail in &p.technical_details {
                    head.push(self.bullet(Tag::ProjectBody(i), detail));
                }

                Block {
                    label: format!("project '{}'", p.name),
                    space_before: self.space(SpacingLevel::Small),
                    head,
                    tail: Vec::new(),
                }
            })
            .collect()
    }

    fn education(&self) -> Vec<Block> {
        let minimal = self.space(SpacingLevel::Minimal);
        let mut blocks = Vec::new();

        for (i, e) in self.view.education.iter().enumerate() {
            let mut spans = vec![self.span(&e.degree, Face::Bold, TypeRole::Company, ColorRole::JobTitle)];
            let rest = e.line();
            if let Some(tail) = rest.strip_prefix(e.degree.trim()) {
                if !tail.is_empty() {
                    spans.push(self.span(tail, Face::Base, TypeRole::Body, ColorRole::MediumText));
                }
            }
            let mut head = vec![self.paragraph(Tag::EducationEntry(i), spans, TypeRole::Company)];
            for detail in &e.details {
                head.push(self.bullet(Tag::EducationEntry(i), detail));
            }
            blocks.push(Block {
                label: format!("education '{}'", e.degree),
                space_before: minimal,
                head,
                tail: Vec::new(),
            });
        }

        for (i, c) in self.view.certifications.iter().enumerate() {
            let span = self.span(&c.line(), Face::Base, TypeRole::Body, ColorRole::DarkText);
            blocks.push(Block {
                label: format!("certification '{}'", c.name),
                space_before: minimal,
                head: vec![self.paragraph(Tag::Certification(i), vec![span], TypeRole::Body)],
                tail: Vec::new(),
            });
        }
        blocks
    }

    fn additional(&self) -> Block {
        let mut paras = Vec::new();
        if let Some(extra) = &self.view.additional {
            if !extra.earlier_roles.is_empty() {
                let roles = extra
                    .earlier_roles
                    .iter()
                    .map(|r| r.line())
                    .collect::<Vec<_>>()
                    .join("; ");
                let spans = vec![
                    self.span("Earlier roles: ", Face::Bold, TypeRole::Body, ColorRole::MediumText),
                    self.span(&roles, Face::Base, TypeRole::Body, ColorRole::DarkText),
                ];
                paras.push(self.paragraph(Tag::AdditionalLine(paras.len()), spans, TypeRole::Body));
            }
            if let Some(site) = &extra.website {
                let spans = vec![
                    self.span("Portfolio: ", Face::Bold, TypeRole::Body, ColorRole::MediumText),
                    self.span(site, Face::Base, TypeRole::Body, ColorRole::Link)
                        .linked(link_target(site)),
                ];
                paras.push(self.paragraph(Tag::AdditionalLine(paras.len()), spans, TypeRole::Body));
            }
        }
        Block {
            label: "additional information".to_string(),
            space_before: 0.0,
            head: paras,
            tail: Vec::new(),
        }
    }

    fn technical_skills(&self) -> Block {
        let tail = self
            .view
            .skills
            .iter()
            .enumerate()
            .filter(|(_, g)| !g.entries.is_empty())
            .map(|(i, group)| {
                let mut spans = vec![self.span(
                    &format!("{}: ", group.name),
                    Face::Bold,
                    TypeRole::MainCompetency,
                    ColorRole::CompetencyHeader,
                )];
                for (j, entry) in group.entries.iter().enumerate() {
                    if j > 0 {
                        spans.push(self.span("; ", Face::Base, TypeRole::CompetencyDetail, ColorRole::MediumText));
                    }
                    match &entry.name {
                        Some(name) => {
                            spans.push(self.span(name, Face::Italic, TypeRole::SubCompetency, ColorRole::Accent));
                            if !entry.detail.is_empty() {
                                spans.push(self.span(
                                    &format!(" ({})", entry.detail),
                                    Face::Base,
                                    TypeRole::CompetencyDetail,
                                    ColorRole::MediumText,
                                ));
                            }
                        }
                        None => spans.push(self.span(
                            &entry.detail,
                            Face::Base,
                            TypeRole::CompetencyDetail,
                            ColorRole::MediumText,
                        )),
                    }
                }
                let mut para = self.paragraph(Tag::SkillCategory(i), spans, TypeRole::SubCompetency);
                para.splittable = true;
                para.space_before = self.space(SpacingLevel::Tiny);
                para
            })
            .collect();

        Block {
            label: "technical skills".to_string(),
            space_before: 0.0,
            head: Vec::new(),
            tail,
        }
    }

    // ── Building blocks ────────────────────────────────────────────────────

    fn heading(&self, kind: SectionKind) -> Paragraph {
        let span = self.span(kind.title(), Face::Bold, TypeRole::SectionHeader, ColorRole::SectionHeader);
        let mut para = self.paragraph(Tag::SectionHeading(kind), vec![span], TypeRole::SectionHeader);
        para.rule_below = Some(RuleBelow {
            color: self.style.colors.get(ColorRole::SectionHeader),
            thickness: self.style.layout.section_rule_thickness,
            width: self.style.layout.content_width(),
            gap: self.space(SpacingLevel::Small),
            drop: self.space(SpacingLevel::Tiny),
        });
        para
    }

    fn single(&self, label: &str, para: Paragraph) -> Block {
        Block {
            label: label.to_string(),
            space_before: 0.0,
            head: vec![para],
            tail: Vec::new(),
        }
    }

    fn bullet(&self, tag: Tag, text: &str) -> Paragraph {
        let indent = self.style.layout.bullet_indent;
        let span = self.span(text, Face::Base, TypeRole::Bullet, ColorRole::DarkText);
        let mut para = self.indented(tag, vec![span], TypeRole::Bullet, indent);
        let glyph = self.span("\u{2022}", Face::Base, TypeRole::Bullet, ColorRole::Accent);
        let glyph_x = self.style.layout.margin_left + self.space(SpacingLevel::Minimal);
        para.bullet = Some((glyph_x, glyph));
        para
    }

    fn paragraph(&self, tag: Tag, spans: Vec<Span>, role: TypeRole) -> Paragraph {
        self.indented(tag, spans, role, 0.0)
    }

    fn indented(&self, tag: Tag, spans: Vec<Span>, role: TypeRole, indent: f32) -> Paragraph {
        let layout = &self.style.layout;
        let size = self.style.typography.size(role);
        let line_height = self.style.typography.line_height(role);
        let ascent = get_metrics(self.style.typography.base_font).ascent_pt(size);

        Paragraph {
            tag,
            lines: wrap_spans(&spans, layout.content_width() - indent),
            x: layout.margin_left + indent,
            line_height,
            baseline_offset: (line_height - size) / 2.0 + ascent,
            space_before: 0.0,
            bullet: None,
            rule_below: None,
            splittable: false,
        }
    }

    fn span(&self, text: &str, face: Face, role: TypeRole, color: ColorRole) -> Span {
        let t = &self.style.typography;
        let font: StandardFont = match face {
            Face::Base => t.base_font,
            Face::Bold => t.bold_font,
            Face::Italic => t.italic_font,
        };
        Span::new(text, font, t.size(role), self.style.colors.get(color))
    }

    fn space(&self, level: SpacingLevel) -> f32 {
        self.style.spacing.get(level)
    }
}

/// Adds `https://` to bare host names so viewers treat them as web links.
pub fn link_target(url: &str) -> String {
    let url = url.trim();
    if url.contains("://") || url.starts_with("mailto:") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::make_view;
    use crate::models::view::{Audience, Length};
    use crate::theme::{resolve, SchemeCatalogue, ThemeName};

    fn make_style() -> StyleBundle {
        resolve(&SchemeCatalogue::builtin(), "corporate_blue", ThemeName::Classic).unwrap()
    }

    fn tags(paras: &[Paragraph]) -> Vec<Tag> {
        paras.iter().map(|p| p.tag).collect()
    }

    #[test]
    fn test_short_position_is_fully_atomic() {
        let view = make_view(Length::Full, Audience::Human);
        let style = make_style();
        let blocks = Composer::new(&view, &style).section(SectionKind::Experience);
        // initech: 4 bullets, most recent, so first
        assert_eq!(view.positions[0].responsibilities.len(), 4);
        assert!(blocks[0].tail.is_empty());
        assert_eq!(blocks[0].head.len(), 1 + 1 + 1 + 4, "heading, employer, subtitle, 4 bullets");
    }

    #[test]
    fn test_long_position_splits_after_first_bullet() {
        let view = make_view(Length::Full, Audience::Human);
        let style = make_style();
        let blocks = Composer::new(&view, &style).section(SectionKind::Experience);
        let (i, globex) = view
            .positions
            .iter()
            .enumerate()
            .find(|(_, p)| p.employer == "Globex")
            .unwrap();
        assert_eq!(globex.responsibilities.len(), 6);
        let block = &blocks[i];
        assert_eq!(
            tags(&block.head),
            vec![Tag::EmployerLine(i), Tag::Responsibility(i, 0)]
        );
        assert_eq!(block.tail.len(), 5);
        assert!(block.tail.iter().all(|p| !p.splittable), "bullets never split");
    }

    #[test]
    fn test_heading_rides_with_first_block() {
        let view = make_view(Length::Full, Audience::Human);
        let style = make_style();
        let blocks = Composer::new(&view, &style).section(SectionKind::Projects);
        assert_eq!(blocks[0].head[0].tag, Tag::SectionHeading(SectionKind::Projects));
        assert_eq!(blocks[0].head[1].tag, Tag::ProjectTitle(0));
        assert!(blocks.iter().all(|b| b.tail.is_empty()), "projects are atomic");
    }

    #[test]
    fn test_technical_skills_flow() {
        let view = make_view(Length::Full, Audience::Human);
        let style = make_style();
        let blocks = Composer::new(&view, &style).section(SectionKind::TechnicalSkills);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].head.len(), 1, "only the heading is held back");
        assert!(blocks[0].tail.iter().all(|p| p.splittable));
    }

    #[test]
    fn test_skills_paragraph_text() {
        let view = make_view(Length::Full, Audience::Human);
        let style = make_style();
        let blocks = Composer::new(&view, &style).section(SectionKind::TechnicalSkills);
        let text: String = blocks[0].tail[0]
            .lines
            .iter()
            .map(|l| l.text())
            .collect::<Vec<_>>()
            .join(" ");
        assert!(
            text.starts_with("Languages: Rust (async services, CLIs); Go (network services)"),
            "{text}"
        );
    }

    #[test]
    fn test_competencies_joined_with_bullets() {
        let view = make_view(Length::Full, Audience::Human);
        let style = make_style();
        let blocks = Composer::new(&view, &style).section(SectionKind::Competencies);
        let line = blocks[0].head[1].lines[0].text();
        assert_eq!(line, "Languages • Cloud Native • Tools");
    }

    #[test]
    fn test_keep_height_includes_first_tail_unit() {
        let view = make_view(Length::Full, Audience::Human);
        let style = make_style();
        let blocks = Composer::new(&view, &style).section(SectionKind::TechnicalSkills);
        let block = &blocks[0];
        let expected = block.head[0].content_height()
            + block.tail[0].space_before
            + block.tail[0].line_height;
        assert!((block.keep_height() - expected).abs() < 1e-3);
    }

    #[test]
    fn test_offsets_come_from_spacing_scale() {
        let view = make_view(Length::Full, Audience::Human);
        let style = make_style();
        let blocks = Composer::new(&view, &style).section(SectionKind::Experience);
        let heading = &blocks[0].head[0];
        let rule = heading.rule_below.unwrap();
        assert_eq!(rule.gap, style.spacing.get(SpacingLevel::Small));
        assert_eq!(rule.drop, style.spacing.get(SpacingLevel::Tiny));
        assert!(rule.drop < rule.gap);

        let bullet = blocks[0]
            .head
            .iter()
            .find(|p| matches!(p.tag, Tag::Responsibility(0, 0)))
            .unwrap();
        let (glyph_x, _) = bullet.bullet.as_ref().unwrap();
        let expected = style.layout.margin_left + style.spacing.get(SpacingLevel::Minimal);
        assert!((glyph_x - expected).abs() < 1e-3);
        assert!(*glyph_x < bullet.x, "glyph sits inside the indent");
    }

    #[test]
    fn test_link_target() {
        assert_eq!(link_target("jordan.dev"), "https://jordan.dev");
        assert_eq!(link_target("https://jordan.dev"), "https://jordan.dev");
        assert_eq!(link_target("mailto:a@b.c"), "mailto:a@b.c");
    }
}
