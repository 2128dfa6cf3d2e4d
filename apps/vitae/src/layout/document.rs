//! Laid-out document model and the top-level `compose` entry point.
//!
//! Output is a flat list of positioned items per page, in PDF user space
//! (origin bottom-left, points). The PDF writer is a straight translation of it.

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::layout::banner::{footer_band, footer_rule_y, header_band};
use crate::layout::blocks::{Composer, Tag};
use crate::layout::font_metrics::StandardFont;
use crate::layout::paginator::{Frame, Paginator};
use crate::models::view::View;
use crate::theme::colors::Rgb;
use crate::theme::StyleBundle;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("'{unit}' needs {needed:.1}pt but the content frame is {available:.1}pt tall")]
    Overflow {
        unit: String,
        needed: f32,
        available: f32,
    },

    #[error("layout cancelled")]
    Cancelled,
}

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    HeaderBand,
    FooterBand,
    SectionBar,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Text {
        x: f32,
        baseline: f32,
        text: String,
        face: StandardFont,
        size: f32,
        color: Rgb,
    },
    Rule {
        kind: RuleKind,
        x1: f32,
        x2: f32,
        y: f32,
        thickness: f32,
        color: Rgb,
    },
    /// Clickable rectangle `[x1, y1, x2, y2]`.
    Link { rect: [f32; 4], uri: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 1-based.
    pub number: usize,
    pub items: Vec<Item>,
}

/// Where a tagged paragraph line landed. Used to check keep-together rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub tag: Tag,
    /// 0-based page index.
    pub page: usize,
    pub line: usize,
    /// Top of the line box.
    pub top: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutDocument {
    pub page_width: f32,
    pub page_height: f32,
    pub pages: Vec<Page>,
    pub placements: Vec<Placement>,
    pub header_rule_y: f32,
    pub content_top: f32,
}

impl LaidOutDocument {
    /// Pages on which any line with `tag` was placed, in order.
    pub fn pages_of(&self, tag: Tag) -> Vec<usize> {
        let mut pages: Vec<usize> = self
            .placements
            .iter()
            .filter(|p| p.tag == tag)
            .map(|p| p.page)
            .collect();
        pages.dedup();
        pages
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Compose
// ────────────────────────────────────────────────────────────────────────────

/// Flows a validated view into pages.
///
/// Checks `cancel` between sections. CPU-bound: callers on the async runtime
/// run it on a blocking worker.
pub fn compose(
    view: &View,
    style: &StyleBundle,
    cancel: &CancellationToken,
) -> Result<LaidOutDocument, LayoutError> {
    let header = header_band(view, style);
    let frame = Frame {
        top: header.content_top,
        bottom: footer_rule_y(style) + style.spacing.small,
    };

    let composer = Composer::new(view, style);
    let mut paginator = Paginator::new(frame);

    for kind in view.sections() {
        if cancel.is_cancelled() {
            return Err(LayoutError::Cancelled);
        }
        for block in composer.section(kind) {
            paginator.place_block(&block)?;
        }
    }

    let (bodies, placements) = paginator.finish();
    let pages: Vec<Page> = bodies
        .into_iter()
        .enumerate()
        .map(|(i, body)| {
            let number = i + 1;
            let mut items = header.items.clone();
            items.extend(body);
            items.extend(footer_band(view, style, number));
            Page { number, items }
        })
        .collect();

    debug!(
        role = %view.role,
        scheme = %style.scheme,
        pages = pages.len(),
        header_rule_y = header.rule_y,
        "Document composed"
    );

    Ok(LaidOutDocument {
        page_width: style.layout.page_width,
        page_height: style.layout.page_height,
        pages,
        placements,
        header_rule_y: header.rule_y,
        content_top: header.content_top,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{make_master, make_roles, make_view};
    use crate::generation::{derive, DeriveOptions};
    use crate::models::view::{Audience, Length, SectionKind};
    use crate::theme::typography::TypeRole;
    use crate::theme::{resolve, SchemeCatalogue, ThemeName};

    fn make_style() -> StyleBundle {
        resolve(&SchemeCatalogue::builtin(), "corporate_blue", ThemeName::Classic).unwrap()
    }

    /// A view long enough to need several pages.
    fn make_long_view() -> View {
        let mut master = make_master();
        let template = master.positions["globex"].clone();
        let mut roles = make_roles();
        let mut keys = Vec::new();
        for i in 0..14 {
            let mut p = template.clone();
            p.employer = format!("Employer {i}");
            p.dates = format!("{} - {}", 2000 + i, 2001 + i).as_str().into();
            let key = format!("job{i}");
            master.positions.insert(key.clone(), p);
            keys.push(key);
        }
        let mut cfg = roles.get("backend").unwrap().clone();
        cfg.include_positions.extend(keys);
        cfg.max_responsibilities_per_job = 6;
        cfg.responsibility_overrides.clear();
        roles = crate::models::RoleRegistry::from_map(indexmap::IndexMap::from([(
            "backend".to_string(),
            cfg,
        )]))
        .unwrap();
        derive(
            &master,
            &roles,
            "backend",
            Length::Full,
            Audience::Human,
            DeriveOptions::default(),
        )
        .unwrap()
    }

    fn header_rules(doc: &LaidOutDocument) -> Vec<f32> {
        doc.pages
            .iter()
            .flat_map(|p| &p.items)
            .filter_map(|item| match item {
                Item::Rule {
                    kind: RuleKind::HeaderBand,
                    y,
                    ..
                } => Some(*y),
                _ => None,
            })
            .collect()
    }

    fn page_texts(page: &Page) -> Vec<&str> {
        page.items
            .iter()
            .filter_map(|item| match item {
                Item::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_pages_numbered_in_sequence_with_shared_frame() {
        let view = make_view(Length::Abbreviated, Audience::Human);
        let doc = compose(&view, &make_style(), &CancellationToken::new()).unwrap();
        assert!(!doc.pages.is_empty());
        for (i, page) in doc.pages.iter().enumerate() {
            assert_eq!(page.number, i + 1);
            let label = format!("Page {}", i + 1);
            assert!(page_texts(page).contains(&label.as_str()), "missing '{label}'");
        }
        let rules = header_rules(&doc);
        assert_eq!(rules.len(), doc.pages.len());
        assert!(rules.iter().all(|y| *y == doc.header_rule_y));
        assert!(doc.placements.iter().all(|p| p.page < doc.pages.len()));
    }

    #[test]
    fn test_small_view_fits_one_page() {
        let mut view = make_view(Length::Full, Audience::Human);
        view.positions.truncate(1);
        view.projects.clear();
        view.skills.clear();
        let doc = compose(&view, &make_style(), &CancellationToken::new()).unwrap();
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.pages[0].number, 1);
    }

    #[test]
    fn test_projects_heading_moves_with_tall_first_project() {
        const CM: f32 = 72.0 / 2.54;
        let style = make_style();
        let frame_bottom = footer_rule_y(&style) + style.spacing.small;
        let bullet_height = style.typography.line_height(TypeRole::Bullet);

        let mut base = make_view(Length::Full, Audience::Human);
        base.projects[0].technical_details = (1..=6)
            .map(|i| format!("Replay check {i} on every deploy"))
            .collect();

        // First project alone is about 4 cm tall.
        let blocks = Composer::new(&base, &style).section(SectionKind::Projects);
        let project_height: f32 = blocks[0]
            .head
            .iter()
            .filter(|p| matches!(p.tag, Tag::ProjectTitle(0) | Tag::ProjectBody(0)))
            .map(|p| p.space_before + p.content_height())
            .sum();
        assert!(
            (3.0 * CM..5.0 * CM).contains(&project_height),
            "first project is {project_height:.1}pt"
        );

        // Pad the oldest position one bullet at a time until Experience ends
        // about 2 cm above the bottom of the frame.
        let mut found = None;
        for extra in 0..80 {
            let mut view = base.clone();
            if let Some(last) = view.positions.last_mut() {
                last.responsibilities
                    .extend((0..extra).map(|i| format!("Kept batch job {i} green")));
            }
            let doc = compose(&view, &style, &CancellationToken::new()).unwrap();
            let at = doc
                .placements
                .iter()
                .position(|p| p.tag == Tag::SectionHeading(SectionKind::Projects))
                .unwrap();
            let prev = doc.placements[at - 1];
            let room = prev.top - bullet_height - frame_bottom;
            if (1.5 * CM..2.5 * CM).contains(&room) {
                found = Some((doc, prev));
                break;
            }
        }
        let (doc, prev) = found.expect("some padding leaves about 2 cm under Experience");
        assert!(matches!(prev.tag, Tag::Responsibility(..)));

        let heading = doc.pages_of(Tag::SectionHeading(SectionKind::Projects));
        assert_eq!(heading, vec![prev.page + 1], "heading should open the next page");
        assert_eq!(heading, doc.pages_of(Tag::ProjectTitle(0)));
        assert_eq!(heading, doc.pages_of(Tag::ProjectBody(0)));

        let top = doc
            .placements
            .iter()
            .find(|p| p.tag == Tag::SectionHeading(SectionKind::Projects))
            .unwrap()
            .top;
        assert!((top - doc.content_top).abs() < 1e-3);
    }

    #[test]
    fn test_header_rule_constant_across_pages() {
        let view = make_long_view();
        let doc = compose(&view, &make_style(), &CancellationToken::new()).unwrap();
        assert!(doc.pages.len() >= 2, "fixture should span pages");
        let rules = header_rules(&doc);
        assert_eq!(rules.len(), doc.pages.len(), "one header rule per page");
        assert!(rules.iter().all(|y| *y == doc.header_rule_y));
        assert!(doc.content_top < doc.header_rule_y);
    }

    #[test]
    fn test_position_atomicity_holds_everywhere() {
        let view = make_long_view();
        let doc = compose(&view, &make_style(), &CancellationToken::new()).unwrap();
        for (i, p) in view.positions.iter().enumerate() {
            let header_page = doc.pages_of(Tag::EmployerLine(i));
            assert_eq!(header_page.len(), 1);
            if let Some(first) = doc.pages_of(Tag::Responsibility(i, 0)).first() {
                assert_eq!(*first, header_page[0], "first bullet left its employer line ({i})");
            }
            if p.responsibilities.len() <= 4 {
                for j in 0..p.responsibilities.len() {
                    assert_eq!(doc.pages_of(Tag::Responsibility(i, j)), header_page);
                }
            }
        }
    }

    #[test]
    fn test_section_header_never_orphaned() {
        let view = make_long_view();
        let doc = compose(&view, &make_style(), &CancellationToken::new()).unwrap();
        let header = doc.pages_of(Tag::SectionHeading(SectionKind::Projects));
        let first_project = doc.pages_of(Tag::ProjectTitle(0));
        assert_eq!(header, first_project);
        for i in 0..view.projects.len() {
            let title = doc.pages_of(Tag::ProjectTitle(i));
            let body = doc.pages_of(Tag::ProjectBody(i));
            assert!(body.iter().all(|p| title.contains(p)), "project {i} split");
        }
    }

    #[test]
    fn test_positions_in_page_order_most_recent_first() {
        let view = make_long_view();
        let doc = compose(&view, &make_style(), &CancellationToken::new()).unwrap();
        let mut last = (0usize, f32::MAX);
        for i in 0..view.positions.len() {
            let place = doc
                .placements
                .iter()
                .find(|p| p.tag == Tag::EmployerLine(i))
                .unwrap();
            assert!(
                place.page > last.0 || (place.page == last.0 && place.top < last.1),
                "position {i} placed out of order"
            );
            last = (place.page, place.top);
        }
    }

    #[test]
    fn test_content_stays_inside_frame() {
        let view = make_long_view();
        let style = make_style();
        let doc = compose(&view, &style, &CancellationToken::new()).unwrap();
        let floor = footer_rule_y(&style);
        for place in &doc.placements {
            assert!(place.top <= doc.content_top + 1e-3);
            assert!(place.top > floor);
        }
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let view = make_view(Length::Full, Audience::Human);
        let err = compose(&view, &make_style(), &token).unwrap_err();
        assert!(matches!(err, LayoutError::Cancelled));
    }

    #[test]
    fn test_compose_deterministic() {
        let view = make_view(Length::Full, Audience::Ats);
        let style = resolve(&SchemeCatalogue::builtin(), "charcoal", ThemeName::Ats).unwrap();
        let a = compose(&view, &style, &CancellationToken::new()).unwrap();
        let b = compose(&view, &style, &CancellationToken::new()).unwrap();
        assert_eq!(a, b);
    }
}
