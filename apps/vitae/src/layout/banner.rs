//! Header and footer bands repeated on every page.
//!
//! The header is a two-column table: contact details on the left, name,
//! tagline and location right-aligned. The header rule sits one body line
//! height below the lowest baseline of the taller column, so its y is fixed
//! per document and identical on every page.

use crate::layout::blocks::link_target;
use crate::layout::document::{Item, RuleKind};
use crate::layout::font_metrics::get_metrics;
use crate::layout::text::Span;
use crate::models::view::View;
use crate::theme::colors::ColorRole;
use crate::theme::typography::TypeRole;
use crate::theme::StyleBundle;

pub struct HeaderBand {
    pub items: Vec<Item>,
    pub rule_y: f32,
    /// First body line top.
    pub content_top: f32,
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

/// One header cell line: spans drawn back to back.
struct Row {
    spans: Vec<Span>,
    role: TypeRole,
}

pub fn header_band(view: &View, style: &StyleBundle) -> HeaderBand {
    let layout = &style.layout;
    let left = left_rows(view, style);
    let right = right_rows(view, style);

    let mut items = Vec::new();
    let mut top = layout.page_height - layout.margin_top;
    let body_height = style.typography.line_height(TypeRole::Body);
    let mut lowest_baseline = top;

    for i in 0..left.len().max(right.len()) {
        let mut row_height = body_height;
        for (rows, align) in [(&left, Align::Left), (&right, Align::Right)] {
            let Some(row) = rows.get(i) else {
                continue;
            };
            row_height = row_height.max(style.typography.line_height(row.role));
            let baseline = draw_row(&mut items, row, align, top, style);
            lowest_baseline = lowest_baseline.min(baseline);
        }
        top -= row_height;
    }

    // One body line height below the baseline of the lowest text line in
    // either column.
    let rule_y = lowest_baseline - body_height;
    items.push(Item::Rule {
        kind: RuleKind::HeaderBand,
        x1: layout.margin_left,
        x2: layout.right_edge(),
        y: rule_y,
        thickness: layout.header_rule_thickness,
        color: style.colors.get(ColorRole::SectionHeader),
    });

    HeaderBand {
        items,
        rule_y,
        content_top: rule_y - style.spacing.get(layout.header_to_content),
    }
}

/// y of the footer rule; body content never goes below it.
pub fn footer_rule_y(style: &StyleBundle) -> f32 {
    style.layout.margin_bottom
}

pub fn footer_band(view: &View, style: &StyleBundle, page_number: usize) -> Vec<Item> {
    let layout = &style.layout;
    let y = footer_rule_y(style);
    let mut items = vec![Item::Rule {
        kind: RuleKind::FooterBand,
        x1: layout.margin_left,
        x2: layout.right_edge(),
        y,
        thickness: layout.footer_rule_thickness,
        color: style.colors.get(ColorRole::LightText),
    }];

    let baseline = y - layout.footer_text_offset;
    let size = style.typography.size(TypeRole::Footer);
    let t = &style.typography;
    let label = |text: &str| Span::new(text, t.base_font, size, style.colors.get(ColorRole::MediumText));
    let link = |text: &str| {
        Span::new(text, t.base_font, size, style.colors.get(ColorRole::Link)).linked(link_target(text))
    };

    let mut spans = Vec::new();
    let contact = &view.contact;
    for (name, value) in [("Site: ", &contact.website), ("LinkedIn: ", &contact.linkedin)] {
        let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) else {
            continue;
        };
        if !spans.is_empty() {
            spans.push(label(" | "));
        }
        spans.push(label(name));
        spans.push(link(value.trim()));
    }

    let mut x = layout.margin_left;
    for span in &spans {
        x += draw_span(&mut items, span, x, baseline);
    }

    let page = label(&format!("Page {page_number}"));
    draw_span(&mut items, &page, layout.right_edge() - page.width(), baseline);
    items
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

fn left_rows(view: &View, style: &StyleBundle) -> Vec<Row> {
    let c = &view.contact;
    let t = &style.typography;
    let size = t.size(TypeRole::Body);
    let text = style.colors.get(ColorRole::MediumText);
    let link = style.colors.get(ColorRole::Link);

    let mut rows = Vec::new();
    if !c.email.trim().is_empty() {
        let email = c.email.trim();
        rows.push(Row {
            spans: vec![Span::new(email, t.base_font, size, link).linked(format!("mailto:{email}"))],
            role: TypeRole::Body,
        });
    }
    if let Some(phone) = c.phone.as_deref().filter(|p| !p.trim().is_empty()) {
        rows.push(Row {
            spans: vec![Span::new(phone.trim(), t.base_font, size, text)],
            role: TypeRole::Body,
        });
    }
    if let Some(gh) = c.github.as_deref().filter(|g| !g.trim().is_empty()) {
        rows.push(Row {
            spans: vec![
                Span::new("GitHub: ", t.base_font, size, text),
                Span::new(gh.trim(), t.base_font, size, link).linked(link_target(gh)),
            ],
            role: TypeRole::Body,
        });
    }
    rows
}

fn right_rows(view: &View, style: &StyleBundle) -> Vec<Row> {
    let c = &view.contact;
    let t = &style.typography;
    let color = |role| style.colors.get(role);

    let mut rows = vec![Row {
        spans: vec![Span::new(
            c.name.trim(),
            t.bold_font,
            t.size(TypeRole::Name),
            color(ColorRole::Name),
        )],
        role: TypeRole::Name,
    }];
    if let Some(tagline) = c.tagline.as_deref().filter(|s| !s.trim().is_empty()) {
        rows.push(Row {
            spans: vec![Span::new(
                tagline.trim(),
                t.italic_font,
                t.size(TypeRole::Title),
                color(ColorRole::Title),
            )],
            role: TypeRole::Title,
        });
    }
    if let Some(loc) = c.location.as_deref().filter(|s| !s.trim().is_empty()) {
        let size = t.size(TypeRole::Body);
        let span = match c.location_url.as_deref().filter(|u| !u.trim().is_empty()) {
            Some(url) => Span::new(loc.trim(), t.base_font, size, color(ColorRole::Link)).linked(link_target(url)),
            None => Span::new(loc.trim(), t.base_font, size, color(ColorRole::MediumText)),
        };
        rows.push(Row {
            spans: vec![span],
            role: TypeRole::Body,
        });
    }
    rows
}

/// Draws one row whose line box starts at `top`; returns its baseline.
fn draw_row(items: &mut Vec<Item>, row: &Row, align: Align, top: f32, style: &StyleBundle) -> f32 {
    let height = style.typography.line_height(row.role);
    let size = style.typography.size(row.role);
    let ascent = get_metrics(style.typography.base_font).ascent_pt(size);
    let baseline = top - (height - size) / 2.0 - ascent;

    let width: f32 = row.spans.iter().map(Span::width).sum();
    let mut x = match align {
        Align::Left => style.layout.margin_left,
        Align::Right => style.layout.right_edge() - width,
    };
    for span in &row.spans {
        x += draw_span(items, span, x, baseline);
    }
    baseline
}

/// Pushes one span and its link annotation; returns the advance.
fn draw_span(items: &mut Vec<Item>, span: &Span, x: f32, baseline: f32) -> f32 {
    let width = span.width();
    items.push(Item::Text {
        x,
        baseline,
        text: span.text.clone(),
        face: span.face,
        size: span.size,
        color: span.color,
    });
    if let Some(uri) = &span.link {
        let m = get_metrics(span.face);
        items.push(Item::Link {
            rect: [
                x,
                baseline - m.descent_pt(span.size),
                x + width,
                baseline + m.ascent_pt(span.size),
            ],
            uri: uri.clone(),
        });
    }
    width
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
