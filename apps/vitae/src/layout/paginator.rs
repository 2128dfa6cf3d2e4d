//! Places composed blocks into fixed-height page frames.

use crate::layout::blocks::{Block, Paragraph};
use crate::layout::document::{Item, LayoutError, Placement, RuleKind};
use crate::layout::font_metrics::get_metrics;

/// Vertical extent available for body content on every page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub top: f32,
    pub bottom: f32,
}

impl Frame {
    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }
}

pub struct Paginator {
    frame: Frame,
    pages: Vec<Vec<Item>>,
    placements: Vec<Placement>,
    /// Top of the next line box.
    cursor: f32,
    /// Nothing placed on the current page yet.
    fresh: bool,
}

impl Paginator {
    pub fn new(frame: Frame) -> Self {
        Self {
            frame,
            pages: vec![Vec::new()],
            placements: Vec::new(),
            cursor: frame.top,
            fresh: true,
        }
    }

    /// Places one block, moving it to a new page when its head and first
    /// tail unit do not fit in what is left of the current one.
    pub fn place_block(&mut self, block: &Block) -> Result<(), LayoutError> {
        let keep = block.keep_height();
        if keep > self.frame.height() {
            return Err(LayoutError::Overflow {
                unit: block.label.clone(),
                needed: keep,
                available: self.frame.height(),
            });
        }
        if !self.fits(block.space_before + keep) {
            self.new_page();
        }
        self.skip(block.space_before);

        for (i, para) in block.head.iter().enumerate() {
            if i > 0 {
                self.skip(para.space_before);
            }
            self.emit_lines(para, 0..para.lines.len());
            self.emit_rule(para);
        }

        for (i, para) in block.tail.iter().enumerate() {
            let joined = i == 0 && !block.head.is_empty();
            self.place_tail(para, joined, &block.label)?;
        }
        Ok(())
    }

    /// Page bodies and line placements, in page order.
    pub fn finish(self) -> (Vec<Vec<Item>>, Vec<Placement>) {
        (self.pages, self.placements)
    }

    // ── Internal helpers ───────────────────────────────────────────────────

    /// `joined` paragraphs were already guaranteed room by `place_block`.
    fn place_tail(&mut self, para: &Paragraph, joined: bool, label: &str) -> Result<(), LayoutError> {
        if para.splittable {
            for line in 0..para.lines.len() {
                let gap = if line == 0 { para.space_before } else { 0.0 };
                if !(joined && line == 0) && !self.fits(gap + para.line_height) {
                    self.new_page();
                }
                self.skip(gap);
                self.emit_lines(para, line..line + 1);
            }
            self.emit_rule(para);
            return Ok(());
        }

        let height = para.content_height();
        if height > self.frame.height() {
            return Err(LayoutError::Overflow {
                unit: label.to_string(),
                needed: height,
                available: self.frame.height(),
            });
        }
        if !joined && !self.fits(para.space_before + height) {
            self.new_page();
        }
        self.skip(para.space_before);
        self.emit_lines(para, 0..para.lines.len());
        self.emit_rule(para);
        Ok(())
    }

    /// Room for `height` more points below the cursor. Leading space is free
    /// at the top of a page because `skip` drops it there.
    fn fits(&self, height: f32) -> bool {
        self.fresh || self.cursor - height >= self.frame.bottom - 1e-3
    }

    fn skip(&mut self, gap: f32) {
        if !self.fresh {
            self.cursor -= gap;
        }
    }

    fn new_page(&mut self) {
        if self.fresh {
            return;
        }
        self.pages.push(Vec::new());
        self.cursor = self.frame.top;
        self.fresh = true;
    }

    fn emit_lines(&mut self, para: &Paragraph, range: std::ops::Range<usize>) {
        let page = self.pages.len() - 1;
        for idx in range {
            let Some(line) = para.lines.get(idx) else {
                continue;
            };
            let top = self.cursor;
            let baseline = top - para.baseline_offset;
            let mut items = Vec::with_capacity(line.fragments.len() + 1);

            if idx == 0 {
                if let Some((x, glyph)) = &para.bullet {
                    items.push(Item::Text {
                        x: *x,
                        baseline,
                        text: glyph.text.clone(),
                        face: glyph.face,
                        size: glyph.size,
                        color: glyph.color,
                    });
                }
            }

            for frag in &line.fragments {
                let x = para.x + frag.x;
                items.push(Item::Text {
                    x,
                    baseline,
                    text: frag.text.clone(),
                    face: frag.face,
                    size: frag.size,
                    color: frag.color,
                });
                if let Some(uri) = &frag.link {
                    let metrics = get_metrics(frag.face);
                    items.push(Item::Link {
                        rect: [
                            x,
                            baseline - metrics.descent_pt(frag.size),
                            x + frag.width,
                            baseline + metrics.ascent_pt(frag.size),
                        ],
                        uri: uri.clone(),
                    });
                }
            }

            if let Some(body) = self.pages.last_mut() {
                body.extend(items);
            }
            self.placements.push(Placement {
                tag: para.tag,
                page,
                line: idx,
                top,
            });
            self.cursor -= para.line_height;
            self.fresh = false;
        }
    }

    fn emit_rule(&mut self, para: &Paragraph) {
        let Some(rule) = para.rule_below else {
            return;
        };
        let y = self.cursor - rule.drop;
        if let Some(body) = self.pages.last_mut() {
            body.push(Item::Rule {
                kind: RuleKind::SectionBar,
                x1: para.x,
                x2: para.x + rule.width,
                y,
                thickness: rule.thickness,
                color: rule.color,
            });
        }
        self.cursor -= rule.gap;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
