//! RTF emitter: one color table entry per color role, font sizes from the
//! type scale, hyperlinks as `HYPERLINK` fields.

use std::fmt::Write as _;

use chrono::{Datelike, Timelike};

use crate::render::outline::{outline, BlockKind, OutlineBlock, Run};
use crate::render::{DocumentMetadata, EmitContext, EmitError, Emitter, OutputFormat};
use crate::theme::colors::ColorRole;
use crate::theme::spacing::SpacingLevel;
use crate::theme::StyleBundle;

pub struct RtfEmitter;

impl Emitter for RtfEmitter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Rtf
    }

    fn emit(&self, ctx: &EmitContext<'_>) -> Result<Vec<u8>, EmitError> {
        if ctx.cancel.is_cancelled() {
            return Err(EmitError::Cancelled);
        }
        Ok(render(&outline(ctx.view), ctx.style, ctx.metadata).into_bytes())
    }
}

pub fn render(blocks: &[OutlineBlock], style: &StyleBundle, metadata: &DocumentMetadata) -> String {
    let mut out = String::from("{\\rtf1\\ansi\\ansicpg1252\\deff0\n");
    let t = &style.typography;
    let _ = writeln!(
        out,
        "{{\\fonttbl{{\\f0\\fswiss {};}}{{\\f1\\fswiss {};}}{{\\f2\\fswiss {};}}}}",
        t.base_font.pdf_name(),
        t.bold_font.pdf_name(),
        t.italic_font.pdf_name()
    );

    out.push_str("{\\colortbl ;");
    for role in ColorRole::ALL {
        let c = style.colors.get(role);
        let _ = write!(out, "\\red{}\\green{}\\blue{};", c.r, c.g, c.b);
    }
    out.push_str("}\n");

    out.push_str("{\\info");
    let _ = write!(out, "{{\\title {}}}{{\\author {}}}", escape(&metadata.title), escape(&metadata.author));
    if let Some(d) = metadata.creation_date {
        let _ = write!(
            out,
            "{{\\creatim\\yr{}\\mo{}\\dy{}\\hr{}\\min{}}}",
            d.year(),
            d.month(),
            d.day(),
            d.hour(),
            d.minute()
        );
    }
    out.push_str("}\n");

    let layout = &style.layout;
    let _ = writeln!(
        out,
        "\\paperw{}\\paperh{}\\margl{}\\margr{}\\margt{}\\margb{}",
        twips(layout.page_width),
        twips(layout.page_height),
        twips(layout.margin_left),
        twips(layout.margin_right),
        twips(layout.margin_top),
        twips(layout.margin_bottom)
    );

    let small = twips(style.spacing.get(SpacingLevel::Small));
    let tiny = twips(style.spacing.get(SpacingLevel::Tiny));
    let indent = twips(layout.bullet_indent);

    for block in blocks {
        out.push_str("{\\pard");
        match block.kind {
            BlockKind::Name => out.push_str("\\qr"),
            BlockKind::Tagline | BlockKind::ContactLine => {
                let _ = write!(out, "\\qr\\sa{small}");
            }
            BlockKind::Heading(_) => {
                let _ = write!(out, "\\sb{}\\sa{tiny}\\brdrb\\brdrs\\brdrw10", small * 2);
            }
            BlockKind::Entry => {
                let _ = write!(out, "\\sb{small}\\keepn");
            }
            BlockKind::Subtitle => out.push_str("\\keepn"),
            BlockKind::Paragraph => {
                let _ = write!(out, "\\sa{tiny}");
            }
            BlockKind::Bullet => {
                let _ = write!(out, "\\fi-{indent}\\li{indent}\\tx{indent}");
            }
        }
        out.push(' ');
        if block.kind == BlockKind::Bullet {
            let accent = color_index(ColorRole::Accent);
            let _ = write!(out, "{{\\cf{accent}\\bullet}}\\tab ");
        }
        for run in &block.runs {
            write_run(&mut out, run, style);
        }
        out.push_str("\\par}\n");
    }

    out.push('}');
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

fn write_run(out: &mut String, run: &Run, style: &StyleBundle) {
    let font = match (run.bold, run.italic) {
        (true, _) => 1,
        (false, true) => 2,
        (false, false) => 0,
    };
    let mut group = format!(
        "{{\\f{font}\\fs{}\\cf{}",
        (style.typography.size(run.size) * 2.0).round() as u32,
        color_index(run.color)
    );
    if run.bold {
        group.push_str("\\b");
    }
    if run.italic {
        group.push_str("\\i");
    }
    group.push(' ');
    group.push_str(&escape(&run.text));
    group.push('}');

    match &run.link {
        Some(uri) => {
            let _ = write!(
                out,
                "{{\\field{{\\*\\fldinst{{HYPERLINK \"{}\"}}}}{{\\fldrslt{group}}}}}",
                escape(uri)
            );
        }
        None => out.push_str(&group),
    }
}

/// 1-based index into the color table; 0 is the automatic color.
fn color_index(role: ColorRole) -> usize {
    ColorRole::ALL
        .iter()
        .position(|r| *r == role)
        .map_or(0, |i| i + 1)
}

fn twips(points: f32) -> i32 {
    (points * 20.0).round() as i32
}

/// Escapes control characters; non-ASCII goes out as `\uN?`.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\line "),
            '\t' => out.push_str("\\tab "),
            c if c.is_ascii() => out.push(c),
            c => {
                let mut buf = [0u16; 2];
                for unit in c.encode_utf16(&mut buf) {
                    let _ = write!(out, "\\u{}?", *unit as i16);
                }
            }
        }
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
