//! Markdown emitter. Colors and sizes are dropped; bold and italic runs map
//! to emphasis, links to inline links.

use crate::render::outline::{outline, BlockKind, OutlineBlock, Run};
use crate::render::{EmitContext, EmitError, Emitter, OutputFormat};

pub struct MarkdownEmitter;

impl Emitter for MarkdownEmitter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }

    fn emit(&self, ctx: &EmitContext<'_>) -> Result<Vec<u8>, EmitError> {
        if ctx.cancel.is_cancelled() {
            return Err(EmitError::Cancelled);
        }
        Ok(render(&outline(ctx.view)).into_bytes())
    }
}

pub fn render(blocks: &[OutlineBlock]) -> String {
    let mut out = String::new();
    let mut prev: Option<BlockKind> = None;

    for block in blocks {
        // Keep consecutive bullets in one list; everything else is its own paragraph.
        let tight = matches!((prev, block.kind), (Some(BlockKind::Bullet), BlockKind::Bullet));
        if prev.is_some() && !tight {
            out.push('\n');
        }
        match block.kind {
            BlockKind::Name => {
                out.push_str("# ");
                out.push_str(&escape(&block.text()));
            }
            BlockKind::Heading(_) => {
                out.push_str("## ");
                out.push_str(&escape(&block.text()));
            }
            BlockKind::Entry => {
                out.push_str("### ");
                out.push_str(&plain_runs(&block.runs));
            }
            BlockKind::Bullet => {
                out.push_str("- ");
                out.push_str(&styled_runs(&block.runs));
            }
            BlockKind::Tagline | BlockKind::Subtitle => {
                let text = escape(block.text().trim());
                out.push('*');
                out.push_str(&text);
                out.push('*');
            }
            BlockKind::ContactLine | BlockKind::Paragraph => out.push_str(&styled_runs(&block.runs)),
        }
        out.push('\n');
        prev = Some(block.kind);
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

/// Headings carry their own weight, so only links survive.
fn plain_runs(runs: &[Run]) -> String {
    runs.iter().map(|r| link(r, escape(&r.text))).collect()
}

fn styled_runs(runs: &[Run]) -> String {
    runs.iter()
        .map(|r| {
            let marker = match (r.bold, r.italic) {
                (true, true) => "***",
                (true, false) => "**",
                (false, true) => "*",
                (false, false) => "",
            };
            link(r, emphasize(&escape(&r.text), marker))
        })
        .collect()
}

/// Wraps the trimmed core of `text` so surrounding spaces stay outside the
/// markers, which CommonMark requires.
fn emphasize(text: &str, marker: &str) -> String {
    let core = text.trim();
    if marker.is_empty() || core.is_empty() {
        return text.to_string();
    }
    let lead = &text[..text.len() - text.trim_start().len()];
    let trail = &text[text.trim_end().len()..];
    format!("{lead}{marker}{core}{marker}{trail}")
}

fn link(run: &Run, rendered: String) -> String {
    match &run.link {
        Some(uri) => format!("[{rendered}]({uri})"),
        None => rendered,
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '*' | '_' | '`' | '[' | ']' | '<' | '>' | '#') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
