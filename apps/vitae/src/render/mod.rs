// Output emitters. PDF goes through the paginated layout; DOCX, RTF and
// Markdown render the same View through a flat, format-neutral outline.

pub mod docx;
pub mod markdown;
pub mod outline;
pub mod pdf;
pub mod rtf;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::layout::LayoutError;
use crate::models::view::{TagParseError, View};
use crate::theme::StyleBundle;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("PDF serialization failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("DOCX XML write failed: {0}")]
    Xml(String),

    #[error("DOCX package write failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("emission cancelled")]
    Cancelled,
}

// ────────────────────────────────────────────────────────────────────────────
// Formats
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputFormat {
    Pdf,
    Docx,
    Rtf,
    Markdown,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Pdf,
        OutputFormat::Docx,
        OutputFormat::Rtf,
        OutputFormat::Markdown,
    ];

    pub fn ext(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Docx => "docx",
            OutputFormat::Rtf => "rtf",
            OutputFormat::Markdown => "md",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ext())
    }
}

impl FromStr for OutputFormat {
    type Err = TagParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(OutputFormat::Pdf),
            "docx" => Ok(OutputFormat::Docx),
            "rtf" => Ok(OutputFormat::Rtf),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            _ => Err(TagParseError::new("format", s, "pdf, docx, rtf, md")),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Emitter seam
// ────────────────────────────────────────────────────────────────────────────

/// Document-level metadata. No clock is read during emission; a creation
/// date only appears when the caller supplies one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMetadata {
    pub title: String,
    pub author: String,
    pub creation_date: Option<DateTime<Utc>>,
}

impl DocumentMetadata {
    pub fn for_view(view: &View) -> Self {
        Self {
            title: format!("{} - {} resume", view.contact.name.trim(), view.role),
            author: view.contact.name.trim().to_string(),
            creation_date: None,
        }
    }

    pub fn with_creation_date(mut self, date: DateTime<Utc>) -> Self {
        self.creation_date = Some(date);
        self
    }
}

/// Everything one emission needs. Borrowed, so a shared view can feed many
/// emissions at once.
pub struct EmitContext<'a> {
    pub view: &'a View,
    pub style: &'a StyleBundle,
    pub metadata: &'a DocumentMetadata,
    pub cancel: &'a CancellationToken,
}

pub trait Emitter: Send + Sync {
    fn format(&self) -> OutputFormat;

    /// Renders the whole artifact into memory. Must be deterministic for a
    /// given context.
    fn emit(&self, ctx: &EmitContext<'_>) -> Result<Vec<u8>, EmitError>;
}

pub fn emitter_for(format: OutputFormat) -> Box<dyn Emitter> {
    match format {
        OutputFormat::Pdf => Box::new(pdf::PdfEmitter),
        OutputFormat::Docx => Box::new(docx::DocxEmitter),
        OutputFormat::Rtf => Box::new(rtf::RtfEmitter),
        OutputFormat::Markdown => Box::new(markdown::MarkdownEmitter),
    }
}
