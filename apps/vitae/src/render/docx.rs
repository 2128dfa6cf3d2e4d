//! DOCX emitter: a minimal WordprocessingML package written with `quick-xml`
//! and stored (uncompressed, fixed timestamps) with `zip`, so identical input
//! produces identical bytes.

use std::io::{Cursor, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::render::outline::{outline, BlockKind, OutlineBlock, Run};
use crate::render::{DocumentMetadata, EmitContext, EmitError, Emitter, OutputFormat};
use crate::theme::colors::ColorRole;
use crate::theme::spacing::SpacingLevel;
use crate::theme::typography::TypeRole;
use crate::theme::StyleBundle;

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const REL_HYPERLINK: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
const REL_STYLES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

pub struct DocxEmitter;

impl Emitter for DocxEmitter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Docx
    }

    fn emit(&self, ctx: &EmitContext<'_>) -> Result<Vec<u8>, EmitError> {
        if ctx.cancel.is_cancelled() {
            return Err(EmitError::Cancelled);
        }
        let blocks = outline(ctx.view);
        let (document, links) = document_xml(&blocks, ctx.style)?;

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .last_modified_time(zip::DateTime::default());
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        let parts: [(&str, Vec<u8>); 6] = [
            ("[Content_Types].xml", CONTENT_TYPES.as_bytes().to_vec()),
            ("_rels/.rels", ROOT_RELS.as_bytes().to_vec()),
            ("docProps/core.xml", core_xml(ctx.metadata)?),
            ("word/_rels/document.xml.rels", document_rels(&links)?),
            ("word/styles.xml", styles_xml(ctx.style)?),
            ("word/document.xml", document),
        ];
        for (name, bytes) in parts {
            zip.start_file(name, options)?;
            zip.write_all(&bytes)?;
        }
        Ok(zip.finish()?.into_inner())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// XML writer wrapper
// ────────────────────────────────────────────────────────────────────────────

struct Xml {
    writer: Writer<Vec<u8>>,
}

impl Xml {
    fn new() -> Result<Self, EmitError> {
        let mut xml = Self {
            writer: Writer::new(Vec::new()),
        };
        xml.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(xml)
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), EmitError> {
        self.writer
            .write_event(event)
            .map_err(|e| EmitError::Xml(e.to_string()))
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), EmitError> {
        let tag = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.event(Event::Start(tag))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), EmitError> {
        let tag = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.event(Event::Empty(tag))
    }

    fn end(&mut self, name: &str) -> Result<(), EmitError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn text(&mut self, text: &str) -> Result<(), EmitError> {
        self.event(Event::Text(BytesText::new(text)))
    }

    fn element(&mut self, name: &str, text: &str) -> Result<(), EmitError> {
        self.start(name, &[])?;
        self.text(text)?;
        self.end(name)
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Parts
// ────────────────────────────────────────────────────────────────────────────

/// Paragraph style id per outline block kind.
fn style_id(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::Name => "Title",
        BlockKind::Tagline => "Subtitle",
        BlockKind::ContactLine => "Contact",
        BlockKind::Heading(_) => "Heading1",
        BlockKind::Entry => "Heading2",
        BlockKind::Subtitle => "EntrySubtitle",
        BlockKind::Paragraph => "Normal",
        BlockKind::Bullet => "ListBullet",
    }
}

/// Returns the document part and the hyperlink targets, in relationship order.
fn document_xml(blocks: &[OutlineBlock], style: &StyleBundle) -> Result<(Vec<u8>, Vec<String>), EmitError> {
    let mut xml = Xml::new()?;
    let mut links: Vec<String> = Vec::new();

    xml.start("w:document", &[("xmlns:w", NS_W), ("xmlns:r", NS_R)])?;
    xml.start("w:body", &[])?;

    for block in blocks {
        xml.start("w:p", &[])?;
        xml.start("w:pPr", &[])?;
        xml.empty("w:pStyle", &[("w:val", style_id(block.kind))])?;
        xml.end("w:pPr")?;

        if block.kind == BlockKind::Bullet {
            let bullet = Run {
                text: "\u{2022}\t".to_string(),
                bold: false,
                italic: false,
                color: ColorRole::Accent,
                size: TypeRole::Bullet,
                link: None,
            };
            write_run(&mut xml, &bullet, style)?;
        }

        for run in &block.runs {
            match &run.link {
                Some(uri) => {
                    links.push(uri.clone());
                    let id = format!("rIdLink{}", links.len());
                    xml.start("w:hyperlink", &[("r:id", id.as_str()), ("w:history", "1")])?;
                    write_run(&mut xml, run, style)?;
                    xml.end("w:hyperlink")?;
                }
                None => write_run(&mut xml, run, style)?,
            }
        }
        xml.end("w:p")?;
    }

    let layout = &style.layout;
    xml.start("w:sectPr", &[])?;
    let (w, h) = (twips(layout.page_width), twips(layout.page_height));
    xml.empty("w:pgSz", &[("w:w", w.as_str()), ("w:h", h.as_str())])?;
    let margins = [
        ("w:top", twips(layout.margin_top)),
        ("w:right", twips(layout.margin_right)),
        ("w:bottom", twips(layout.margin_bottom)),
        ("w:left", twips(layout.margin_left)),
    ];
    let attrs: Vec<(&str, &str)> = margins.iter().map(|(k, v)| (*k, v.as_str())).collect();
    xml.empty("w:pgMar", &attrs)?;
    xml.end("w:sectPr")?;

    xml.end("w:body")?;
    xml.end("w:document")?;
    Ok((xml.finish(), links))
}

fn write_run(xml: &mut Xml, run: &Run, style: &StyleBundle) -> Result<(), EmitError> {
    let t = &style.typography;
    let half_points = ((t.size(run.size) * 2.0).round() as u32).to_string();
    let color = style.colors.get(run.color).hex();

    xml.start("w:r", &[])?;
    xml.start("w:rPr", &[])?;
    xml.empty("w:rFonts", &[("w:ascii", FONT_FAMILY), ("w:hAnsi", FONT_FAMILY)])?;
    if run.bold {
        xml.empty("w:b", &[])?;
    }
    if run.italic {
        xml.empty("w:i", &[])?;
    }
    xml.empty("w:color", &[("w:val", color.as_str())])?;
    xml.empty("w:sz", &[("w:val", half_points.as_str())])?;
    xml.end("w:rPr")?;

    // Tabs are their own element; text runs keep surrounding spaces.
    for (i, piece) in run.text.split('\t').enumerate() {
        if i > 0 {
            xml.empty("w:tab", &[])?;
        }
        if !piece.is_empty() {
            xml.start("w:t", &[("xml:space", "preserve")])?;
            xml.text(piece)?;
            xml.end("w:t")?;
        }
    }
    xml.end("w:r")
}

fn styles_xml(style: &StyleBundle) -> Result<Vec<u8>, EmitError> {
    let mut xml = Xml::new()?;
    xml.start("w:styles", &[("xmlns:w", NS_W)])?;

    xml.start("w:docDefaults", &[])?;
    xml.start("w:rPrDefault", &[])?;
    xml.start("w:rPr", &[])?;
    xml.empty("w:rFonts", &[("w:ascii", FONT_FAMILY), ("w:hAnsi", FONT_FAMILY)])?;
    xml.end("w:rPr")?;
    xml.end("w:rPrDefault")?;
    xml.end("w:docDefaults")?;

    let tiny = twips(style.spacing.get(SpacingLevel::Tiny));
    let small = twips(style.spacing.get(SpacingLevel::Small));
    let medium = twips(style.spacing.get(SpacingLevel::Medium));
    let indent = twips(style.layout.bullet_indent);

    let defs: [(&str, &str, TypeRole, ColorRole, &str, &str, Option<&str>); 8] = [
        ("Normal", "Normal", TypeRole::Body, ColorRole::DarkText, "0", tiny.as_str(), None),
        ("Title", "Title", TypeRole::Name, ColorRole::Name, "0", "0", Some("right")),
        ("Subtitle", "Subtitle", TypeRole::Title, ColorRole::Title, "0", "0", Some("right")),
        ("Contact", "Contact", TypeRole::Body, ColorRole::MediumText, "0", small.as_str(), Some("right")),
        ("Heading1", "heading 1", TypeRole::SectionHeader, ColorRole::SectionHeader, medium.as_str(), tiny.as_str(), None),
        ("Heading2", "heading 2", TypeRole::Company, ColorRole::Company, small.as_str(), "0", None),
        ("EntrySubtitle", "Entry Subtitle", TypeRole::Body, ColorRole::Subtitle, "0", "0", None),
        ("ListBullet", "List Bullet", TypeRole::Bullet, ColorRole::DarkText, "0", "0", None),
    ];

    for (id, name, size, color, before, after, align) in defs {
        xml.start("w:style", &[("w:type", "paragraph"), ("w:styleId", id)])?;
        xml.empty("w:name", &[("w:val", name)])?;
        if id != "Normal" {
            xml.empty("w:basedOn", &[("w:val", "Normal")])?;
        }
        xml.start("w:pPr", &[])?;
        if matches!(id, "Heading1" | "Heading2" | "EntrySubtitle") {
            xml.empty("w:keepNext", &[])?;
        }
        if id == "Heading1" {
            let color = style.colors.get(ColorRole::SectionHeader).hex();
            xml.start("w:pBdr", &[])?;
            xml.empty(
                "w:bottom",
                &[("w:val", "single"), ("w:sz", "4"), ("w:space", "1"), ("w:color", color.as_str())],
            )?;
            xml.end("w:pBdr")?;
        }
        xml.empty("w:spacing", &[("w:before", before), ("w:after", after)])?;
        if id == "ListBullet" {
            xml.start("w:tabs", &[])?;
            xml.empty("w:tab", &[("w:val", "left"), ("w:pos", indent.as_str())])?;
            xml.end("w:tabs")?;
            xml.empty("w:ind", &[("w:left", indent.as_str()), ("w:hanging", indent.as_str())])?;
        }
        if let Some(align) = align {
            xml.empty("w:jc", &[("w:val", align)])?;
        }
        xml.end("w:pPr")?;

        let half_points = ((style.typography.size(size) * 2.0).round() as u32).to_string();
        let hex = style.colors.get(color).hex();
        xml.start("w:rPr", &[])?;
        xml.empty("w:color", &[("w:val", hex.as_str())])?;
        xml.empty("w:sz", &[("w:val", half_points.as_str())])?;
        xml.end("w:rPr")?;
        xml.end("w:style")?;
    }

    xml.end("w:styles")?;
    Ok(xml.finish())
}

fn document_rels(links: &[String]) -> Result<Vec<u8>, EmitError> {
    let mut xml = Xml::new()?;
    xml.start(
        "Relationships",
        &[("xmlns", "http://schemas.openxmlformats.org/package/2006/relationships")],
    )?;
    xml.empty(
        "Relationship",
        &[("Id", "rIdStyles"), ("Type", REL_STYLES), ("Target", "styles.xml")],
    )?;
    for (i, uri) in links.iter().enumerate() {
        let id = format!("rIdLink{}", i + 1);
        xml.empty(
            "Relationship",
            &[
                ("Id", id.as_str()),
                ("Type", REL_HYPERLINK),
                ("Target", uri.as_str()),
                ("TargetMode", "External"),
            ],
        )?;
    }
    xml.end("Relationships")?;
    Ok(xml.finish())
}

fn core_xml(metadata: &DocumentMetadata) -> Result<Vec<u8>, EmitError> {
    let mut xml = Xml::new()?;
    xml.start(
        "cp:coreProperties",
        &[
            ("xmlns:cp", "http://schemas.openxmlformats.org/package/2006/metadata/core-properties"),
            ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
            ("xmlns:dcterms", "http://purl.org/dc/terms/"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
        ],
    )?;
    xml.element("dc:title", &metadata.title)?;
    xml.element("dc:creator", &metadata.author)?;
    if let Some(date) = metadata.creation_date {
        xml.start("dcterms:created", &[("xsi:type", "dcterms:W3CDTF")])?;
        xml.text(&date.format("%Y-%m-%dT%H:%M:%SZ").to_string())?;
        xml.end("dcterms:created")?;
    }
    xml.end("cp:coreProperties")?;
    Ok(xml.finish())
}

/// Word's metric-compatible stand-in for the Helvetica family.
const FONT_FAMILY: &str = "Arial";

fn twips(points: f32) -> String {
    ((points * 20.0).round() as i32).to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
