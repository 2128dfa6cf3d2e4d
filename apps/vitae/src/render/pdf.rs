//! PDF writer: translates a laid-out document into `lopdf` objects.
//!
//! Standard 14 Type1 fonts with WinAnsi encoding, no embedding and no stream
//! compression. Nothing time-dependent is written unless the metadata carries
//! a creation date, so output bytes are a pure function of the input.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::debug;

use crate::layout::{compose, Item, LaidOutDocument, StandardFont};
use crate::render::{DocumentMetadata, EmitContext, EmitError, Emitter, OutputFormat};

pub struct PdfEmitter;

impl Emitter for PdfEmitter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Pdf
    }

    fn emit(&self, ctx: &EmitContext<'_>) -> Result<Vec<u8>, EmitError> {
        let laid_out = compose(ctx.view, ctx.style, ctx.cancel)?;
        if ctx.cancel.is_cancelled() {
            return Err(EmitError::Cancelled);
        }
        write_pdf(&laid_out, ctx.metadata)
    }
}

pub fn write_pdf(laid_out: &LaidOutDocument, metadata: &DocumentMetadata) -> Result<Vec<u8>, EmitError> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for font in StandardFont::ALL {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.pdf_name(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource_name(), font_id);
    }
    let resources_id = doc.add_object(dictionary! { "Font" => fonts });

    let media_box: Vec<Object> = vec![
        0.into(),
        0.into(),
        laid_out.page_width.into(),
        laid_out.page_height.into(),
    ];

    let mut page_ids: Vec<ObjectId> = Vec::with_capacity(laid_out.pages.len());
    for page in &laid_out.pages {
        let content = page_content(&page.items);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let annots: Vec<Object> = page
            .items
            .iter()
            .filter_map(|item| match item {
                Item::Link { rect, uri } => Some(link_annotation(rect, uri)),
                _ => None,
            })
            .map(|annot| doc.add_object(annot).into())
            .collect();

        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media_box.clone(),
            "Contents" => content_id,
            "Resources" => resources_id,
        };
        if !annots.is_empty() {
            page_dict.set("Annots", annots);
        }
        page_ids.push(doc.add_object(page_dict));
    }

    let kids: Vec<Object> = page_ids.iter().map(|id| Object::from(*id)).collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_ids.len() as i64,
        }),
    );

    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(info_dictionary(metadata));
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    debug!(pages = page_ids.len(), bytes = bytes.len(), "PDF written");
    Ok(bytes)
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

fn page_content(items: &[Item]) -> Content {
    let mut ops = Vec::new();
    for item in items {
        match item {
            Item::Text {
                x,
                baseline,
                text,
                face,
                size,
                color,
            } => {
                let [r, g, b] = color.unit();
                ops.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![Object::Name(face.resource_name().as_bytes().to_vec()), (*size).into()],
                ));
                ops.push(Operation::new("Td", vec![(*x).into(), (*baseline).into()]));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::String(to_win_ansi(text), StringFormat::Literal)],
                ));
                ops.push(Operation::new("ET", vec![]));
            }
            Item::Rule {
                x1,
                x2,
                y,
                thickness,
                color,
                ..
            } => {
                let [r, g, b] = color.unit();
                ops.push(Operation::new("w", vec![(*thickness).into()]));
                ops.push(Operation::new("RG", vec![r.into(), g.into(), b.into()]));
                ops.push(Operation::new("m", vec![(*x1).into(), (*y).into()]));
                ops.push(Operation::new("l", vec![(*x2).into(), (*y).into()]));
                ops.push(Operation::new("S", vec![]));
            }
            Item::Link { .. } => {}
        }
    }
    Content { operations: ops }
}

fn link_annotation(rect: &[f32; 4], uri: &str) -> Dictionary {
    dictionary! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => rect.iter().map(|v| Object::from(*v)).collect::<Vec<_>>(),
        "Border" => vec![0.into(), 0.into(), 0.into()],
        "A" => dictionary! {
            "Type" => "Action",
            "S" => "URI",
            "URI" => Object::string_literal(uri),
        },
    }
}

fn info_dictionary(metadata: &DocumentMetadata) -> Dictionary {
    let mut info = dictionary! {
        "Title" => Object::String(to_win_ansi(&metadata.title), StringFormat::Literal),
        "Author" => Object::String(to_win_ansi(&metadata.author), StringFormat::Literal),
        "Producer" => Object::string_literal(concat!("vitae ", env!("CARGO_PKG_VERSION"))),
    };
    if let Some(date) = metadata.creation_date {
        let stamp = date.format("D:%Y%m%d%H%M%SZ").to_string();
        info.set("CreationDate", Object::string_literal(stamp));
    }
    info
}

/// Maps text to WinAnsi bytes. The typographic characters in the 0x80..=0x9F
/// block are translated; Latin-1 passes through; anything else becomes `?`.
fn to_win_ansi(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            c if (c as u32) <= 0xFF && !(0x80..=0x9F).contains(&(c as u32)) => c as u8,
            _ => b'?',
        })
        .collect()
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
    use chrono::TimeZone;
    use tokio_util::sync::CancellationToken;

    fn make_pdf(length: Length, metadata: Option<DocumentMetadata>) -> Vec<u8> {
        let view = make_view(length, Audience::Human);
        let style = resolve(&SchemeCatalogue::builtin(), "executive_navy", ThemeName::Classic).unwrap();
        let metadata = metadata.unwrap_or_else(|| DocumentMetadata::for_view(&view));
        let cancel = CancellationToken::new();
        let ctx = EmitContext {
            view: &view,
            style: &style,
            metadata: &metadata,
            cancel: &cancel,
        };
        PdfEmitter.emit(&ctx).unwrap()
    }

    #[test]
    fn test_output_parses_back() {
        let bytes = make_pdf(Length::Full, None);
        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        assert!(!doc.get_pages().is_empty());
    }

    #[test]
    fn test_extracted_text_contains_name() {
        let bytes = make_pdf(Length::Abbreviated, None);
        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
        let page_id = doc.get_pages()[&pages[0]];
        let content = doc.get_page_content(page_id).unwrap();
        let raw = String::from_utf8_lossy(&content);
        assert!(raw.contains("(Jordan Rivera)"));
        assert!(raw.contains("PROFESSIONAL SUMMARY"));
    }

    #[test]
    fn test_byte_identical_for_same_input() {
        assert_eq!(make_pdf(Length::Full, None), make_pdf(Length::Full, None));
    }

    fn info_entry(bytes: &[u8], key: &[u8]) -> Option<String> {
        let doc = lopdf::Document::load_mem(bytes).unwrap();
        let info_id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let info = doc.get_dictionary(info_id).unwrap();
        let value = info.get(key).ok()?.as_str().ok()?;
        Some(String::from_utf8_lossy(value).into_owned())
    }

    #[test]
    fn test_creation_date_only_when_injected() {
        let plain = make_pdf(Length::Abbreviated, None);
        assert_eq!(info_entry(&plain, b"CreationDate"), None);
        assert_eq!(info_entry(&plain, b"Author").as_deref(), Some("Jordan Rivera"));

        let view = make_view(Length::Abbreviated, Audience::Human);
        let date = chrono::Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let meta = DocumentMetadata::for_view(&view).with_creation_date(date);
        let dated = make_pdf(Length::Abbreviated, Some(meta));
        assert_eq!(info_entry(&dated, b"CreationDate").as_deref(), Some("D:20240301093000Z"));
    }

    #[test]
    fn test_link_annotations_present() {
        let bytes = make_pdf(Length::Full, None);
        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        let uris: Vec<String> = doc
            .objects
            .values()
            .filter_map(|obj| obj.as_dict().ok())
            .filter(|d| d.get(b"Subtype").and_then(|s| s.as_name()).ok() == Some(b"Link".as_slice()))
            .filter_map(|d| {
                let uri = d.get(b"A").ok()?.as_dict().ok()?.get(b"URI").ok()?.as_str().ok()?;
                Some(String::from_utf8_lossy(uri).into_owned())
            })
            .collect();
        assert!(uris.iter().any(|u| u == "https://github.com/jrivera"));
        assert!(uris.iter().any(|u| u == "mailto:jordan@example.com"));
        assert!(uris.iter().any(|u| u == "https://linkedin.com/in/jordanrivera"));
    }

    #[test]
    fn test_win_ansi_mapping() {
        assert_eq!(to_win_ansi("a\u{2022}b"), vec![b'a', 0x95, b'b']);
        assert_eq!(to_win_ansi("\u{2013}\u{2014}"), vec![0x96, 0x97]);
        assert_eq!(to_win_ansi("caf\u{e9}"), b"caf\xe9".to_vec());
        assert_eq!(to_win_ansi("\u{4e2d}"), b"?".to_vec());
    }

    #[test]
    fn test_cancelled_emits_nothing() {
        let view = make_view(Length::Full, Audience::Human);
        let style = resolve(&SchemeCatalogue::builtin(), "charcoal", ThemeName::Classic).unwrap();
        let metadata = DocumentMetadata::for_view(&view);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let ctx = EmitContext {
            view: &view,
            style: &style,
            metadata: &metadata,
            cancel: &cancel,
        };
        assert!(matches!(
            PdfEmitter.emit(&ctx),
            Err(EmitError::Layout(crate::layout::LayoutError::Cancelled))
        ));
    }
}
