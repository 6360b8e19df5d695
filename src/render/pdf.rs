//! PDF renderer built on lopdf.
//!
//! Uses the base-14 Helvetica fonts with WinAnsi encoding, so no font files
//! are embedded. Text is laid out top to bottom with greedy word wrapping and
//! automatic page breaks.

use std::fs::File;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Object, ObjectId, Stream, StringFormat, dictionary};
use tracing::debug;

use super::{Document, MessageBlock, Renderer};
use crate::config::RenderConfig;
use crate::error::Result;

/// Indentation of thread replies, in points.
const REPLY_INDENT: i64 = 18;

#[derive(Debug, Clone, Copy)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

/// Writes channel documents as PDF.
#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    config: RenderConfig,
}

impl PdfRenderer {
    /// Creates a renderer with the given layout.
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// The layout in use.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    fn lay_out(&self, document: &Document<'_>) -> Vec<Vec<Operation>> {
        let config = &self.config;
        let mut layout = Layout::new(config);

        layout.paragraph(Font::Bold, config.title_size, 0, &document.title);

        for day in document.days() {
            layout.gap(config.heading_size);
            layout.paragraph(
                Font::Bold,
                config.heading_size,
                0,
                &day.date.format("%Y-%m-%d").to_string(),
            );

            for message in day.messages {
                let block = MessageBlock::new(message);
                let indent = if block.reply { REPLY_INDENT } else { 0 };

                layout.gap(config.body_size / 2);
                layout.paragraph(Font::Bold, config.body_size, indent, &block.header);
                for line in &block.lines {
                    layout.paragraph(Font::Regular, config.body_size, indent, line);
                }
            }
        }

        layout.finish()
    }
}

impl Renderer for PdfRenderer {
    fn name(&self) -> &'static str {
        "PDF"
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn render(&self, document: &Document<'_>, path: &Path) -> Result<()> {
        let (width, height) = self.config.page_size.dimensions();
        let pages = self.lay_out(document);

        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(font_dictionary("Helvetica"));
        let bold_id = doc.add_object(font_dictionary("Helvetica-Bold"));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                Font::Regular.resource() => regular_id,
                Font::Bold.resource() => bold_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for operations in pages {
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id: ObjectId = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let page_count = i64::try_from(kids.len()).unwrap_or(i64::MAX);
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
                "Resources" => resources_id,
                "MediaBox" => vec![0i64.into(), 0i64.into(), width.into(), height.into()],
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::String(encode_text_string(&document.title), StringFormat::Hexadecimal),
            "Producer" => Object::string_literal(concat!("slackpack ", env!("CARGO_PKG_VERSION"))),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);
        doc.compress();

        let mut file = File::create(path)?;
        doc.save_to(&mut file)?;

        debug!(path = %path.display(), pages = page_count, "wrote PDF");
        Ok(())
    }
}

/// Metadata strings are UTF-16BE with a byte order mark.
fn encode_text_string(text: &str) -> Vec<u8> {
    let mut out = vec![0xFE, 0xFF];
    out.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
    out
}

fn font_dictionary(base_font: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Cursor over a sequence of pages.
struct Layout<'c> {
    config: &'c RenderConfig,
    width: i64,
    height: i64,
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    y: i64,
}

impl<'c> Layout<'c> {
    fn new(config: &'c RenderConfig) -> Self {
        let (width, height) = config.page_size.dimensions();
        Self {
            config,
            width,
            height,
            pages: Vec::new(),
            current: Vec::new(),
            y: height - config.margin,
        }
    }

    fn leading(size: i64) -> i64 {
        size * 14 / 10
    }

    fn break_page(&mut self) {
        let page = std::mem::take(&mut self.current);
        self.pages.push(page);
        self.y = self.height - self.config.margin;
    }

    fn gap(&mut self, amount: i64) {
        self.y -= amount;
    }

    /// Writes `text`, honouring embedded newlines and wrapping to the
    /// available width.
    fn paragraph(&mut self, font: Font, size: i64, indent: i64, text: &str) {
        let available = self.width - 2 * self.config.margin - indent;
        // Helvetica averages a little over half an em per glyph.
        let max_chars = usize::try_from((available * 20) / (size.max(1) * 11))
            .unwrap_or(1)
            .max(1);

        for line in text.split('\n') {
            for wrapped in wrap(&encode_win_ansi(line), max_chars) {
                self.line(font, size, indent, wrapped);
            }
        }
    }

    fn line(&mut self, font: Font, size: i64, indent: i64, bytes: Vec<u8>) {
        let leading = Self::leading(size);
        if self.y - leading < self.config.margin {
            self.break_page();
        }
        self.y -= leading;

        self.current.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font.resource().into(), size.into()]),
            Operation::new("Td", vec![(self.config.margin + indent).into(), self.y.into()]),
            Operation::new("Tj", vec![Object::String(bytes, StringFormat::Hexadecimal)]),
            Operation::new("ET", vec![]),
        ]);
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.break_page();
        }
        self.pages
    }
}

/// Greedy word wrap over encoded bytes. Words longer than a line are split.
fn wrap(bytes: &[u8], max: usize) -> Vec<Vec<u8>> {
    let mut lines = Vec::new();
    let mut current: Vec<u8> = Vec::new();

    for word in bytes.split(|&b| b == b' ') {
        let needed = if current.is_empty() { word.len() } else { current.len() + 1 + word.len() };
        if needed > max && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(b' ');
        }
        let mut rest = word;
        while current.len() + rest.len() > max {
            let take = max - current.len();
            current.extend_from_slice(&rest[..take]);
            lines.push(std::mem::take(&mut current));
            rest = &rest[take..];
        }
        current.extend_from_slice(rest);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Encodes `text` for a WinAnsi base-14 font.
///
/// Latin-1 and the WinAnsi punctuation extras map directly. Emoji become
/// `:shortcode:`; variation selectors, joiners and skin tones are dropped;
/// anything else becomes `?`.
///
/// ```
/// use slackpack::render::encode_win_ansi;
///
/// assert_eq!(encode_win_ansi("café"), b"caf\xe9");
/// assert_eq!(encode_win_ansi("ok 🎉"), b"ok :tada:");
/// assert_eq!(encode_win_ansi("日本"), b"??");
/// ```
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut buf = [0u8; 4];

    for c in text.chars() {
        let code = u32::from(c);
        match c {
            '\t' => out.push(b' '),
            c if c.is_control() => {}
            _ if code < 0x80 || (0xA0..=0xFF).contains(&code) => {
                out.push(u8::try_from(code).unwrap_or(b'?'));
            }
            '\u{FE0E}' | '\u{FE0F}' | '\u{200D}' | '\u{1F3FB}'..='\u{1F3FF}' => {}
            _ => {
                if let Some(byte) = win_ansi_extra(c) {
                    out.push(byte);
                } else if let Some(shortcode) =
                    emojis::get(c.encode_utf8(&mut buf)).and_then(|e| e.shortcode())
                {
                    out.push(b':');
                    out.extend_from_slice(shortcode.as_bytes());
                    out.push(b':');
                } else {
                    out.push(b'?');
                }
            }
        }
    }
    out
}

fn win_ansi_extra(c: char) -> Option<u8> {
    let byte = match c {
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '•' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageSize;
    use crate::{Channel, Message};
    use chrono::TimeZone;
    use chrono_tz::UTC;
    use tempfile::tempdir;

    fn channel(count: u32) -> Channel {
        let messages = (0..count)
            .map(|i| {
                let ts = UTC.with_ymd_and_hms(2023, 1, 1 + i / 24, i % 24, 0, 0).unwrap();
                Message::new(i.to_string(), "Alice", ts, format!("message number {i}"))
            })
            .collect();
        Channel::new("general", messages)
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("plain"), b"plain");
        assert_eq!(encode_win_ansi("\u{2018}quote\u{2019} \u{2014} \u{20AC}5"), b"\x91quote\x92 \x97 \x805");
        assert_eq!(encode_win_ansi("\u{1F600}\u{FE0F}"), b":grinning:");
        assert_eq!(encode_win_ansi("a\tb\u{7}"), b"a b");
    }

    #[test]
    fn test_encode_text_string() {
        assert_eq!(encode_text_string("A"), vec![0xFE, 0xFF, 0x00, 0x41]);
        assert_eq!(
            encode_text_string("\u{201C}\u{1F389}"),
            vec![0xFE, 0xFF, 0x20, 0x1C, 0xD8, 0x3C, 0xDF, 0x89]
        );
    }

    #[test]
    fn test_wrap() {
        let lines = wrap(b"the quick brown fox", 10);
        assert_eq!(lines, vec![b"the quick".to_vec(), b"brown fox".to_vec()]);

        let lines = wrap(b"abcdefghijkl", 5);
        assert_eq!(lines, vec![b"abcde".to_vec(), b"fghij".to_vec(), b"kl".to_vec()]);

        assert_eq!(wrap(b"", 5), vec![Vec::<u8>::new()]);
    }

    #[test]
    fn test_long_channel_breaks_pages() {
        let channel = channel(120);
        let renderer = PdfRenderer::default();
        let pages = renderer.lay_out(&Document::new(&channel));
        assert!(pages.len() > 1);
        assert!(pages.iter().all(|ops| !ops.is_empty()));
    }

    #[test]
    fn test_render_writes_loadable_pdf() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("general.pdf");
        let channel = channel(3);

        let renderer = PdfRenderer::new(RenderConfig::new().with_page_size(PageSize::A4));
        renderer.render(&Document::new(&channel), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let loaded = lopdf::Document::load(&path).unwrap();
        assert_eq!(loaded.get_pages().len(), 1);
    }

    #[test]
    fn test_title_metadata_is_unicode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dm.pdf");
        let channel = channel(1).with_title("\u{201C}Alice\u{201D} -- Bob");

        PdfRenderer::default()
            .render(&Document::new(&channel), &path)
            .unwrap();

        let loaded = lopdf::Document::load(&path).unwrap();
        let info = loaded.trailer.get(b"Info").and_then(Object::as_reference).unwrap();
        let title = loaded.get_dictionary(info).unwrap().get(b"Title").unwrap();
        let Object::String(bytes, _) = title else {
            panic!("title is not a string: {title:?}");
        };
        assert_eq!(bytes, &encode_text_string("slack channel: \u{201C}Alice\u{201D} -- Bob"));
    }
}
