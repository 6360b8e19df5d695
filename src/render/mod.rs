//! Document Renderer boundary.
//!
//! The pipeline turns each retained channel into a [`Document`] and hands it
//! to a [`Renderer`]. The layout-independent parts live here: grouping by
//! day, the text of each message, and output file naming.
//!
//! - [`PdfRenderer`] - lopdf-based PDF writer (requires the `pdf` feature)
//!
//! # Example
//!
//! ```rust
//! use chrono::TimeZone;
//! use chrono_tz::UTC;
//! use slackpack::render::Document;
//! use slackpack::{Channel, Message};
//!
//! let ts = |d, h| UTC.with_ymd_and_hms(2023, 1, d, h, 0, 0).unwrap();
//! let channel = Channel::new("general", vec![
//!     Message::new("1", "Alice", ts(1, 9), "hi"),
//!     Message::new("2", "Bob", ts(1, 10), "hello"),
//!     Message::new("3", "Alice", ts(2, 9), "again"),
//! ]);
//!
//! let document = Document::new(&channel);
//! assert_eq!(document.title, "slack channel: general");
//! assert_eq!(document.days().len(), 2);
//! ```

#[cfg(feature = "pdf")]
mod pdf;

#[cfg(feature = "pdf")]
pub use pdf::{PdfRenderer, encode_win_ansi};

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::Result;
use crate::{Channel, Message};

/// Produces one output file per channel document.
pub trait Renderer {
    /// Returns the human-readable name of this renderer.
    fn name(&self) -> &'static str;

    /// File extension of produced documents, without the dot.
    fn extension(&self) -> &'static str;

    /// Writes `document` to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Any error is treated by the pipeline as a failure of this channel
    /// only.
    fn render(&self, document: &Document<'_>, path: &Path) -> Result<()>;
}

/// A channel ready for rendering.
#[derive(Debug, Clone)]
pub struct Document<'a> {
    /// Heading of the document.
    pub title: String,
    /// The filtered channel.
    pub channel: &'a Channel,
}

/// Messages of one calendar day.
#[derive(Debug, Clone, Copy)]
pub struct Day<'a> {
    pub date: NaiveDate,
    pub messages: &'a [Message],
}

impl<'a> Document<'a> {
    /// Creates a document for `channel`.
    pub fn new(channel: &'a Channel) -> Self {
        Self {
            title: format!("slack channel: {}", channel.title),
            channel,
        }
    }

    /// Messages grouped by calendar day, in order.
    pub fn days(&self) -> Vec<Day<'a>> {
        self.channel
            .messages
            .chunk_by(|a, b| a.date() == b.date())
            .map(|messages| Day {
                date: messages[0].date(),
                messages,
            })
            .collect()
    }
}

/// The printable parts of one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBlock {
    /// `HH:MM`, with a reply marker for thread replies.
    pub header: String,
    /// `sender: text`, then one line per attachment. Lines may still contain
    /// newlines from multi-line messages.
    pub lines: Vec<String>,
    /// Thread replies are indented.
    pub reply: bool,
}

impl MessageBlock {
    pub fn new(message: &Message) -> Self {
        let mut header = message.timestamp().format("%H:%M").to_string();
        if message.is_reply() {
            header.push_str("  reply");
        }

        let mut body = format!("{}: {}", message.sender(), message.text());
        if message.is_edited() {
            body.push_str(" [edited]");
        }

        let mut lines = Vec::with_capacity(1 + message.attachments().len());
        lines.push(body);
        lines.extend(message.attachments().iter().map(|a| a.label()));

        Self {
            header,
            lines,
            reply: message.is_reply(),
        }
    }
}

/// Replaces path separators and control characters with `_`.
///
/// ```
/// use slackpack::render::sanitize_file_name;
///
/// assert_eq!(sanitize_file_name("Alice -- Bob"), "Alice -- Bob");
/// assert_eq!(sanitize_file_name("ops/alerts"), "ops_alerts");
/// assert_eq!(sanitize_file_name(".."), "_");
/// ```
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let trimmed = cleaned.trim();
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Output file for a channel title: `<dir>/<title>.<extension>`.
pub fn output_path(dir: &Path, title: &str, extension: &str) -> PathBuf {
    dir.join(format!("{}.{extension}", sanitize_file_name(title)))
}
