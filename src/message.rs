//! Canonical message model.
//!
//! This module provides [`Message`], the normalized representation of a single
//! chat message, and [`Channel`], a named, time-ordered sequence of them.
//! The normalizer in [`crate::parsing`] is the only producer of these values;
//! everything downstream (filtering, rendering) reads them.
//!
//! # Overview
//!
//! A message consists of:
//! - **Identity**: `id` (the vendor timestamp text, unique per channel)
//! - **Content**: `sender`, `timestamp`, `text`
//! - **Links**: optional `thread_id`, ordered `attachments`
//!
//! # Examples
//!
//! ```
//! use chrono::TimeZone;
//! use chrono_tz::UTC;
//! use slackpack::{Attachment, Message};
//!
//! let ts = UTC.with_ymd_and_hms(2023, 1, 2, 9, 30, 0).unwrap();
//! let msg = Message::new("1672651800.000100", "Alice", ts, "Morning!")
//!     .with_attachment(Attachment::available("notes.txt"));
//!
//! assert_eq!(msg.sender(), "Alice");
//! assert_eq!(msg.attachments().len(), 1);
//! assert!(!msg.is_reply());
//! ```

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;

/// A normalized chat message.
///
/// Fields are private: a message is immutable once the normalizer has built
/// it. The `with_*` methods consume `self` and are meant for construction
/// only.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    id: String,
    sender: String,
    timestamp: DateTime<Tz>,
    text: String,
    thread_id: Option<String>,
    attachments: Vec<Attachment>,
    edited: bool,
}

impl Message {
    /// Creates a message without thread linkage or attachments.
    pub fn new(
        id: impl Into<String>,
        sender: impl Into<String>,
        timestamp: DateTime<Tz>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            sender: sender.into(),
            timestamp,
            text: text.into(),
            thread_id: None,
            attachments: Vec::new(),
            edited: false,
        }
    }

    /// Links this message to the thread rooted at `parent_id`.
    #[must_use]
    pub fn with_thread_id(mut self, parent_id: impl Into<String>) -> Self {
        self.thread_id = Some(parent_id.into());
        self
    }

    /// Appends an attachment reference.
    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Replaces the attachment list.
    #[must_use]
    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    /// Marks the message as edited.
    #[must_use]
    pub fn with_edited(mut self, edited: bool) -> Self {
        self.edited = edited;
        self
    }

    /// Canonical message id (unique within its channel).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name of the author.
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// When the message was sent, in the display timezone.
    pub fn timestamp(&self) -> DateTime<Tz> {
        self.timestamp
    }

    /// Calendar date of the message in the display timezone.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Plain text body. May contain newlines.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Id of the thread parent, when it was resolved.
    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    /// Attachment references in export order.
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Whether the vendor marked the message as edited.
    pub fn is_edited(&self) -> bool {
        self.edited
    }

    /// Returns `true` if this message is a resolved thread reply.
    pub fn is_reply(&self) -> bool {
        self.thread_id.is_some()
    }
}

/// Availability of an attached file at export time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentState {
    /// The file metadata is present.
    Available,
    /// The file was deleted (tombstoned) before the export.
    Removed,
    /// The export tool could not access the file.
    NotFound,
}

/// A reference to a file shared in a message. File contents are never read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name as shown in the chat.
    pub name: String,
    /// Private download URL, if the export carries one.
    pub url: Option<String>,
    /// Availability at export time.
    pub state: AttachmentState,
}

impl Attachment {
    /// An available file called `name`.
    pub fn available(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
            state: AttachmentState::Available,
        }
    }

    /// A file that was removed before the export.
    pub fn removed(name: impl Into<String>) -> Self {
        Self {
            state: AttachmentState::Removed,
            ..Self::available(name)
        }
    }

    /// A file the export tool could not access.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self {
            state: AttachmentState::NotFound,
            ..Self::available(name)
        }
    }

    /// Sets the download URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// One-line description used by renderers.
    pub fn label(&self) -> String {
        match self.state {
            AttachmentState::Available => format!("[file] {}", self.name),
            AttachmentState::Removed => "[file removed]".to_string(),
            AttachmentState::NotFound => "[file not found]".to_string(),
        }
    }
}

/// A named chat stream with its messages ordered by timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    /// Export directory name; also the key used by filter files.
    pub name: String,
    /// Human-readable title (member names for direct messages).
    pub title: String,
    /// Messages, ascending by timestamp, ties in export order.
    pub messages: Vec<Message>,
}

impl Channel {
    /// Creates a channel whose title equals its name.
    pub fn new(name: impl Into<String>, messages: Vec<Message>) -> Self {
        let name = name.into();
        Self {
            title: name.clone(),
            name,
            messages,
        }
    }

    /// Sets the display title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if the channel has no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Looks up a message by id, e.g. the parent a reply's `thread_id` names.
    pub fn find(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::{America::New_York, UTC};

    fn ts(h: u32) -> DateTime<Tz> {
        UTC.with_ymd_and_hms(2023, 1, 2, h, 0, 0).unwrap()
    }

    #[test]
    fn test_builder() {
        let msg = Message::new("1.0", "Alice", ts(9), "hi")
            .with_thread_id("0.5")
            .with_edited(true)
            .with_attachment(Attachment::available("a.png").with_url("https://files/a.png"));

        assert_eq!(msg.id(), "1.0");
        assert_eq!(msg.thread_id(), Some("0.5"));
        assert!(msg.is_reply());
        assert!(msg.is_edited());
        assert_eq!(msg.attachments()[0].url.as_deref(), Some("https://files/a.png"));
    }

    #[test]
    fn test_date_uses_display_timezone() {
        let utc = UTC.with_ymd_and_hms(2023, 1, 2, 3, 0, 0).unwrap();
        let local = utc.with_timezone(&New_York);
        let msg = Message::new("1", "Alice", local, "late night");
        assert_eq!(msg.date(), NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
    }

    #[test]
    fn test_attachment_labels() {
        assert_eq!(Attachment::available("notes.txt").label(), "[file] notes.txt");
        assert_eq!(Attachment::removed("x").label(), "[file removed]");
        assert_eq!(Attachment::not_found("x").label(), "[file not found]");
    }

    #[test]
    fn test_channel_find() {
        let channel = Channel::new(
            "general",
            vec![
                Message::new("1", "Alice", ts(9), "root"),
                Message::new("2", "Bob", ts(10), "reply").with_thread_id("1"),
            ],
        )
        .with_title("General");

        assert_eq!(channel.title, "General");
        assert_eq!(channel.len(), 2);
        assert_eq!(channel.find("1").map(Message::text), Some("root"));
        assert!(channel.find("3").is_none());
    }
}
