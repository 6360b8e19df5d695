//! Message Normalizer: raw Slack records into canonical [`Message`]s.
//!
//! - [`raw`] - serde structs for day-file records
//! - [`text`] - block tree and legacy markup rendering
//! - [`subtype`] - system lines for channel events
//!
//! # Example
//!
//! ```rust
//! use chrono_tz::Tz;
//! use slackpack::export::Directory;
//! use slackpack::parsing::{RawMessage, normalize_channel};
//!
//! let raws: Vec<RawMessage> = serde_json::from_str(r#"[
//!     {"type": "message", "ts": "1672660800.000200", "user": "U1", "text": "second"},
//!     {"type": "message", "ts": "1672574400.000100", "user": "U1", "text": "first"}
//! ]"#)?;
//! let directory = Directory::new().with_user("U1", "Alice");
//!
//! let channel = normalize_channel("general", &raws, &directory, Tz::UTC);
//! assert_eq!(channel.messages[0].text(), "first");
//! assert_eq!(channel.messages[1].sender(), "Alice");
//! # Ok::<(), serde_json::Error>(())
//! ```

pub mod raw;
pub mod subtype;
pub mod text;

pub use raw::{Epoch, RawFile, RawMessage, RawUserProfile};
pub use subtype::{SystemLine, system_line};
pub use text::{blocks_text, emoji_glyph, resolve_markup};

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::export::Directory;
use crate::message::{Attachment, Channel, Message};

/// Resolves the display name of a message author.
///
/// Order: directory lookup of `user`, embedded profile, `username`,
/// `bot_id`, then `unknown`.
pub fn sender_name(raw: &RawMessage, directory: &Directory) -> String {
    if let Some(name) = raw.user.as_deref().and_then(|id| directory.user_name(id)) {
        return name.to_string();
    }
    let profile = raw.user_profile.as_ref().and_then(|p| {
        [p.real_name.as_deref(), p.display_name.as_deref()]
            .into_iter()
            .flatten()
            .find(|name| !name.trim().is_empty())
    });

    profile
        .or(raw.username.as_deref())
        .or(raw.bot_id.as_deref())
        .or(raw.user.as_deref())
        .unwrap_or("unknown")
        .to_string()
}

/// Renders the full plain text of a message: system line, then body.
pub fn message_text(raw: &RawMessage, directory: &Directory) -> String {
    let blocks = blocks_text(&raw.blocks, directory);
    let body = if blocks.trim().is_empty() {
        raw.text
            .as_deref()
            .map(|text| resolve_markup(text, directory))
            .unwrap_or_default()
    } else {
        blocks.clone()
    };

    let mut parts = Vec::with_capacity(2);
    if raw.msg_type != "message" {
        parts.push(format!("[{}]", raw.msg_type));
    }
    match system_line(raw, directory) {
        SystemLine::None => parts.push(body),
        SystemLine::Prefix(line) => {
            parts.push(line);
            parts.push(body);
        }
        SystemLine::Replace(line) => {
            parts.push(line);
            parts.push(blocks);
        }
    }

    parts
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Converts the `files` of a message into attachment references.
pub fn attachments(raw: &RawMessage) -> Vec<Attachment> {
    raw.files
        .iter()
        .map(|file| {
            let name = file
                .name
                .as_deref()
                .or(file.title.as_deref())
                .or(file.id.as_deref())
                .unwrap_or("unnamed file");
            let attachment = if file.mode.as_deref() == Some("tombstone") {
                Attachment::removed(name)
            } else if file.file_access.as_deref() == Some("file_not_found") {
                Attachment::not_found(name)
            } else {
                Attachment::available(name)
            };
            match file.url_private.as_deref() {
                Some(url) => attachment.with_url(url),
                None => attachment,
            }
        })
        .collect()
}

/// Normalizes one raw record. Thread linkage is left to [`normalize_channel`],
/// which knows what has already been produced.
pub fn normalize_message(raw: &RawMessage, directory: &Directory, timezone: Tz) -> Message {
    Message::new(
        raw.id(),
        sender_name(raw, directory),
        raw.ts.instant().with_timezone(&timezone),
        message_text(raw, directory),
    )
    .with_attachments(attachments(raw))
    .with_edited(raw.is_edited())
}

/// Normalizes a channel's raw records, given in export order.
///
/// A reply is linked to its parent only when the parent was already seen in
/// export order and is not newer than the reply. The result is stably sorted
/// by timestamp and has exactly one message per raw record.
pub fn normalize_channel(
    name: &str,
    raws: &[RawMessage],
    directory: &Directory,
    timezone: Tz,
) -> Channel {
    let mut seen: HashMap<&str, DateTime<Utc>> = HashMap::with_capacity(raws.len());
    let mut messages = Vec::with_capacity(raws.len());

    for raw in raws {
        let mut message = normalize_message(raw, directory, timezone);

        if let Some(parent) = raw.parent_id() {
            match seen.get(parent) {
                Some(parent_ts) if *parent_ts <= raw.ts.instant() => {
                    message = message.with_thread_id(parent);
                }
                Some(_) => {
                    debug!(channel = name, id = raw.id(), parent, "thread parent is newer than reply, left flat");
                }
                None => {
                    debug!(channel = name, id = raw.id(), parent, "thread parent not seen yet, left flat");
                }
            }
        }

        seen.insert(raw.id(), raw.ts.instant());
        messages.push(message);
    }

    messages.sort_by_key(Message::timestamp);

    Channel::new(name, messages).with_title(directory.channel_title(name))
}
