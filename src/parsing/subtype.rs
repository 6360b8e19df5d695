//! System lines for message subtypes (joins, topic changes, renames, ...).

use tracing::trace;

use super::raw::RawMessage;
use super::text::{blocks_text, resolve_markup};
use crate::export::Directory;

/// How a subtype affects the rendered text of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemLine {
    /// Ordinary message: the body is rendered as usual.
    None,
    /// A bracketed line followed by the usual body.
    Prefix(String),
    /// A channel event. The bracketed line replaces the legacy text, which
    /// only repeats the event in prose; blocks are still appended.
    Replace(String),
}

fn user_label(directory: &Directory, id: Option<&str>) -> String {
    match id {
        Some(id) => directory.user_name(id).unwrap_or(id).to_string(),
        None => "someone".to_string(),
    }
}

/// Describes the system line for `raw`'s subtype.
pub fn system_line(raw: &RawMessage, directory: &Directory) -> SystemLine {
    let Some(subtype) = raw.subtype.as_deref() else {
        return SystemLine::None;
    };
    let kind = if subtype.starts_with("group_") { "group" } else { "channel" };
    let user = || user_label(directory, raw.user.as_deref());
    let markup = |value: Option<&str>| resolve_markup(value.unwrap_or_default(), directory);

    let line = match subtype {
        "bot_message" | "me_message" | "file_share" | "mpdm_move" | "reply_broadcast" => {
            return SystemLine::None;
        }
        "thread_broadcast" => {
            return match raw.root.as_ref() {
                Some(root) => SystemLine::Prefix(format!("[thread root] {}", root_text(root, directory))),
                None => SystemLine::None,
            };
        }
        "joiner_notification" => format!("[{}]", markup(raw.text.as_deref())),
        "joiner_notification_for_inviter" => format!("[{} joined group]", user()),
        "channel_join" | "group_join" => match raw.inviter.as_deref() {
            Some(inviter) => format!(
                "[joined {kind}, invited by {}]",
                user_label(directory, Some(inviter))
            ),
            None => format!("[joined {kind}]"),
        },
        "channel_leave" | "group_leave" => format!("[left {kind}]"),
        "channel_purpose" | "group_purpose" => format!(
            "[{} set {kind} purpose: {}]",
            user(),
            markup(raw.purpose.as_deref())
        ),
        "channel_topic" | "group_topic" => {
            format!("[{} set {kind} topic: {}]", user(), markup(raw.topic.as_deref()))
        }
        "channel_name" | "group_name" => match (raw.old_name.as_deref(), raw.name.as_deref()) {
            (Some(old), Some(new)) => {
                format!("[{} renamed the {kind} from \"{old}\" to \"{new}\"]", user())
            }
            _ => format!("[{} {}]", user(), markup(raw.text.as_deref())),
        },
        "channel_archive" | "group_archive" => format!("[{} archived the {kind}]", user()),
        "channel_unarchive" | "group_unarchive" => format!("[{} unarchived the {kind}]", user()),
        "pinned_item" => format!("[{} pinned a message]", user()),
        other => {
            trace!(subtype = other, "unrecognised subtype, keeping body");
            return SystemLine::Prefix(format!("[{other}]"));
        }
    };

    SystemLine::Replace(line)
}

fn root_text(root: &serde_json::Value, directory: &Directory) -> String {
    let blocks = root
        .get("blocks")
        .and_then(serde_json::Value::as_array)
        .map(|blocks| blocks_text(blocks, directory))
        .unwrap_or_default();
    if !blocks.trim().is_empty() {
        return blocks;
    }
    root.get("text")
        .and_then(serde_json::Value::as_str)
        .map(|text| resolve_markup(text, directory))
        .unwrap_or_default()
}
