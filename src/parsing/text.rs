//! Plain-text rendering of Slack message bodies.
//!
//! Two representations exist in exports and both are handled:
//!
//! - **Rich text blocks** (`blocks`): a JSON tree of sections, lists, quotes
//!   and inline elements. See [`blocks_text`].
//! - **Legacy markup** (`text`): a string with `<...>` tokens, `:emoji:`
//!   shortcodes and HTML entities. See [`resolve_markup`].
//!
//! Tokens that cannot be resolved are kept verbatim.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::trace;

use crate::export::Directory;

/// A `<...>` token or an `:emoji:` shortcode.
static MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r":([a-zA-Z0-9_+\-']+):|<([^<>\n]+)>").expect("valid markup regex")
});

/// Deepest list nesting rendered as indentation.
const MAX_LIST_INDENT: u64 = 16;

/// Looks up an emoji by shortcode (`smile`, `+1`).
pub fn emoji_glyph(name: &str) -> Option<&'static str> {
    emojis::get_by_shortcode(name).map(|emoji| emoji.as_str())
}

/// Decodes the vendor's `unicode` field (`"1f44d-1f3fb"`) into a string.
fn decode_codepoints(hex: &str) -> Option<String> {
    hex.split('-')
        .map(|cp| u32::from_str_radix(cp, 16).ok().and_then(char::from_u32))
        .collect()
}

fn str_field<'v>(value: &'v Value, key: &str) -> Option<&'v str> {
    value.get(key).and_then(Value::as_str)
}

fn elements(value: &Value) -> &[Value] {
    value
        .get("elements")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Renders a list of blocks, one block per line group.
pub fn blocks_text(blocks: &[Value], directory: &Directory) -> String {
    blocks
        .iter()
        .filter_map(|block| block_text(block, directory))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn block_text(block: &Value, directory: &Directory) -> Option<String> {
    match str_field(block, "type") {
        Some("rich_text") => Some(
            elements(block)
                .iter()
                .filter_map(|part| rich_text_part(part, directory))
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        // section/header/context blocks carry a text object
        other => {
            let text = block.get("text").and_then(|t| t.get("text").or(Some(t)));
            match text.and_then(Value::as_str) {
                Some(text) => Some(resolve_markup(text, directory)),
                None => {
                    trace!(block_type = ?other, "block without text skipped");
                    None
                }
            }
        }
    }
}

fn rich_text_part(part: &Value, directory: &Directory) -> Option<String> {
    match str_field(part, "type") {
        Some("rich_text_section" | "rich_text_preformatted") => Some(inline_text(part, directory)),
        Some("rich_text_quote") => Some(
            inline_text(part, directory)
                .lines()
                .map(|line| format!("> {line}"))
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        Some("rich_text_list") => Some(list_text(part, directory)),
        _ if part.get("elements").is_some() => Some(inline_text(part, directory)),
        other => {
            trace!(part_type = ?other, "rich text part without elements skipped");
            None
        }
    }
}

fn list_text(list: &Value, directory: &Directory) -> String {
    let ordered = str_field(list, "style") == Some("ordered");
    let offset = list.get("offset").and_then(Value::as_u64).unwrap_or(0);
    let depth = list
        .get("indent")
        .and_then(Value::as_u64)
        .unwrap_or(0)
        .min(MAX_LIST_INDENT);
    let indent = "  ".repeat(depth as usize);

    elements(list)
        .iter()
        .zip(1..)
        .map(|(item, n)| {
            let text = inline_text(item, directory);
            if ordered {
                format!("{indent}{}. {text}", offset.saturating_add(n))
            } else {
                format!("{indent}- {text}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn inline_text(container: &Value, directory: &Directory) -> String {
    elements(container)
        .iter()
        .map(|element| inline_element(element, directory))
        .collect()
}

fn inline_element(element: &Value, directory: &Directory) -> String {
    match str_field(element, "type") {
        Some("text") => str_field(element, "text").unwrap_or_default().to_string(),
        Some("link") => {
            let url = str_field(element, "url").unwrap_or_default();
            match str_field(element, "text") {
                Some(label) if !label.is_empty() && label != url => format!("{label} ({url})"),
                _ => url.to_string(),
            }
        }
        Some("user") => {
            let id = str_field(element, "user_id").unwrap_or_default();
            directory
                .user_name(id)
                .map(|name| format!("@{name}"))
                .unwrap_or_else(|| format!("<@{id}>"))
        }
        Some("usergroup") => {
            let id = str_field(element, "usergroup_id").unwrap_or_default();
            format!("<!subteam^{id}>")
        }
        Some("channel") => {
            let id = str_field(element, "channel_id").unwrap_or_default();
            directory
                .channel_name(id)
                .map(|name| format!("#{name}"))
                .unwrap_or_else(|| format!("<#{id}>"))
        }
        Some("broadcast") => format!("@{}", str_field(element, "range").unwrap_or("here")),
        Some("emoji") => {
            let name = str_field(element, "name").unwrap_or_default();
            str_field(element, "unicode")
                .and_then(decode_codepoints)
                .or_else(|| emoji_glyph(name).map(ToString::to_string))
                .unwrap_or_else(|| format!(":{name}:"))
        }
        Some("date") => str_field(element, "fallback").unwrap_or_default().to_string(),
        Some("color") => str_field(element, "value").unwrap_or_default().to_string(),
        other => match str_field(element, "text") {
            Some(text) => text.to_string(),
            None => format!("[{}]", other.unwrap_or("unknown")),
        },
    }
}

/// Resolves legacy markup into plain text.
///
/// ```
/// use slackpack::export::Directory;
/// use slackpack::parsing::resolve_markup;
///
/// let directory = Directory::new().with_user("U1", "Alice");
/// assert_eq!(
///     resolve_markup("<@U1> says &lt;hi&gt; :wave: to <@U2>", &directory),
///     "@Alice says <hi> 👋 to <@U2>"
/// );
/// ```
pub fn resolve_markup(text: &str, directory: &Directory) -> String {
    let mut resolved = String::with_capacity(text.len());
    let mut copied = 0;
    let mut at = 0;

    // Replacements are never rescanned.
    while let Some(caps) = MARKUP.captures_at(text, at) {
        let Some(whole) = caps.get(0) else { break };
        let replacement = match (caps.get(1), caps.get(2)) {
            (Some(name), _) => emoji_glyph(name.as_str()).map(ToString::to_string),
            (None, Some(inner)) => resolve_token(inner.as_str(), directory),
            (None, None) => None,
        };

        match replacement {
            Some(replacement) => {
                resolved.push_str(&text[copied..whole.start()]);
                resolved.push_str(&replacement);
                copied = whole.end();
                at = whole.end();
            }
            // `10:30:smile:` - the closing colon may open the next shortcode
            None if caps.get(1).is_some() => at = whole.start() + 1,
            None => at = whole.end(),
        }
    }
    resolved.push_str(&text[copied..]);

    decode_entities(&resolved)
}

fn resolve_token(inner: &str, directory: &Directory) -> Option<String> {
    let (target, label) = match inner.split_once('|') {
        Some((target, label)) => (target, Some(label)),
        None => (inner, None),
    };

    if let Some(id) = target.strip_prefix('@') {
        return directory
            .user_name(id)
            .map(|name| format!("@{name}"))
            .or_else(|| label.map(|l| format!("@{}", l.trim_start_matches('@'))));
    }
    if let Some(id) = target.strip_prefix('#') {
        return directory
            .channel_name(id)
            .or(label)
            .map(|name| format!("#{name}"));
    }
    if let Some(command) = target.strip_prefix('!') {
        return match command {
            "here" | "channel" | "everyone" => Some(format!("@{command}")),
            _ => label.map(ToString::to_string),
        };
    }
    if target.contains("://") || target.starts_with("mailto:") {
        return Some(match label {
            Some(label) if !label.is_empty() && !target.ends_with(label) => {
                format!("{label} ({target})")
            }
            Some(label) if !label.is_empty() => label.to_string(),
            _ => target.to_string(),
        });
    }
    None
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
