//! Raw Slack message records, exactly as they appear in day files.
//!
//! Only `type` and `ts` are required; everything else is optional because the
//! vendor omits fields freely depending on message subtype. Block trees are
//! kept as [`serde_json::Value`] and walked by [`super::text`].

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Integer parts at or above this are milliseconds, not seconds.
///
/// 10^11 seconds is in the year 5138; 10^11 milliseconds is March 1973.
pub const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// One message object from a channel day file.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMessage {
    /// Record type, `"message"` for everything the export tool writes today
    #[serde(rename = "type")]
    pub msg_type: String,
    /// Vendor timestamp; doubles as the message id
    pub ts: Epoch,
    pub subtype: Option<String>,
    /// Author user id
    pub user: Option<String>,
    /// Author name for bot and integration messages
    pub username: Option<String>,
    pub bot_id: Option<String>,
    /// Author profile snapshot embedded by newer exports
    pub user_profile: Option<RawUserProfile>,
    /// Legacy markup text (`<@U123>`, `<url|label>`, `:emoji:`)
    pub text: Option<String>,
    /// Rich text block tree
    #[serde(default)]
    pub blocks: Vec<Value>,
    #[serde(default)]
    pub files: Vec<RawFile>,
    /// `ts` of the thread root; equals `ts` on the root itself
    pub thread_ts: Option<String>,
    /// Present when the message was edited
    pub edited: Option<Value>,
    pub inviter: Option<String>,
    pub purpose: Option<String>,
    pub topic: Option<String>,
    /// New name, for rename events
    pub name: Option<String>,
    pub old_name: Option<String>,
    /// Thread root snapshot attached to `thread_broadcast` messages
    pub root: Option<Value>,
}

impl RawMessage {
    /// Canonical id of this message.
    pub fn id(&self) -> &str {
        self.ts.as_str()
    }

    /// Id of the thread parent, if this message is a reply.
    pub fn parent_id(&self) -> Option<&str> {
        self.thread_ts
            .as_deref()
            .filter(|parent| *parent != self.ts.as_str())
    }

    /// Returns `true` if the vendor marked the message as edited.
    pub fn is_edited(&self) -> bool {
        self.edited.as_ref().is_some_and(|v| !v.is_null())
    }
}

/// Author profile snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawUserProfile {
    pub real_name: Option<String>,
    pub display_name: Option<String>,
}

/// Shared file metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFile {
    pub id: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    /// `"tombstone"` for deleted files
    pub mode: Option<String>,
    /// `"file_not_found"` when the export tool could not read it
    pub file_access: Option<String>,
    pub url_private: Option<String>,
}

/// A validated vendor epoch timestamp.
///
/// Keeps the original text, which is what thread references point at, and
/// the parsed instant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "EpochRepr")]
pub struct Epoch {
    raw: String,
    instant: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EpochRepr {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl TryFrom<EpochRepr> for Epoch {
    type Error = String;

    fn try_from(repr: EpochRepr) -> Result<Self, Self::Error> {
        let raw = match repr {
            EpochRepr::Text(s) => s,
            EpochRepr::Integer(i) => i.to_string(),
            EpochRepr::Float(f) => f.to_string(),
        };
        Epoch::parse(&raw).ok_or_else(|| format!("invalid timestamp '{raw}'"))
    }
}

impl Epoch {
    /// Parses `seconds[.fraction]` or `millis[.fraction]`.
    ///
    /// The fraction is read digit by digit, so microsecond `ts` values keep
    /// their precision.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let (int_part, frac_part) = trimmed.split_once('.').unwrap_or((trimmed, ""));
        if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if !frac_part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let int: i64 = int_part.parse().ok()?;
        let frac_nanos = fraction_to_nanos(frac_part);

        let (secs, nanos) = if int >= MILLIS_THRESHOLD {
            let millis_nanos = u32::try_from(int % 1000).ok()? * 1_000_000;
            (int / 1000, millis_nanos + frac_nanos / 1000)
        } else {
            (int, frac_nanos)
        };

        let instant = DateTime::from_timestamp(secs, nanos)?;
        Some(Self {
            raw: trimmed.to_string(),
            instant,
        })
    }

    /// The timestamp text as written by the vendor.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed instant.
    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }
}

/// `"0001"` → 100_000 ns. Digits past nanosecond precision are dropped.
fn fraction_to_nanos(frac: &str) -> u32 {
    let digits: String = frac.chars().take(9).collect();
    if digits.is_empty() {
        return 0;
    }
    let scale = 10u32.pow(9 - digits.len() as u32);
    digits.parse::<u32>().map(|n| n * scale).unwrap_or(0)
}
