//! Workspace lookup tables loaded from the export root.
//!
//! A Slack export carries its user and conversation metadata in a handful of
//! top-level JSON files:
//!
//! | File | Required | Used for |
//! |------|----------|----------|
//! | `users.json` | yes | sender names, `@mentions` |
//! | `channels.json` | yes | `#channel` mentions |
//! | `groups.json` | no | private channel mentions |
//! | `dms.json` | no | direct message titles |
//! | `mpims.json` | no | group DM titles |
//!
//! The [`Directory`] is built once per run and only read afterwards.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use super::{read_json, read_optional_json};
use crate::error::Result;

/// User id the vendor uses for its built-in bot.
pub const SLACKBOT_ID: &str = "USLACKBOT";

const SLACKBOT_NAME: &str = "slack bot";

#[derive(Debug, Deserialize)]
struct RawUser {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    real_name: Option<String>,
    #[serde(default)]
    profile: RawProfile,
}

#[derive(Debug, Default, Deserialize)]
struct RawProfile {
    #[serde(default)]
    real_name: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

impl RawUser {
    /// First non-empty of the profile's real name, real name, display name
    /// and handle.
    fn display_name(&self) -> Option<&str> {
        [
            self.profile.real_name.as_deref(),
            self.real_name.as_deref(),
            self.profile.display_name.as_deref(),
            self.name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct RawConversation {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    members: Vec<String>,
}

/// Read-only user and conversation lookups for one export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    users: HashMap<String, String>,
    channels: HashMap<String, String>,
    dms: HashMap<String, Vec<String>>,
    mpims: HashMap<String, Vec<String>>,
}

impl Directory {
    /// Creates an empty directory. Every lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the lookup files from `root`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::MalformedExport`](crate::ExportError::MalformedExport)
    /// if `users.json` or `channels.json` is missing, or if any present file
    /// cannot be parsed.
    pub fn load(root: &Path) -> Result<Self> {
        let mut directory = Self::new();

        let users: Vec<RawUser> = read_json(&root.join("users.json"))?;
        for user in users {
            let name = match user.display_name() {
                Some(name) => name.to_string(),
                None => {
                    warn!(user_id = %user.id, "no display name for user, using id");
                    user.id.clone()
                }
            };
            directory.users.insert(user.id, name);
        }

        let channels: Vec<RawConversation> = read_json(&root.join("channels.json"))?;
        let groups: Vec<RawConversation> = read_optional_json(&root.join("groups.json"))?;
        for conversation in channels.into_iter().chain(groups) {
            if let Some(name) = conversation.name {
                directory.channels.insert(conversation.id, name);
            }
        }

        let dms: Vec<RawConversation> = read_optional_json(&root.join("dms.json"))?;
        for dm in dms {
            directory.dms.insert(dm.id, dm.members);
        }

        let mpims: Vec<RawConversation> = read_optional_json(&root.join("mpims.json"))?;
        for mpim in mpims {
            if let Some(name) = mpim.name {
                directory.mpims.insert(name, mpim.members);
            }
        }

        debug!(
            users = directory.users.len(),
            channels = directory.channels.len(),
            dms = directory.dms.len(),
            mpims = directory.mpims.len(),
            "loaded workspace directory"
        );

        Ok(directory)
    }

    /// Registers a user display name.
    #[must_use]
    pub fn with_user(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.users.insert(id.into(), name.into());
        self
    }

    /// Registers a channel name.
    #[must_use]
    pub fn with_channel(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.channels.insert(id.into(), name.into());
        self
    }

    /// Registers a direct message conversation and its members.
    #[must_use]
    pub fn with_dm(mut self, id: impl Into<String>, members: Vec<String>) -> Self {
        self.dms.insert(id.into(), members);
        self
    }

    /// Display name for a user id. The vendor bot always resolves.
    pub fn user_name(&self, id: &str) -> Option<&str> {
        if id == SLACKBOT_ID {
            return Some(SLACKBOT_NAME);
        }
        self.users.get(id).map(String::as_str)
    }

    /// Channel name for a channel or private group id.
    pub fn channel_name(&self, id: &str) -> Option<&str> {
        self.channels.get(id).map(String::as_str)
    }

    /// Human-readable title for the channel stored in directory `dir_name`.
    ///
    /// Direct messages and group DMs are titled by their members, e.g.
    /// `Alice -- Bob`. Everything else keeps its directory name.
    pub fn channel_title(&self, dir_name: &str) -> String {
        let members = self.dms.get(dir_name).or_else(|| self.mpims.get(dir_name));
        match members {
            Some(members) if !members.is_empty() => members
                .iter()
                .map(|id| self.user_name(id).unwrap_or(id.as_str()))
                .collect::<Vec<_>>()
                .join(" -- "),
            _ => dir_name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_display_name_preference() {
        let user: RawUser = serde_json::from_str(
            r#"{"id": "U1", "name": "alice", "profile": {"real_name": "", "display_name": "Al"}}"#,
        )
        .unwrap();
        assert_eq!(user.display_name(), Some("Al"));

        let user: RawUser =
            serde_json::from_str(r#"{"id": "U2", "profile": {"real_name": "Bob Builder"}}"#).unwrap();
        assert_eq!(user.display_name(), Some("Bob Builder"));

        let user: RawUser = serde_json::from_str(r#"{"id": "U3"}"#).unwrap();
        assert_eq!(user.display_name(), None);
    }

    #[test]
    fn test_slackbot_always_resolves() {
        let directory = Directory::new();
        assert_eq!(directory.user_name(SLACKBOT_ID), Some("slack bot"));
        assert_eq!(directory.user_name("U404"), None);
    }

    #[test]
    fn test_dm_title() {
        let directory = Directory::new()
            .with_user("U1", "Alice")
            .with_user("U2", "Bob")
            .with_dm("D1", vec!["U1".into(), "U2".into(), "U9".into()]);

        assert_eq!(directory.channel_title("D1"), "Alice -- Bob -- U9");
        assert_eq!(directory.channel_title("general"), "general");
    }

    #[test]
    fn test_load_requires_users_and_channels() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("users.json"), "[]").unwrap();

        let err = Directory::load(dir.path()).unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("channels.json"));
    }

    #[test]
    fn test_load_full() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("users.json"),
            r#"[{"id": "U1", "name": "alice", "profile": {"real_name": "Alice"}},
                {"id": "U2", "name": "bob", "profile": {}}]"#,
        )
        .unwrap();
        fs::write(dir.path().join("channels.json"), r#"[{"id": "C1", "name": "general"}]"#).unwrap();
        fs::write(dir.path().join("groups.json"), r#"[{"id": "G1", "name": "secret"}]"#).unwrap();
        fs::write(dir.path().join("dms.json"), r#"[{"id": "D1", "members": ["U1", "U2"]}]"#).unwrap();

        let directory = Directory::load(dir.path()).unwrap();
        assert_eq!(directory.user_name("U1"), Some("Alice"));
        assert_eq!(directory.user_name("U2"), Some("bob"));
        assert_eq!(directory.channel_name("C1"), Some("general"));
        assert_eq!(directory.channel_name("G1"), Some("secret"));
        assert_eq!(directory.channel_title("D1"), "Alice -- bob");
    }

    #[test]
    fn test_group_dm_title() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("users.json"),
            r#"[{"id": "U1", "name": "alice"}, {"id": "U2", "name": "bob"}]"#,
        )
        .unwrap();
        fs::write(dir.path().join("channels.json"), "[]").unwrap();
        fs::write(
            dir.path().join("mpims.json"),
            r#"[{"id": "G9", "name": "mpdm-alice--bob--carol-1", "members": ["U1", "U2", "U3"]}]"#,
        )
        .unwrap();

        let directory = Directory::load(dir.path()).unwrap();
        assert_eq!(directory.channel_title("mpdm-alice--bob--carol-1"), "alice -- bob -- U3");
        assert_eq!(directory.channel_title("G9"), "G9");
        assert_eq!(directory.channel_name("G9"), None);
    }
}
