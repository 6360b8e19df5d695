//! Export Reader: walks an unzipped Slack export.
//!
//! Expected layout:
//!
//! ```text
//! export-root/
//! ├── users.json
//! ├── channels.json
//! ├── groups.json        (optional)
//! ├── dms.json           (optional)
//! ├── mpims.json         (optional)
//! ├── general/
//! │   ├── 2023-01-01.json
//! │   └── 2023-01-02.json
//! └── D024BE91L/
//!     └── 2023-01-03.json
//! ```
//!
//! Each day file is a JSON array of raw messages. The reader never writes
//! anything; it either returns the whole export or fails.
//!
//! # Example
//!
//! ```rust,no_run
//! use slackpack::export::read_export;
//!
//! # fn main() -> slackpack::Result<()> {
//! let export = read_export("slack-export".as_ref())?;
//! for (channel, messages) in &export.channels {
//!     println!("{channel}: {} messages", messages.len());
//! }
//! # Ok(())
//! # }
//! ```

mod directory;

pub use directory::{Directory, SLACKBOT_ID};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{ExportError, Result};
use crate::parsing::RawMessage;

/// Everything read from an export root, before normalization.
#[derive(Debug, Clone)]
pub struct RawExport {
    /// The export root that was read.
    pub root: PathBuf,
    /// Workspace users and conversations.
    pub directory: Directory,
    /// Raw messages per channel directory, in file order.
    pub channels: BTreeMap<String, Vec<RawMessage>>,
    /// Channel directories that contained no messages.
    pub empty: Vec<String>,
}

impl RawExport {
    /// Returns `true` if `name` is a channel directory of this export,
    /// including empty ones.
    pub fn contains(&self, name: &str) -> bool {
        self.channels.contains_key(name) || self.empty.iter().any(|e| e == name)
    }

    /// Total number of raw messages across all channels.
    pub fn message_count(&self) -> usize {
        self.channels.values().map(Vec::len).sum()
    }
}

/// Reads a complete export rooted at `root`.
///
/// # Errors
///
/// Returns [`ExportError::MalformedExport`] if the root is not a directory,
/// a required lookup file is missing, or any JSON file cannot be parsed.
/// Empty channels are not errors; they are listed in [`RawExport::empty`].
pub fn read_export(root: &Path) -> Result<RawExport> {
    if !root.is_dir() {
        return Err(ExportError::malformed(root, "export root is not a directory"));
    }

    let directory = Directory::load(root)?;
    let mut channels = BTreeMap::new();
    let mut empty = Vec::new();

    for (name, path) in list_entries(root, |p| p.is_dir())? {
        let messages = read_channel(&path)?;
        if messages.is_empty() {
            warn!(channel = %name, "{}", ExportError::empty_export(&name));
            empty.push(name);
        } else {
            debug!(channel = %name, messages = messages.len(), "read channel");
            channels.insert(name, messages);
        }
    }

    Ok(RawExport {
        root: root.to_path_buf(),
        directory,
        channels,
        empty,
    })
}

/// Reads every `*.json` day file of one channel directory, in file name order.
pub fn read_channel(dir: &Path) -> Result<Vec<RawMessage>> {
    let mut messages = Vec::new();
    let day_files = list_entries(dir, |p| {
        p.is_file() && p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    })?;

    for (_, path) in day_files {
        let mut day: Vec<RawMessage> = read_json(&path)?;
        messages.append(&mut day);
    }

    Ok(messages)
}

/// Lists non-hidden entries of `dir` matching `keep`, sorted by name.
fn list_entries(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(dir).map_err(|e| ExportError::malformed(dir, e.to_string()))?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ExportError::malformed(dir, e.to_string()))?;
        let path = entry.path();
        let Some(name) = entry.file_name().to_str().map(ToString::to_string) else {
            warn!(path = %path.display(), "skipping entry with non UTF-8 name");
            continue;
        };
        if name.starts_with('.') || name.starts_with("__") || !keep(&path) {
            continue;
        }
        found.push((name, path));
    }

    found.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(found)
}

/// Reads and deserializes a JSON file. Any failure makes the export malformed.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| ExportError::malformed(path, e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| ExportError::malformed(path, e.to_string()))
}

/// Like [`read_json`], but a missing file yields `T::default()`.
pub(crate) fn read_optional_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        debug!(path = %path.display(), "optional export file not present");
        return Ok(T::default());
    }
    read_json(path)
}
