//! Shared export fixtures for integration and CLI tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use tempfile::{TempDir, tempdir};

/// 2023-01-01 12:00:00 UTC
pub const GENERAL_START: i64 = 1_672_574_400;
/// 2023-02-01 12:00:00 UTC
pub const RANDOM_START: i64 = 1_675_252_800;
pub const DAY: i64 = 86_400;

/// Builds an export root on disk.
pub struct ExportBuilder {
    dir: TempDir,
}

impl ExportBuilder {
    /// An export with the lookup files and no channels.
    pub fn new() -> Self {
        let dir = tempdir().expect("Failed to create temp dir");
        fs::write(
            dir.path().join("users.json"),
            r#"[
  {"id": "U1", "name": "alice", "profile": {"real_name": "Alice Liddell"}},
  {"id": "U2", "name": "bob", "real_name": "Bob"}
]"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("channels.json"),
            r#"[
  {"id": "C1", "name": "general", "members": ["U1", "U2"]},
  {"id": "C2", "name": "random", "members": ["U1"]}
]"#,
        )
        .unwrap();
        Self { dir }
    }

    /// Adds `count` messages, one per day at noon UTC from `start`, each in
    /// its own day file.
    pub fn with_daily_messages(self, channel: &str, start: i64, count: i64) -> Self {
        for i in 0..count {
            let ts = start + i * DAY;
            let day = chrono::DateTime::from_timestamp(ts, 0)
                .unwrap()
                .format("%Y-%m-%d")
                .to_string();
            let user = if i % 2 == 0 { "U1" } else { "U2" };
            self.write_day(
                channel,
                &day,
                &format!(
                    r#"[{{"type": "message", "ts": "{ts}.000100", "user": "{user}", "text": "{channel} message {i}"}}]"#
                ),
            );
        }
        self
    }

    /// Writes a raw day file.
    pub fn with_day(self, channel: &str, day: &str, json: &str) -> Self {
        self.write_day(channel, day, json);
        self
    }

    /// Adds a root-level file.
    pub fn with_file(self, name: &str, content: &str) -> Self {
        fs::write(self.dir.path().join(name), content).unwrap();
        self
    }

    fn write_day(&self, channel: &str, day: &str, json: &str) {
        let dir = self.dir.path().join(channel);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{day}.json")), json).unwrap();
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn build(self) -> TempDir {
        self.dir
    }
}

/// `general`: 5 messages on 2023-01-01..05; `random`: 3 on 2023-02-01..03.
pub fn scenario_export() -> TempDir {
    ExportBuilder::new()
        .with_daily_messages("general", GENERAL_START, 5)
        .with_daily_messages("random", RANDOM_START, 3)
        .build()
}

/// Writes a filter file next to the export and returns its path.
pub fn write_filter(dir: &Path, yaml: &str) -> std::path::PathBuf {
    let path = dir.join("filter.yaml");
    fs::write(&path, yaml).unwrap();
    path
}
