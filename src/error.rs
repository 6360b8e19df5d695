//! Unified error types for slackpack.
//!
//! This module provides a single [`ExportError`] enum that covers all error
//! cases in the library, in the same spirit as `serde_json::Error` or
//! `csv::Error`.
//!
//! # Fatal vs. per-channel errors
//!
//! - [`MalformedExport`](ExportError::MalformedExport) aborts the whole run:
//!   the export root is unusable.
//! - [`EmptyExport`](ExportError::EmptyExport),
//!   [`UnknownChannel`](ExportError::UnknownChannel) and
//!   [`Render`](ExportError::Render) only ever affect one channel. The pipeline
//!   records them in its summary instead of returning them.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// A specialized [`Result`] type for slackpack operations.
///
/// # Example
///
/// ```rust
/// use slackpack::error::Result;
/// use slackpack::Channel;
///
/// fn load_nothing() -> Result<Vec<Channel>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, ExportError>;

/// The error type for all slackpack operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    /// The export root cannot be used.
    ///
    /// Raised when:
    /// - The root is not a directory
    /// - `users.json` or `channels.json` is missing
    /// - A history file is not valid JSON or a message lacks `type`/`ts`
    #[error("Malformed export ({}): {reason}", path.display())]
    MalformedExport {
        /// The file or directory that could not be used
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// A channel directory contained no messages.
    #[error("Channel '{channel}' has no messages")]
    EmptyExport {
        /// Name of the channel directory
        channel: String,
    },

    /// The filter names a channel that is not part of the export.
    #[error("Channel '{channel}' from the filter is not in the export")]
    UnknownChannel {
        /// The channel name from the filter file
        channel: String,
    },

    /// The renderer failed to produce a document for a channel.
    #[error("Failed to render channel '{channel}': {reason}")]
    Render {
        /// Name of the channel being rendered
        channel: String,
        /// Description of the underlying failure
        reason: String,
    },

    /// The filter file is structurally valid YAML but semantically wrong.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// Invalid date in a filter range.
    #[error("Invalid date '{input}'. Expected format: {expected}")]
    InvalidDate {
        /// The invalid date string that was provided
        input: String,
        /// Expected format description
        expected: &'static str,
    },

    /// The display timezone is not a known IANA name.
    #[error("Unknown timezone '{0}'")]
    InvalidTimezone(String),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing error (filter file).
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Error from the PDF backend.
    #[cfg(feature = "pdf")]
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl ExportError {
    /// Creates a malformed export error for `path`.
    pub fn malformed(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        ExportError::MalformedExport {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Creates an empty export error for `channel`.
    pub fn empty_export(channel: impl Into<String>) -> Self {
        ExportError::EmptyExport {
            channel: channel.into(),
        }
    }

    /// Creates an unknown channel warning for `channel`.
    pub fn unknown_channel(channel: impl Into<String>) -> Self {
        ExportError::UnknownChannel {
            channel: channel.into(),
        }
    }

    /// Wraps any failure while rendering `channel`.
    pub fn render(channel: impl Into<String>, reason: impl ToString) -> Self {
        ExportError::Render {
            channel: channel.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates an invalid date error.
    pub fn invalid_date(input: impl Into<String>) -> Self {
        ExportError::InvalidDate {
            input: input.into(),
            expected: "YYYY-MM-DD",
        }
    }

    /// Returns `true` if this error aborts a run.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ExportError::EmptyExport { .. }
                | ExportError::UnknownChannel { .. }
                | ExportError::Render { .. }
        )
    }

    /// Returns `true` if this is a malformed export error.
    pub fn is_malformed(&self) -> bool {
        matches!(self, ExportError::MalformedExport { .. })
    }

    /// Returns `true` if this is an I/O error.
    pub fn is_io(&self) -> bool {
        matches!(self, ExportError::Io(_))
    }

    /// Returns the channel this error is about, if any.
    pub fn channel(&self) -> Option<&str> {
        match self {
            ExportError::EmptyExport { channel }
            | ExportError::UnknownChannel { channel }
            | ExportError::Render { channel, .. } => Some(channel),
            _ => None,
        }
    }
}
