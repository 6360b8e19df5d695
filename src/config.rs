//! Configuration types for a conversion run and for the renderer.
//!
//! These are plain builder-style structs with no CLI framework dependency, so
//! the library can be driven without `clap`.
//!
//! - [`ExportConfig`] - where to read, where to write, which timezone
//! - [`RenderConfig`] - page geometry and font sizes
//!
//! # Example
//!
//! ```rust
//! use slackpack::config::{ExportConfig, PageSize, RenderConfig};
//!
//! # fn main() -> slackpack::Result<()> {
//! let config = ExportConfig::new("slack-export")
//!     .with_output_dir("pdf")
//!     .with_timezone_name("Europe/Berlin")?
//!     .with_force(true);
//!
//! let render = RenderConfig::new().with_page_size(PageSize::A4);
//! assert_eq!(render.page_size.dimensions(), (595, 842));
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};

/// Settings for one conversion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// The unzipped export directory.
    pub export_root: PathBuf,

    /// Directory receiving one document per channel (default: `out`)
    pub output_dir: PathBuf,

    /// Timezone used for display and for date filtering (default: UTC)
    pub timezone: Tz,

    /// Overwrite documents that already exist (default: false)
    pub force: bool,
}

impl ExportConfig {
    /// Creates a configuration reading from `export_root` with defaults.
    pub fn new(export_root: impl Into<PathBuf>) -> Self {
        Self {
            export_root: export_root.into(),
            output_dir: PathBuf::from("out"),
            timezone: Tz::UTC,
            force: false,
        }
    }

    /// Sets the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Sets the display timezone.
    #[must_use]
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    /// Sets the display timezone from an IANA name such as `Asia/Tokyo`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidTimezone`] for unknown names.
    pub fn with_timezone_name(self, name: &str) -> Result<Self> {
        let timezone = name
            .parse::<Tz>()
            .map_err(|_| ExportError::InvalidTimezone(name.to_string()))?;
        Ok(self.with_timezone(timezone))
    }

    /// Sets whether existing documents are overwritten.
    #[must_use]
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// Supported page formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    /// US Letter, 8.5 x 11 in
    #[default]
    Letter,
    /// ISO A4, 210 x 297 mm
    A4,
}

impl PageSize {
    /// Width and height in PDF points.
    pub fn dimensions(self) -> (i64, i64) {
        match self {
            PageSize::Letter => (612, 792),
            PageSize::A4 => (595, 842),
        }
    }
}

impl std::fmt::Display for PageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageSize::Letter => write!(f, "Letter"),
            PageSize::A4 => write!(f, "A4"),
        }
    }
}

impl std::str::FromStr for PageSize {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "letter" => Ok(PageSize::Letter),
            "a4" => Ok(PageSize::A4),
            _ => Err(format!("Unknown page size: '{}'. Expected one of: letter, a4", s)),
        }
    }
}

/// Layout settings for document renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Page format (default: Letter)
    pub page_size: PageSize,

    /// Margin on all four sides, in points (default: 57, about 2 cm)
    pub margin: i64,

    /// Channel title font size (default: 18)
    pub title_size: i64,

    /// Day heading font size (default: 14)
    pub heading_size: i64,

    /// Message body font size (default: 10)
    pub body_size: i64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::Letter,
            margin: 57,
            title_size: 18,
            heading_size: 14,
            body_size: 10,
        }
    }
}

impl RenderConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page format.
    #[must_use]
    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the page margin in points.
    #[must_use]
    pub fn with_margin(mut self, margin: i64) -> Self {
        self.margin = margin;
        self
    }

    /// Sets the body font size in points.
    #[must_use]
    pub fn with_body_size(mut self, size: i64) -> Self {
        self.body_size = size;
        self
    }
}
