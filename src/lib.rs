//! # slackpack
//!
//! A Rust library for turning Slack workspace exports into readable
//! documents, one per channel, optionally filtered by channel and date.
//!
//! ## Overview
//!
//! An export is the unzipped archive produced by Slack's workspace export
//! tool: lookup files (`users.json`, `channels.json`, ...) and one directory
//! per conversation holding a JSON file per day. slackpack runs it through
//! four stages:
//!
//! 1. **Read** - [`export::read_export`] loads the whole export or fails
//! 2. **Normalize** - [`parsing::normalize_channel`] resolves mentions,
//!    emoji, rich text blocks, system events and threads into [`Message`]s
//! 3. **Filter** - [`core::apply_filters`] keeps the channels and days named
//!    in a [`FilterSpec`](core::FilterSpec)
//! 4. **Render** - a [`Renderer`](render::Renderer) writes each channel;
//!    [`PdfRenderer`](render::PdfRenderer) is the shipped one
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use slackpack::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = ExportConfig::new("slack-export").with_output_dir("pdf");
//!     let filter = FilterSpec::from_file("filter.yaml".as_ref())?;
//!     let renderer = PdfRenderer::new(RenderConfig::default());
//!
//!     let summary = run(&config, Some(&filter), &renderer)?;
//!     for path in summary.rendered_paths() {
//!         println!("wrote {}", path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Working with channels directly
//!
//! ```rust,no_run
//! use chrono_tz::Tz;
//! use slackpack::export::read_export;
//! use slackpack::parsing::normalize_channel;
//!
//! # fn main() -> slackpack::Result<()> {
//! let export = read_export("slack-export".as_ref())?;
//! for (name, raws) in &export.channels {
//!     let channel = normalize_channel(name, raws, &export.directory, Tz::UTC);
//!     println!("{}: {} messages", channel.title, channel.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Structure
//!
//! - [`export`] - Export Reader and the workspace [`Directory`](export::Directory)
//! - [`parsing`] - Message Normalizer (raw records, text, subtypes)
//! - [`core`] - Filter Engine ([`FilterSpec`](core::FilterSpec), [`apply_filters`](core::apply_filters))
//! - [`render`] - [`Renderer`](render::Renderer) trait and the PDF backend
//! - [`pipeline`] - One conversion run and its [`RunSummary`](pipeline::RunSummary)
//! - [`config`] - [`ExportConfig`](config::ExportConfig), [`RenderConfig`](config::RenderConfig)
//! - [`message`] - [`Message`], [`Channel`], [`Attachment`]
//! - [`cli`] - clap argument types (requires the `cli` feature)
//! - [`error`] - Unified error type ([`ExportError`], [`Result`])
//! - [`prelude`] - Convenient re-exports
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `pdf` | yes | [`PdfRenderer`](render::PdfRenderer) via `lopdf` |
//! | `cli` | yes | [`cli`] and the `slackpack` binary |

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod export;
pub mod message;
pub mod parsing;
pub mod pipeline;
pub mod render;

// Re-export the main types at the crate root for convenience
pub use error::{ExportError, Result};
pub use message::{Attachment, AttachmentState, Channel, Message};

/// Convenient re-exports for common usage.
///
/// Import everything you need with a single line:
///
/// ```rust
/// use slackpack::prelude::*;
/// ```
pub mod prelude {
    // Message model
    pub use crate::message::{Attachment, AttachmentState, Channel, Message};

    // Error types
    pub use crate::error::{ExportError, Result};

    // Configuration
    pub use crate::config::{ExportConfig, PageSize, RenderConfig};

    // Reading and normalizing
    pub use crate::export::{Directory, RawExport, read_export};
    pub use crate::parsing::{RawMessage, normalize_channel, normalize_message};

    // Filtering
    pub use crate::core::filter::{DateRange, FilterSpec, apply_filters};

    // Rendering
    #[cfg(feature = "pdf")]
    pub use crate::render::PdfRenderer;
    pub use crate::render::{Document, Renderer};

    // Running
    pub use crate::pipeline::{ChannelOutcome, RunSummary, run};
}
