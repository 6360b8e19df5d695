//! One conversion run: read, normalize, filter, render.
//!
//! The whole export is read before anything is written, so a malformed
//! export never leaves partial output behind. After that every channel is
//! handled on its own; a failure in one is recorded in the [`RunSummary`]
//! and the rest carry on.
//!
//! # Example
//!
//! ```rust,no_run
//! use slackpack::config::{ExportConfig, RenderConfig};
//! use slackpack::pipeline::run;
//! use slackpack::render::PdfRenderer;
//!
//! # fn main() -> slackpack::Result<()> {
//! let config = ExportConfig::new("slack-export").with_output_dir("pdf");
//! let renderer = PdfRenderer::new(RenderConfig::default());
//!
//! let summary = run(&config, None, &renderer)?;
//! println!("{} rendered, {} skipped", summary.rendered(), summary.skipped());
//! # Ok(())
//! # }
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::Channel;
use crate::config::ExportConfig;
use crate::core::filter::{FilterSpec, apply_filters};
use crate::error::{ExportError, Result};
use crate::export::read_export;
use crate::parsing::normalize_channel;
use crate::render::{Document, Renderer, output_path};

/// What happened to one channel.
#[derive(Debug)]
pub enum ChannelOutcome {
    /// A document was written.
    Rendered { path: PathBuf, messages: usize },
    /// The document already existed and `force` was off.
    UpToDate { path: PathBuf },
    /// Not selected by the filter, or no messages left after filtering.
    Excluded,
    /// Could not be processed.
    Skipped(ExportError),
}

/// Outcome for a named channel.
#[derive(Debug)]
pub struct ChannelReport {
    pub channel: String,
    pub outcome: ChannelOutcome,
}

/// Result of a completed run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// One report per channel directory of the export, in name order.
    pub reports: Vec<ChannelReport>,
    /// Problems that are not about a channel of the export, such as filter
    /// entries naming channels that do not exist.
    pub warnings: Vec<ExportError>,
}

impl RunSummary {
    fn count(&self, pred: impl Fn(&ChannelOutcome) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.outcome)).count()
    }

    /// Number of documents written.
    pub fn rendered(&self) -> usize {
        self.count(|o| matches!(o, ChannelOutcome::Rendered { .. }))
    }

    /// Number of documents left in place.
    pub fn up_to_date(&self) -> usize {
        self.count(|o| matches!(o, ChannelOutcome::UpToDate { .. }))
    }

    /// Number of channels filtered out.
    pub fn excluded(&self) -> usize {
        self.count(|o| matches!(o, ChannelOutcome::Excluded))
    }

    /// Number of channels that failed.
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ChannelOutcome::Skipped(_)))
    }

    /// Returns `true` if at least one channel has a document.
    pub fn is_success(&self) -> bool {
        self.rendered() + self.up_to_date() > 0
    }

    /// Paths of documents written in this run.
    pub fn rendered_paths(&self) -> Vec<&Path> {
        self.reports
            .iter()
            .filter_map(|r| match &r.outcome {
                ChannelOutcome::Rendered { path, .. } => Some(path.as_path()),
                _ => None,
            })
            .collect()
    }

    /// Looks up the report of `channel`.
    pub fn report(&self, channel: &str) -> Option<&ChannelReport> {
        self.reports.iter().find(|r| r.channel == channel)
    }
}

/// Runs a conversion.
///
/// # Errors
///
/// Returns an error only for problems that affect the whole run: a malformed
/// export, or an output directory that cannot be created. Everything else is
/// reported per channel in the returned [`RunSummary`].
pub fn run(
    config: &ExportConfig,
    filter: Option<&FilterSpec>,
    renderer: &dyn Renderer,
) -> Result<RunSummary> {
    let export = read_export(&config.export_root)?;
    info!(
        root = %export.root.display(),
        channels = export.channels.len(),
        messages = export.message_count(),
        "read export"
    );

    let mut summary = RunSummary::default();
    let mut reports = BTreeMap::new();

    for name in &export.empty {
        reports.insert(
            name.clone(),
            ChannelOutcome::Skipped(ExportError::empty_export(name)),
        );
    }

    let channels: BTreeMap<String, Channel> = export
        .channels
        .iter()
        .map(|(name, raws)| {
            let channel = normalize_channel(name, raws, &export.directory, config.timezone);
            (name.clone(), channel)
        })
        .collect();

    if let Some(spec) = filter {
        for name in spec.unknown_channels(|name| export.contains(name)) {
            let warning = ExportError::unknown_channel(name);
            warn!(channel = name, "{warning}");
            summary.warnings.push(warning);
        }
    }

    let names: Vec<String> = channels.keys().cloned().collect();
    let retained = apply_filters(channels, filter);
    for name in names {
        if !retained.contains_key(&name) {
            debug!(channel = %name, "excluded by filter");
            reports.insert(name, ChannelOutcome::Excluded);
        }
    }

    if !retained.is_empty() {
        fs::create_dir_all(&config.output_dir)?;
    }

    let mut claimed = HashSet::new();
    for (name, channel) in &retained {
        let mut path = output_path(&config.output_dir, &channel.title, renderer.extension());
        if !claimed.insert(path.clone()) {
            path = output_path(
                &config.output_dir,
                &format!("{}-{name}", channel.title),
                renderer.extension(),
            );
            claimed.insert(path.clone());
        }
        let outcome = render_channel(config, renderer, channel, path);
        reports.insert(name.clone(), outcome);
    }

    summary.reports = reports
        .into_iter()
        .map(|(channel, outcome)| ChannelReport { channel, outcome })
        .collect();

    info!(
        rendered = summary.rendered(),
        up_to_date = summary.up_to_date(),
        excluded = summary.excluded(),
        skipped = summary.skipped(),
        "run finished"
    );
    Ok(summary)
}

fn render_channel(
    config: &ExportConfig,
    renderer: &dyn Renderer,
    channel: &Channel,
    path: PathBuf,
) -> ChannelOutcome {
    if path.exists() {
        if !config.force {
            info!(channel = %channel.name, path = %path.display(), "up to date");
            return ChannelOutcome::UpToDate { path };
        }
        warn!(channel = %channel.name, path = %path.display(), "overwriting existing document");
    }

    let document = Document::new(channel);
    match renderer.render(&document, &path) {
        Ok(()) => {
            info!(
                channel = %channel.name,
                renderer = renderer.name(),
                messages = channel.len(),
                path = %path.display(),
                "rendered"
            );
            ChannelOutcome::Rendered {
                path,
                messages: channel.len(),
            }
        }
        Err(e) => {
            let err = ExportError::render(&channel.name, e);
            warn!(channel = %channel.name, "{err}");
            if path.exists() {
                if let Err(e) = fs::remove_file(&path) {
                    debug!(path = %path.display(), error = %e, "could not remove partial document");
                }
            }
            ChannelOutcome::Skipped(err)
        }
    }
}
