//! Command-line interface definition using clap.
//!
//! This module defines:
//! - [`Args`] - CLI argument structure (for use with clap)
//! - [`RunArgs`] - options of the `run` subcommand
//! - [`LogLevel`] - verbosity of the diagnostic log
//! - [`PageSizeArg`] - page format choices
//!
//! # Example
//!
//! ```rust
//! use clap::Parser;
//! use slackpack::cli::{Args, Command};
//!
//! let args = Args::parse_from(["slackpack", "run", "export", "--timezone", "Asia/Tokyo"]);
//! let Command::Run(run) = args.command;
//! let config = run.export_config().unwrap();
//! assert_eq!(config.timezone, chrono_tz::Asia::Tokyo);
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::{ExportConfig, PageSize, RenderConfig};
use crate::error::Result;

/// Convert an unzipped Slack export into one PDF per channel.
#[derive(Parser, Debug, Clone)]
#[command(name = "slackpack")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    slackpack run ./slack-export
    slackpack run ./slack-export --filter filter.yaml -o pdf
    slackpack run ./slack-export --timezone Europe/Berlin --page-size a4 -f")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Diagnostic log verbosity (RUST_LOG overrides)
    #[arg(long, value_enum, default_value = "info", global = true)]
    pub log_level: LogLevel,
}

/// Subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Render every channel of an export
    Run(RunArgs),
}

/// Options of `slackpack run`.
#[derive(clap::Args, Debug, Clone)]
pub struct RunArgs {
    /// Path to the unzipped export
    pub export_root: PathBuf,

    /// YAML file selecting channels and date ranges
    #[arg(long, value_name = "FILE")]
    pub filter: Option<PathBuf>,

    /// Directory receiving the documents
    #[arg(short, long, value_name = "DIR", default_value = "out")]
    pub output: PathBuf,

    /// IANA timezone for times and date filtering
    #[arg(long, value_name = "TZ", default_value = "UTC")]
    pub timezone: String,

    /// Overwrite documents that already exist
    ///
    /// Without this flag an existing document is kept and reported as up to
    /// date. A run that only finds up-to-date documents still exits with 0.
    #[arg(short, long)]
    pub force: bool,

    /// Page format
    #[arg(long, value_enum, default_value = "letter")]
    pub page_size: PageSizeArg,
}

impl RunArgs {
    /// Builds the run configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidTimezone`](crate::ExportError::InvalidTimezone)
    /// for an unknown timezone name.
    pub fn export_config(&self) -> Result<ExportConfig> {
        Ok(ExportConfig::new(&self.export_root)
            .with_output_dir(&self.output)
            .with_timezone_name(&self.timezone)?
            .with_force(self.force))
    }

    /// Builds the renderer layout.
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig::new().with_page_size(self.page_size.into())
    }
}

/// Diagnostic log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// The `EnvFilter` directive for this level.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_filter())
    }
}

/// Page format choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default)]
pub enum PageSizeArg {
    /// US Letter (default)
    #[default]
    Letter,

    /// ISO A4
    A4,
}

// Conversion to library page size
impl From<PageSizeArg> for PageSize {
    fn from(arg: PageSizeArg) -> PageSize {
        match arg {
            PageSizeArg::Letter => PageSize::Letter,
            PageSizeArg::A4 => PageSize::A4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(extra: &[&str]) -> RunArgs {
        let argv = ["slackpack", "run", "export"].iter().chain(extra);
        match Args::try_parse_from(argv).unwrap().command {
            Command::Run(args) => args,
        }
    }

    #[test]
    fn test_defaults() {
        let args = run_args(&[]);
        assert_eq!(args.export_root, PathBuf::from("export"));
        assert_eq!(args.filter, None);
        assert_eq!(args.output, PathBuf::from("out"));
        assert!(!args.force);

        let config = args.export_config().unwrap();
        assert_eq!(config.timezone, chrono_tz::Tz::UTC);
        assert_eq!(args.render_config().page_size, PageSize::Letter);
    }

    #[test]
    fn test_all_options() {
        let args = run_args(&[
            "--filter", "f.yaml", "-o", "pdf", "--timezone", "Europe/Berlin", "-f", "--page-size", "a4",
        ]);
        assert_eq!(args.filter, Some(PathBuf::from("f.yaml")));
        assert!(args.force);
        assert_eq!(args.render_config().page_size, PageSize::A4);
        assert_eq!(args.export_config().unwrap().output_dir, PathBuf::from("pdf"));
    }

    #[test]
    fn test_invalid_timezone() {
        let args = run_args(&["--timezone", "Mars/Olympus"]);
        assert!(args.export_config().is_err());
    }

    #[test]
    fn test_log_level_is_global() {
        let args = Args::try_parse_from(["slackpack", "run", "export", "--log-level", "debug"]).unwrap();
        assert_eq!(args.log_level, LogLevel::Debug);
        assert_eq!(args.log_level.to_string(), "debug");
    }

    #[test]
    fn test_run_requires_export_root() {
        assert!(Args::try_parse_from(["slackpack", "run"]).is_err());
        assert!(Args::try_parse_from(["slackpack"]).is_err());
    }
}
