//! # slackpack CLI
//!
//! Command-line interface for the slackpack library.

use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use slackpack::ExportError;
use slackpack::cli::{Args, Command, RunArgs};
use slackpack::core::FilterSpec;
use slackpack::pipeline::{self, ChannelOutcome, RunSummary};
use slackpack::render::{PdfRenderer, Renderer};

/// Exit code when the run completed but produced no document.
const EXIT_NOTHING_RENDERED: i32 = 2;

fn main() {
    let args = <Args as ClapParser>::parse();
    init_logging(args.log_level.as_filter());

    let result = match &args.command {
        Command::Run(run_args) => run(run_args),
    };

    match result {
        Ok(summary) if summary.is_success() => {}
        Ok(_) => {
            eprintln!("⚠️  No channel was rendered");
            process::exit(EXIT_NOTHING_RENDERED);
        }
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            process::exit(1);
        }
    }
}

fn init_logging(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(args: &RunArgs) -> Result<RunSummary, ExportError> {
    let total_start = Instant::now();
    let config = args.export_config()?;
    let renderer = PdfRenderer::new(args.render_config());

    // Print header
    println!("📦 slackpack v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Input:    {}", config.export_root.display());
    println!("💾 Output:   {}", config.output_dir.display());
    println!("🕐 Timezone: {}", config.timezone);
    println!("📄 Format:   {} ({})", renderer.name(), renderer.config().page_size);

    let filter = match &args.filter {
        Some(path) => {
            let spec = FilterSpec::from_file(path)?;
            println!("🔍 Filter:   {} ({} channels)", path.display(), spec.channels.len());
            Some(spec)
        }
        None => None,
    };
    if config.force {
        println!("♻️  Force:    existing documents are rebuilt");
    }
    println!();

    println!("⏳ Converting...");
    let summary = pipeline::run(&config, filter.as_ref(), &renderer)?;

    for report in &summary.reports {
        match &report.outcome {
            ChannelOutcome::Rendered { path, messages } => {
                println!("   ✅ {} → {} ({} messages)", report.channel, path.display(), messages);
            }
            ChannelOutcome::UpToDate { path } => {
                println!("   ⏭️  {} → {} (up to date)", report.channel, path.display());
            }
            ChannelOutcome::Skipped(e) => println!("   ⚠️  {}: {}", report.channel, e),
            ChannelOutcome::Excluded => {}
        }
    }
    for warning in &summary.warnings {
        println!("   ⚠️  {}", warning);
    }

    // Summary
    println!();
    println!("📊 Summary:");
    println!("   Rendered:   {}", summary.rendered());
    println!("   Up to date: {}", summary.up_to_date());
    println!("   Excluded:   {}", summary.excluded());
    println!("   Skipped:    {}", summary.skipped());
    println!("   Warnings:   {}", summary.warnings.len());
    println!();
    println!("⚡ Total time: {:.2}s", total_start.elapsed().as_secs_f64());

    Ok(summary)
}
