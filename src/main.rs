//! prefix-export: builds per-country and per-continent prefix and ASN lists.
//!
//! This is the command-line interface for the prefix_export library.

#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use prefix_export::source::ripestat::{DEFAULT_RIPESTAT_URL, DEFAULT_USER_AGENT};
use prefix_export::{EmptyPolicy, ExportConfig, ExportConfigBuilder, RunSummary, SourceKind};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the exporter.
#[derive(Parser, Debug)]
#[clap(author, version, about = "Per-country and per-continent IP prefix and ASN lists from RIPEstat", long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Command,

    /// Enable verbose output (-v debug, -vv trace)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// RIPEstat Data API root
    #[clap(long, default_value = DEFAULT_RIPESTAT_URL, global = true)]
    ripestat_url: String,

    /// User-Agent header for HTTP requests
    #[clap(long, default_value = DEFAULT_USER_AGENT, global = true)]
    user_agent: String,

    /// Per-request timeout in seconds
    #[clap(long, default_value_t = 60, global = true)]
    timeout_secs: u64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build continent lists from a country/region mapping
    Continents {
        /// Mapping document URL or path
        #[clap(long, default_value = prefix_export::region::DEFAULT_MAPPING_URL)]
        mapping: String,

        /// Where per-country resources come from
        #[clap(long, value_enum, default_value_t = SourceArg::Ripestat)]
        source: SourceArg,

        /// Root of existing per-country lists (local source)
        #[clap(long, default_value = ".")]
        input: PathBuf,

        #[clap(flatten)]
        output: OutputArgs,

        #[clap(flatten)]
        pacing: PacingArgs,
    },

    /// Build per-country lists from RIPEstat
    Countries {
        /// Country codes (ISO-3166 alpha-2)
        #[clap(required = true)]
        codes: Vec<String>,

        #[clap(flatten)]
        output: OutputArgs,

        #[clap(flatten)]
        pacing: PacingArgs,
    },

    /// Write the announced-prefix report of one country
    Announced {
        /// Country code (ISO-3166 alpha-2)
        code: String,

        /// Output directory
        #[clap(short, long, default_value = ".")]
        output: PathBuf,

        #[clap(flatten)]
        pacing: PacingArgs,
    },
}

#[derive(ClapArgs, Debug)]
struct OutputArgs {
    /// Output directory
    #[clap(short, long, default_value = ".")]
    output: PathBuf,

    /// Write empty lists instead of leaving them out
    #[clap(long)]
    write_empty: bool,

    /// Do not write metadata.json
    #[clap(long)]
    no_metadata: bool,
}

#[derive(ClapArgs, Debug)]
struct PacingArgs {
    /// Pause after this many registry calls (0 disables pacing)
    #[clap(long, default_value_t = prefix_export::aggregate::DEFAULT_PACE_EVERY)]
    pace_every: usize,

    /// Length of each pause in milliseconds
    #[clap(long, default_value_t = 1000)]
    pace_pause_ms: u64,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum SourceArg {
    Ripestat,
    Local,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn base_config(args: &Args) -> ExportConfigBuilder {
    ExportConfig::builder()
        .ripestat_url(args.ripestat_url.clone())
        .user_agent(args.user_agent.clone())
        .request_timeout(Duration::from_secs(args.timeout_secs))
}

fn with_output(builder: ExportConfigBuilder, output: &OutputArgs) -> ExportConfigBuilder {
    let policy = if output.write_empty {
        EmptyPolicy::Write
    } else {
        EmptyPolicy::Skip
    };
    builder
        .output_dir(output.output.clone())
        .empty_policy(policy)
        .write_metadata(!output.no_metadata)
}

fn with_pacing(builder: ExportConfigBuilder, pacing: &PacingArgs) -> ExportConfigBuilder {
    builder.pacing(pacing.pace_every, Duration::from_millis(pacing.pace_pause_ms))
}

fn print_summary(summary: &RunSummary) {
    if summary.has_failures() {
        eprintln!(
            "Warning: {} of {} countries failed: {}",
            summary.failures.len(),
            summary.countries_attempted,
            summary.failed_countries().join(", ")
        );
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    // Single-threaded runtime: fetches run one at a time
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: Failed to create Tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(async_main(args)) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn async_main(args: Args) -> Result<()> {
    let builder = base_config(&args);

    match &args.command {
        Command::Continents {
            mapping,
            source,
            input,
            output,
            pacing,
        } => {
            let config = with_pacing(with_output(builder, output), pacing)
                .mapping(mapping.clone())
                .input_dir(input.clone())
                .build()?;
            let kind = match source {
                SourceArg::Ripestat => SourceKind::RipeStat,
                SourceArg::Local => SourceKind::Local,
            };
            let source = prefix_export::open_source(kind, &config)?;
            let summary = prefix_export::run_continents(&config, source.as_ref())
                .await
                .context("continent export failed")?;
            print_summary(&summary);
        }
        Command::Countries {
            codes,
            output,
            pacing,
        } => {
            let config = with_pacing(with_output(builder, output), pacing).build()?;
            let source = prefix_export::open_source(SourceKind::RipeStat, &config)?;
            let summary = prefix_export::run_countries(&config, codes, source.as_ref())
                .await
                .context("country export failed")?;
            print_summary(&summary);
        }
        Command::Announced {
            code,
            output,
            pacing,
        } => {
            let config = with_pacing(builder.output_dir(output.clone()), pacing).build()?;
            let summary = prefix_export::run_announced(&config, code)
                .await
                .with_context(|| format!("announced-prefix report for {} failed", code))?;
            if !summary.failures.is_empty() {
                eprintln!(
                    "Warning: {} of {} ASNs failed",
                    summary.failures.len(),
                    summary.report.count_asns
                );
            }
        }
    }

    Ok(())
}
