//! Binary entry point for `support-triage`.
//!
//! This module provides the command-line interface for support-triage with
//! options for configuration file paths, logging verbosity and report format,
//! and subcommands to triage an inbox or work the stored ticket queue.

use clap::{Parser, Subcommand};
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use support_triage::base::{config::Config, types::Void};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

/// Support-triage: rank a support inbox and draft grounded replies.
///
/// Configuration can come from `config.toml` or `SUPPORT_TRIAGE_*` environment
/// variables.  Every message in the inbox is scored, matched against the
/// knowledge base and given a draft reply; reports go to stdout.
#[derive(Parser, Debug)]
#[command(version, author, about, long_about = None)]
struct Args {
    /// Override the config file path (optional).
    ///
    /// By default, the tool will look for a config file at `.hidden/config.toml`
    /// in the current directory.
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
    /// Increase log verbosity (-v, -vv, etc.).
    ///
    /// Use multiple times to increase verbosity:
    /// - No flag: INFO level
    /// - -v: DEBUG level
    /// - -vv or more: TRACE level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Triage an inbox and store the tickets.
    Triage {
        /// Inbox file: a JSON array of messages.
        inbox: std::path::PathBuf,
        /// Print the report as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// List stored tickets, highest priority first.
    List {
        /// Maximum number of tickets to show.
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
        /// Print the tickets as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Mark a stored ticket as replied so later runs skip its message.
    MarkReplied {
        /// The message id of the ticket.
        id: String,
    },
}

/// Main entry point for the support-triage binary.
///
/// Sets up logging based on verbosity, loads configuration, and runs the subcommand.
#[tokio::main]
async fn main() -> Void {
    let args = Args::parse();

    // Construct the level filter.

    let level = match args.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let level_filter = tracing_subscriber::filter::LevelFilter::from_level(level);

    // Prepare the log layer.  Logs go to stderr so the report owns stdout.

    let stderr = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_ansi(true)
        .with_level(true)
        .with_file(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

    // Prepare the otlp layer.

    let exporter = opentelemetry_otlp::SpanExporter::builder().with_http().with_protocol(Protocol::HttpBinary).build()?;
    let tracer = opentelemetry_sdk::trace::SdkTracerProvider::builder().with_simple_exporter(exporter).build().tracer("support-triage");
    let otel = tracing_opentelemetry::layer().with_tracer(tracer);

    tracing_subscriber::registry().with(otel).with(level_filter).with(stderr).init();

    let config = Config::load(args.config.as_deref())?;

    match args.command {
        Command::Triage { inbox, json } => support_triage::start(config, &inbox, json).await,
        Command::List { limit, json } => support_triage::list(config, limit, json).await,
        Command::MarkReplied { id } => support_triage::mark_replied(config, &id).await,
    }
}
