//! # msgmap-cli
//!
//! Command-line interface for translating financial messages with msgmap
//! routes.
//!
//! Translated output goes to stdout (or a file); logs go to stderr.

mod commands;
mod settings;

use anyhow::Result;
use clap::{Parser, Subcommand};
use msgmap_codec::MessageFormat;
use settings::{Settings, DEFAULT_LOG_LEVEL};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "msgmap")]
#[command(about = "Declarative financial message translation")]
#[command(version)]
struct Cli {
    /// Path to a YAML settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding <routeId>.yaml route files
    #[arg(long, global = true)]
    routes_dir: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `msgmap_mapping=trace`
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate an inbound message to the route's canonical XML
    Translate {
        /// Input file path
        input: PathBuf,

        /// Output file path; stdout when omitted
        output: Option<PathBuf>,

        /// Route id
        #[arg(short, long)]
        route: String,
    },

    /// Translate a canonical XML reply back for the caller
    Reply {
        /// Input file path
        input: PathBuf,

        /// Output file path; stdout when omitted
        output: Option<PathBuf>,

        /// Route id
        #[arg(short, long)]
        route: String,

        /// Reply format (JSON, SOAP, XML, PROPRIETARY_XML); defaults to the
        /// route's inbound format
        #[arg(short, long)]
        format: Option<MessageFormat>,
    },

    /// Parse a message and print it normalized
    Parse {
        /// Input file path
        input: PathBuf,

        /// Message format
        #[arg(short, long)]
        format: MessageFormat,
    },

    /// Translate every file in a directory
    Batch {
        /// Directory of inbound messages
        input_dir: PathBuf,

        /// Directory receiving <name>.xml outputs
        output_dir: PathBuf,

        /// Route id
        #[arg(short, long)]
        route: String,
    },
}

fn init_logging(flag: Option<&str>, settings: &Settings) {
    let filter = match flag {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(settings.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL))
        }),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    init_logging(cli.log_level.as_deref(), &settings);

    let routes_dir = settings.routes_dir(cli.routes_dir);
    tracing::debug!("Using routes directory: {}", routes_dir.display());

    match cli.command {
        Commands::Translate { input, output, route } => {
            commands::translate(&routes_dir, &input, output.as_deref(), &route)
        }
        Commands::Reply {
            input,
            output,
            route,
            format,
        } => commands::reply(&routes_dir, &input, output.as_deref(), &route, format),
        Commands::Parse { input, format } => commands::parse(&input, format),
        Commands::Batch {
            input_dir,
            output_dir,
            route,
        } => commands::batch(&routes_dir, &input_dir, &output_dir, &route).await,
    }
}
