#![deny(unsafe_code)]
//! keystone CLI - host for the Keystone integrity and governance kernel
//!
//! Every invocation builds a fresh orchestrator from the configuration,
//! optionally records `--entry` payloads while the ledger is still open,
//! runs the eight-step initialization and then performs the subcommand.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
pub mod config;
mod error;
pub mod output;

pub use error::{CliError, CliResult};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "keystone")]
#[command(about = "Keystone - integrity and governance kernel", long_about = None)]
#[command(version)]
struct Cli {
    /// Kernel configuration file (TOML)
    #[arg(short, long, env = "KEYSTONE_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Output format (table, json, yaml)
    #[arg(short, long, default_value = "table", global = true)]
    output: OutputFormat,

    /// Ledger entry recorded before initialization seals the ledger (repeatable)
    #[arg(short, long = "entry", global = true)]
    entries: Vec<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the kernel and print the step report
    Init,

    /// Show system status after initialization
    Status,

    /// Run the comprehensive audit; exits 1 if any check fails
    Validate,

    /// Convert a percentage (0..=100) to a normalized value
    Convert {
        #[arg(allow_negative_numbers = true)]
        percentage: f64,
    },

    /// Execute an audited command
    Exec { command: String },

    /// Write the sealed ledger to a JSON file
    Export { path: PathBuf },

    /// Verify an exported ledger offline; exits 1 if it does not verify
    Verify { path: PathBuf },
}

pub fn run() -> CliResult<ExitCode> {
    run_with_args(std::env::args_os())
}

pub fn run_with_args<I, T>(args: I) -> CliResult<ExitCode>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    let filter = if cli.verbose { "debug" } else { "info" };
    // A subscriber may already be installed when embedded.
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init();

    let config = config::load(cli.config.as_deref())?;
    let session = commands::Session {
        config,
        entries: cli.entries,
        format: cli.output,
    };

    match cli.command {
        Commands::Init => commands::kernel::init(&session),
        Commands::Status => commands::kernel::status(&session),
        Commands::Validate => commands::kernel::validate(&session),
        Commands::Convert { percentage } => commands::kernel::convert(&session, percentage),
        Commands::Exec { command } => commands::kernel::exec(&session, &command),
        Commands::Export { path } => commands::ledger::export(&session, &path),
        Commands::Verify { path } => commands::ledger::verify(&session, &path),
    }
}
