//! Quarry launcher
//!
//! Standalone commands for tag-based dataset discovery:
//! - `find`: resolve leaf datasets for a job against one or more tag stores
//! - `root`: show the common dataset root a job resolves to
//! - `tags`: show the whitelist and blacklist tags a job resolves to

use clap::{Parser, Subcommand};
use quarry_logging::{init_logging, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

mod cli;

#[derive(Parser, Debug)]
#[command(name = "quarry", about = "Tag-based dataset discovery", version)]
struct Cli {
    /// Enable verbose logging (info/debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Directory for log files (default: ~/.quarry/logs)
    #[arg(long, global = true, env = "QUARRY_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Find leaf datasets selected by a job's tags
    Find {
        /// Job properties file (TOML)
        #[arg(short, long)]
        job: PathBuf,

        /// Tag store file (TOML). Can be specified multiple times.
        #[arg(short, long = "store", required = true)]
        stores: Vec<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the common dataset root a job resolves to
    Root {
        /// Job properties file (TOML)
        #[arg(short, long)]
        job: PathBuf,
    },

    /// Show the whitelist and blacklist tags of a job
    Tags {
        /// Job properties file (TOML)
        #[arg(short, long)]
        job: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Find { job, stores, json } => {
            cli::find::run(cli::find::FindArgs { job, stores, json })
        }
        Commands::Root { job } => cli::root::run(cli::root::RootArgs { job }),
        Commands::Tags { job, json } => cli::tags::run(cli::tags::TagsArgs { job, json }),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match init_logging(LogConfig {
        app_name: "quarry",
        verbose: cli.verbose,
        log_dir: cli.log_dir.clone(),
    }) {
        Ok(path) => debug!(log_file = %path.display(), "Logging initialized"),
        Err(err) => eprintln!("Warning: failed to initialize logging: {:#}", err),
    }

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:?}", err);
            ExitCode::from(1)
        }
    }
}
