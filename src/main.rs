//! shiftwork - Main Entry Point
//!
//! Runs JSON-lines input through a pipeline of built-in stages described in a
//! TOML file.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "shiftwork",
    version,
    about = "Pull-based pipelines over JSON lines"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (error, warn, info, debug, trace); overrides the pipeline file
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a pipeline over JSON lines, printing one result per line
    Run {
        /// Path to pipeline TOML file
        pipeline: PathBuf,
        /// Read input from this file instead of stdin
        #[arg(long)]
        input: Option<PathBuf>,
        /// Stop after this many outputs
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Validate a pipeline file and list its stages
    Check {
        /// Path to pipeline TOML file
        pipeline: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let log_level = cli.log_level.as_deref();

    match cli.command {
        Commands::Run {
            pipeline,
            input,
            limit,
        } => commands::run::execute(&pipeline, input.as_deref(), limit, log_level),
        Commands::Check { pipeline } => commands::check::execute(&pipeline, log_level),
    }
}
