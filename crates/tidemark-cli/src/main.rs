//! Tidemark CLI - partition maintenance advisor.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tidemark_core::config::LogFormat;
use tidemark_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit codes for CLI operations.
///
/// Following Unix conventions:
/// - 0: Success
/// - 1-127: Application errors
#[repr(i32)]
#[derive(Debug, Clone, Copy)]
pub enum ExitCode {
    /// Successful execution
    Success = 0,
    /// Configuration error (invalid config file, threshold ordering)
    ConfigError = 1,
    /// Statistics source error (missing snapshot, unknown table)
    StatSourceError = 2,
    /// Planning error (alignment, predicate canonicalization)
    PlanningError = 3,
    /// General runtime error
    RuntimeError = 10,
}

impl ExitCode {
    /// Convert an error to an exit code by inspecting the error message.
    fn from_error(error: &anyhow::Error) -> Self {
        let error_str = error.to_string().to_lowercase();

        if error_str.contains("config") || error_str.contains("toml") {
            ExitCode::ConfigError
        } else if error_str.contains("statistics source")
            || error_str.contains("unknown table")
            || error_str.contains("snapshot")
        {
            ExitCode::StatSourceError
        } else if error_str.contains("aligned")
            || error_str.contains("predicate")
            || error_str.contains("planning")
        {
            ExitCode::PlanningError
        } else {
            ExitCode::RuntimeError
        }
    }
}

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "tidemark")]
#[command(about = "Storage-lifecycle maintenance advisor for partitioned tables", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan maintenance for one table from a statistics snapshot
    Plan {
        /// Table to plan for
        table: String,

        /// Path to the statistics snapshot (JSON)
        #[arg(long)]
        stats: PathBuf,

        /// Render directives as engine statements
        #[arg(long)]
        script: bool,

        /// Emit the report as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Rank tables as partitioning candidates
    Candidates {
        /// Path to the statistics snapshot (JSON)
        #[arg(long)]
        stats: PathBuf,

        /// Emit the ranking as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Audit one table for redundant and write-only indexes
    Audit {
        /// Table to audit
        table: String,

        /// Path to the statistics snapshot (JSON)
        #[arg(long)]
        stats: PathBuf,

        /// Emit findings as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() {
    let exit_code = run_cli().await;
    std::process::exit(exit_code as i32);
}

/// Main CLI execution logic with proper error handling.
async fn run_cli() -> ExitCode {
    let cli = Cli::parse();

    // Try to load config for log format settings (optional - falls back to JSON)
    let log_format = cli
        .config
        .as_ref()
        .and_then(|path| std::fs::read_to_string(path).ok())
        .and_then(|content| toml::from_str::<Config>(&content).ok())
        .map(|config| config.monitoring.log_format)
        .unwrap_or(LogFormat::Json);

    // Initialize logging
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match cli.verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Configure log format based on config
    match log_format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json())
                .with(filter)
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .init();
        }
    }

    let result = execute_command(cli).await;

    match result {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            // Log the error
            tracing::error!(error = %e, "Command failed");

            // Determine appropriate exit code
            ExitCode::from_error(&e)
        }
    }
}

/// Execute the CLI command.
async fn execute_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Plan {
            table,
            stats,
            script,
            json,
        } => {
            let config = load_config(&cli.config)?;
            commands::plan::run(config, &table, &stats, script, json).await?;
        }

        Commands::Candidates { stats, json } => {
            let config = load_config(&cli.config)?;
            commands::candidates::run(config, &stats, json).await?;
        }

        Commands::Audit { table, stats, json } => {
            let config = load_config(&cli.config)?;
            commands::audit::run(config, &table, &stats, json).await?;
        }

        Commands::Validate => {
            let config = load_config(&cli.config)?;
            config.validate()?;
            println!("Configuration is valid");
        }
    }

    Ok(())
}

/// Load configuration.
///
/// An explicitly given path must exist; without one, a missing
/// `tidemark.toml` falls back to built-in defaults.
fn load_config(path: &Option<PathBuf>) -> Result<Config> {
    let (path, required) = match path {
        Some(path) => (path.clone(), true),
        None => (PathBuf::from("tidemark.toml"), false),
    };

    if !required && !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(&path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}
