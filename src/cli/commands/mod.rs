//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific
//! modules.

mod analyze;
mod decide;
mod providers;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::AnalysisConfig;

#[derive(Parser)]
#[command(name = "heph")]
#[command(about = "Intent routing and provider selection for multimodal analysis backends")]
#[command(version)]
pub struct Cli {
    /// Config file path (defaults to heph.toml in the current directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a request and resolve its provider policy
    Decide {
        /// Chat message to classify
        message: Option<String>,

        /// Request mode: "chat" or "file"
        #[arg(short, long, default_value = "chat")]
        mode: String,

        /// Provider-side file handle attached to the request
        #[arg(long)]
        file_id: Option<String>,

        /// Declared MIME type (file mode)
        #[arg(long)]
        mime: Option<String>,

        /// Intent hint overriding the classifier
        #[arg(long)]
        intent: Option<String>,

        /// Explicitly requested provider
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// Run modality analysis on a file
    Analyze {
        /// Local file to analyze
        path: Option<PathBuf>,

        /// Provider-side file handle to analyze instead of a local file
        #[arg(long)]
        file_id: Option<String>,

        /// Record name (used for MIME sniffing when no type is declared)
        #[arg(short, long)]
        name: Option<String>,

        /// Declared MIME type
        #[arg(long)]
        mime: Option<String>,
    },

    /// Show provider availability derived from the loaded config
    Providers,
}

/// Parse arguments and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AnalysisConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Decide {
            message,
            mode,
            file_id,
            mime,
            intent,
            provider,
        } => decide::run(
            &config,
            decide::DecideArgs {
                message,
                mode,
                file_id,
                mime,
                intent,
                provider,
            },
        ),
        Commands::Analyze {
            path,
            file_id,
            name,
            mime,
        } => analyze::run(&config, path, file_id, name, mime).await,
        Commands::Providers => providers::run(&config),
    }
}
