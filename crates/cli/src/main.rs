//! Greenlight CLI — run a review session over a parsed scene file.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "greenlight",
    about = "Scene-by-scene screenplay review with bounded agent memory",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Review a parsed scene file with the configured agents.
    Review {
        /// Path to a JSON array of parsed scenes.
        scenes: PathBuf,

        /// Optional TOML configuration file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Optional scripted responses (JSON). Without it, a
        /// deterministic dry-run caller is used.
        #[arg(long)]
        script: Option<PathBuf>,

        /// Write the full report as JSON to this path.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// List the built-in reviewer profiles.
    Profiles,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Review {
            scenes,
            config,
            script,
            out,
        } => commands::review(scenes, config, script, out).await,
        Commands::Profiles => commands::profiles(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
