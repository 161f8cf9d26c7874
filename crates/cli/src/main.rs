//! SkyChat CLI: the main entry point.
//!
//! Commands:
//! - `prompt`  Render the prompt a chat command would produce
//! - `chat`    Render the prompt, ask the backend, and post the reply
//! - `config`  Show the effective configuration
//! - `doctor`  Check config, backend reachability, and a transcript

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "skychat",
    about = "SkyChat: context-assembling chat bot",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.skychat/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the prompt for a message against a transcript
    Prompt(commands::MessageArgs),

    /// Reply to a message against a transcript
    Chat {
        #[command(flatten)]
        args: commands::MessageArgs,

        /// Write the transcript back with the message and reply appended
        #[arg(long)]
        save: bool,
    },

    /// Print the effective configuration (secrets removed)
    Config,

    /// Diagnose configuration and backend health
    Doctor {
        /// Also check that this transcript loads
        #[arg(short, long)]
        transcript: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG wins, then LOG_LEVEL, then the verbosity flag.
    let fallback = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_from_env("LOG_LEVEL"))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Prompt(args) => commands::prompt::run(config_path, args).await?,
        Commands::Chat { args, save } => commands::chat::run(config_path, args, save).await?,
        Commands::Config => commands::config_cmd::run(config_path)?,
        Commands::Doctor { transcript } => {
            commands::doctor::run(config_path, transcript.as_deref()).await?
        }
    }

    Ok(())
}
