//! Prompter CLI - upload an image, get a ready-to-copy prompt for your image generator.
//!
//! Prompter sends the image together with a fixed prompt-engineering
//! instruction to a hosted vision model and prints the prompt it writes back.
//!
//! # Usage
//!
//! ```bash
//! # Guided mode (menu, hidden API key input, spinner)
//! prompter
//!
//! # One-shot
//! GEMINI_API_KEY=... prompter generate photo.jpg
//!
//! # View configuration
//! prompter config show
//! ```

use std::io::IsTerminal;

use clap::{CommandFactory, Parser, Subcommand};

mod cli;
mod logging;

/// Prompter - turn any photo into a detailed text-to-image prompt.
#[derive(Parser, Debug)]
#[command(name = "prompter")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a prompt from an image
    Generate(cli::generate::GenerateArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match prompter_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `prompter config path`."
            );
            prompter_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Prompter v{}", prompter_core::VERSION);

    match cli.command {
        Some(Commands::Generate(args)) => cli::generate::execute(args, config).await,
        Some(Commands::Config(args)) => cli::config::execute(args).await,
        None if std::io::stdin().is_terminal() && std::io::stderr().is_terminal() => {
            cli::interactive::run(&config).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
