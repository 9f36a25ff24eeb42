//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod check;
mod extract;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings, LoadOptions};

#[derive(Parser)]
#[command(name = "cardscan")]
#[command(about = "Contact and entity extraction from business cards and voice notes")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
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
    /// Start the HTTP server
    Serve {
        /// Address to bind: "port", "host" or "host:port"
        /// (defaults to SERVER_URL/SERVER_PORT or 127.0.0.1:5000)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Extract contact fields from text (a file, or stdin)
    Extract {
        /// Text file to read (reads stdin when omitted or "-")
        file: Option<PathBuf>,
    },

    /// Report which recognition services are usable
    Check,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let bind = match &cli.command {
        Commands::Serve { bind } => bind.clone(),
        _ => None,
    };
    let options = LoadOptions {
        config_path: cli.config,
        bind,
    };

    match cli.command {
        Commands::Extract { file } => extract::cmd_extract(file.as_deref()).await,
        Commands::Serve { .. } => {
            let settings = load_settings(options).await?;
            serve::cmd_serve(&settings).await
        }
        Commands::Check => {
            let settings = load_settings(options).await?;
            check::cmd_check(&settings)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_with_bind() {
        let cli =
            Cli::try_parse_from(["cardscan", "-v", "serve", "--bind", "0.0.0.0:8080"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Serve { bind } => assert_eq!(bind.as_deref(), Some("0.0.0.0:8080")),
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_extract_and_global_config() {
        let cli = Cli::try_parse_from(["cardscan", "extract", "card.txt", "--config", "c.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        match cli.command {
            Commands::Extract { file } => assert_eq!(file, Some(PathBuf::from("card.txt"))),
            _ => panic!("expected extract"),
        }
    }
}
