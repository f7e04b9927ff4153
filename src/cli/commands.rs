// Command-line arguments and subcommands

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{load_config, Config};

/// Human-in-the-loop test case generation service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to ~/.testgen/config.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Address to listen on, e.g. 0.0.0.0:8000
        #[arg(long)]
        bind: Option<String>,
    },
    /// Load and validate the configuration, then print a summary
    CheckConfig,
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind_address = bind;
                config.validate()?;
            }
            crate::server::serve(config).await
        }
        Command::CheckConfig => {
            print_summary(&config);
            Ok(())
        }
    }
}

fn print_summary(config: &Config) {
    println!("✓ Configuration is valid");
    println!("  bind address:   {}", config.server.bind_address);
    println!("  cors origins:   {}", config.server.cors_origins.join(", "));
    println!("  provider:       {}", config.provider.kind);
    println!("  model:          {}", config.provider.effective_model());
    println!(
        "  api key:        {}",
        if config.provider.has_api_key() {
            "configured"
        } else {
            "missing (generation endpoints will answer 503)"
        }
    );
    println!("  iteration cap:  {}", config.refinement.iteration_cap);
    println!("  call timeout:   {}s", config.refinement.call_timeout_secs);
}
