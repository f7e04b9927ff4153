// testgen - requirements in, reviewed test cases out
// Main entry point

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use testgen::cli::{run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing (RUST_LOG overrides the default level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    run(cli).await
}
