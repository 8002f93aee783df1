//! Hoist CLI
//!
//! Command-line client for a Jenkins-compatible build-automation server.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hoist")]
#[command(about = "Trigger, track and tail builds on a remote build server", long_about = None)]
struct Cli {
    /// Build server base URL
    #[arg(
        long,
        env = "HOIST_SERVER_URL",
        default_value = "http://localhost:8080"
    )]
    server_url: String,

    /// API username
    #[arg(long, env = "HOIST_USER")]
    user: Option<String>,

    /// API token or password
    #[arg(long, env = "HOIST_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hoist=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        server_url: cli.server_url,
        user: cli.user,
        token: cli.token,
    };

    handle_command(cli.command, &config).await
}
