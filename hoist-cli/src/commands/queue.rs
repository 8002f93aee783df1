//! Queue command handlers
//!
//! Inspection and cancellation of transient build-queue items.

use anyhow::{Result, bail};
use chrono::DateTime;
use clap::Subcommand;
use colored::*;

use hoist_client::ServerClient;

use crate::config::Config;

/// Queue subcommands
#[derive(Subcommand)]
pub enum QueueCommands {
    /// Show a queue item
    Info {
        /// Queue item id (from `hoist job trigger`)
        id: u64,

        /// Print the raw JSON record
        #[arg(long)]
        json: bool,
    },
    /// Cancel a queued build
    Cancel {
        /// Queue item id
        id: u64,
    },
    /// Show the build a queue item was promoted to
    Build {
        /// Queue item id
        id: u64,
    },
}

/// Handle queue commands
pub async fn handle_queue_command(command: QueueCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        QueueCommands::Info { id, json } => queue_info(&client, id, json).await,
        QueueCommands::Cancel { id } => cancel_item(&client, id).await,
        QueueCommands::Build { id } => resolved_build(&client, id).await,
    }
}

/// Show a single queue item
async fn queue_info(client: &ServerClient, id: u64, json: bool) -> Result<()> {
    let Some(item) = client.queue_item(id).await? else {
        bail!("queue item {} not found", id);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&item)?);
        return Ok(());
    }

    println!("{}", "Queue Item:".bold());
    println!("  Id:       {}", item.id.to_string().cyan());
    if let Some(task) = &item.task {
        if let Some(name) = &task.name {
            println!("  Job:      {}", name);
        }
        if let Some(url) = &task.url {
            println!("  Job URL:  {}", url.dimmed());
        }
    }
    if let Some(since) = item
        .in_queue_since
        .and_then(DateTime::from_timestamp_millis)
    {
        println!("  Queued:   {}", since.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if let Some(why) = &item.why {
        println!("  Why:      {}", why.yellow());
    }
    if item.cancelled == Some(true) {
        println!("  {}", "This item was cancelled.".dimmed());
    }
    if let Some(executable) = &item.executable {
        println!(
            "  Build:    {} {}",
            format!("#{}", executable.number).green(),
            executable.url.dimmed()
        );
    }

    Ok(())
}

/// Cancel a queued build
async fn cancel_item(client: &ServerClient, id: u64) -> Result<()> {
    if client.cancel_queue_item(id).await? {
        println!("{} cancelled queue item {}", "✓".green(), id);
    } else {
        // Lost race: the build started before the cancel landed.
        println!(
            "{}",
            format!(
                "queue item {} already left the queue; check the build with `hoist build status`",
                id
            )
            .yellow()
        );
    }
    Ok(())
}

/// Show the build a queue item resolved to
async fn resolved_build(client: &ServerClient, id: u64) -> Result<()> {
    match client.resolved_build(id).await? {
        Some(executable) => {
            println!(
                "{} queue item {} became build {}",
                "▸".cyan(),
                id,
                format!("#{}", executable.number).green()
            );
            println!("  {}", executable.url.dimmed());
            Ok(())
        }
        None => {
            println!(
                "{}",
                format!("queue item {} has not started building yet", id).yellow()
            );
            Ok(())
        }
    }
}
