//! Build command handlers
//!
//! Handles status queries, console logs (one-shot, download and follow)
//! and build control operations.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use colored::*;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use hoist_client::ServerClient;
use hoist_core::domain::build::{BuildOutcome, BuildState, BuildStatus};
use hoist_core::domain::console::TailSpec;
use hoist_core::domain::reference::BuildReference;

use crate::commands::job_locator;
use crate::config::Config;

/// How often the follow loop re-checks status with --until-done
const CONCLUSION_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Which build a command acts on
#[derive(Args, Clone)]
pub struct Target {
    /// Job name, full path ("folder/job") or job URL
    #[arg(long, conflicts_with = "url")]
    job: Option<String>,

    /// Direct build URL
    #[arg(long)]
    url: Option<String>,

    /// Build number
    #[arg(short, long, conflicts_with = "latest")]
    number: Option<u32>,

    /// Use the job's latest build
    #[arg(long)]
    latest: bool,
}

impl Target {
    fn reference(&self) -> Result<BuildReference> {
        if let Some(url) = &self.url {
            return Ok(BuildReference::Url(url.clone()));
        }
        let Some(job) = &self.job else {
            bail!("pass --job or --url to pick a build");
        };
        let locator = job_locator(job);
        match (self.number, self.latest) {
            (Some(number), _) => Ok(BuildReference::number(locator, number)),
            (None, true) => Ok(BuildReference::latest(locator)),
            (None, false) => bail!("pass --number or --latest to pick a build"),
        }
    }
}

/// Build subcommands
#[derive(Subcommand)]
pub enum BuildCommands {
    /// Show a build's normalized status
    Status {
        #[command(flatten)]
        target: Target,

        /// Print the status as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a build's raw record
    Info {
        #[command(flatten)]
        target: Target,

        /// Print the raw JSON record
        #[arg(long)]
        json: bool,
    },
    /// Abort a running build
    Abort {
        #[command(flatten)]
        target: Target,
    },
    /// Delete a build record
    Delete {
        #[command(flatten)]
        target: Target,
    },
    /// Print, save or follow a build's console logs
    Logs {
        #[command(flatten)]
        target: Target,

        /// Keep only the last N lines, or the last fraction when below 1
        #[arg(long)]
        tail: Option<TailSpec>,

        /// Write the logs to a file in this directory instead of printing
        #[arg(long, value_name = "DIR")]
        download_dir: Option<PathBuf>,

        /// Keep following as new lines appear (Ctrl-C stops)
        #[arg(short, long)]
        follow: bool,

        /// Stop following once the build concludes
        #[arg(long, requires = "follow")]
        until_done: bool,
    },
}

/// Handle build commands
pub async fn handle_build_command(command: BuildCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        BuildCommands::Status { target, json } => {
            show_status(&client, &target.reference()?, json).await
        }
        BuildCommands::Info { target, json } => show_info(&client, &target.reference()?, json).await,
        BuildCommands::Abort { target } => abort_build(&client, &target.reference()?).await,
        BuildCommands::Delete { target } => delete_build(&client, &target.reference()?).await,
        BuildCommands::Logs {
            target,
            tail,
            download_dir,
            follow,
            until_done,
        } => {
            let reference = target.reference()?;
            if let Some(dir) = download_dir {
                download_logs(&client, &reference, &dir).await
            } else if follow {
                follow_logs(&client, reference, until_done).await
            } else {
                print_logs(&client, &reference, tail).await
            }
        }
    }
}

/// Resolve and display normalized status
async fn show_status(client: &ServerClient, reference: &BuildReference, json: bool) -> Result<()> {
    let Some(status) = client.resolve(reference).await? else {
        bail!("no such job or build");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    print_status(&status);
    Ok(())
}

/// Display the raw build record
async fn show_info(client: &ServerClient, reference: &BuildReference, json: bool) -> Result<()> {
    let Some(raw) = client.build_info(reference).await? else {
        bail!("build not found (it may still be queued)");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&raw)?);
        return Ok(());
    }

    println!("{}", "Build Details:".bold());
    println!("  Number:   #{}", raw.number.to_string().cyan());
    println!("  URL:      {}", raw.url.dimmed());
    if let Some(name) = &raw.full_display_name {
        println!("  Name:     {}", name);
    }
    print_status(&BuildStatus::from_raw(&raw, chrono::Utc::now()));
    Ok(())
}

async fn abort_build(client: &ServerClient, reference: &BuildReference) -> Result<()> {
    match client.abort_build(reference).await? {
        Some(number) => {
            println!("{} aborted build #{}", "✓".green(), number);
            Ok(())
        }
        None => bail!("build not found (a queued build is cancelled via `hoist queue cancel`)"),
    }
}

async fn delete_build(client: &ServerClient, reference: &BuildReference) -> Result<()> {
    match client.delete_build(reference).await? {
        Some(number) => {
            println!("{} deleted build #{}", "✓".green(), number);
            Ok(())
        }
        None => bail!("build not found"),
    }
}

/// One-shot console fetch, optionally tailed
async fn print_logs(
    client: &ServerClient,
    reference: &BuildReference,
    tail: Option<TailSpec>,
) -> Result<()> {
    match client.fetch_console(reference, tail).await? {
        Some(text) => {
            println!("{}", text);
            Ok(())
        }
        None => bail!("build not found or console unavailable"),
    }
}

/// Stream the console to a local file
async fn download_logs(
    client: &ServerClient,
    reference: &BuildReference,
    dir: &std::path::Path,
) -> Result<()> {
    match client.download_console(reference, dir).await? {
        Some(path) => {
            println!("{} logs written to {}", "✓".green(), path.display());
            Ok(())
        }
        None => bail!("build not found or console empty"),
    }
}

/// Follow the console until Ctrl-C (or conclusion with --until-done)
///
/// The follower runs as its own task feeding line batches through a
/// channel; this side prints them and races the channel against Ctrl-C and
/// an optional status poll. Cancellation drains lines already emitted
/// before the loop ends.
async fn follow_logs(
    client: &ServerClient,
    reference: BuildReference,
    until_done: bool,
) -> Result<()> {
    let (batch_tx, mut batch_rx) = mpsc::channel::<Vec<String>>(16);
    let cancel = CancellationToken::new();

    let follower = {
        let client = client.clone();
        let reference = reference.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { client.follow_console(&reference, batch_tx, cancel).await })
    };

    let mut status_poll = tokio::time::interval(CONCLUSION_POLL_INTERVAL);

    loop {
        tokio::select! {
            batch = batch_rx.recv() => match batch {
                Some(lines) => {
                    for line in lines {
                        println!("{}", line);
                    }
                }
                // Follower stopped (cancelled or failed); buffered batches
                // were drained before recv returned None.
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                eprintln!("{}", "stopping ...".dimmed());
                cancel.cancel();
            }
            _ = status_poll.tick(), if until_done && !cancel.is_cancelled() => {
                if let Ok(Some(status)) = client.resolve(&reference).await {
                    if status.state == BuildState::Concluded {
                        eprintln!(
                            "{}",
                            format!("build concluded: {}", status.display_text()).dimmed()
                        );
                        // One more poll interval so the tail catches the
                        // final lines, then stop.
                        tokio::time::sleep(Duration::from_secs(2)).await;
                        cancel.cancel();
                    }
                }
            }
        }
    }

    match follower.await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(error)) => Err(error.into()),
        Err(join_error) => bail!("follow task failed: {}", join_error),
    }
}

/// Print the normalized status block
fn print_status(status: &BuildStatus) {
    println!("  State:    {}", colorize_status(status));

    if let Some(started) = status.started_at {
        println!("  Started:  {}", started.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if let Some(secs) = status.elapsed_secs() {
        let label = match status.state {
            BuildState::Concluded => "Duration:",
            _ => "Elapsed: ",
        };
        println!("  {} {:.3}s", label, secs);
    }
    if let Some(node) = &status.built_on {
        println!("  Node:     {}", node);
    }
    if let Some(url) = &status.url {
        println!("  URL:      {}", url.dimmed());
    }
}

/// Colorize a status for display
fn colorize_status(status: &BuildStatus) -> colored::ColoredString {
    let text = status.display_text();
    match (&status.state, &status.result) {
        (BuildState::NotRun, _) => text.dimmed(),
        (BuildState::Queued, _) => text.yellow(),
        (BuildState::Running, _) => text.cyan(),
        (BuildState::Concluded, Some(BuildOutcome::Success)) => text.green(),
        (BuildState::Concluded, Some(BuildOutcome::Unstable)) => text.yellow(),
        (BuildState::Concluded, Some(BuildOutcome::Failure)) => text.red(),
        (BuildState::Concluded, Some(BuildOutcome::Aborted)) => text.dimmed(),
        (BuildState::Concluded, _) => text.normal(),
    }
}
