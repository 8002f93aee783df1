//! Job command handlers
//!
//! Handles triggering, searching and job-level passthrough operations.

use anyhow::{Result, bail};
use clap::Subcommand;
use colored::*;

use hoist_client::{SearchScope, ServerClient};

use crate::commands::job_locator;
use crate::config::Config;

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// Trigger a build of a job
    Trigger {
        /// Job name, full path ("folder/job") or URL
        job: String,

        /// Build parameter as KEY=VALUE, repeatable
        #[arg(short = 'p', long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
    },
    /// Search jobs by pattern
    Search {
        /// Case-insensitive regular expression
        pattern: String,

        /// Search only this folder's direct children
        #[arg(long)]
        folder: Option<String>,

        /// Tree depth for server-wide searches
        #[arg(long, default_value_t = 4)]
        depth: u32,

        /// Match bare job names instead of fully-qualified paths
        #[arg(long)]
        name_only: bool,

        /// Print raw JSON records
        #[arg(long)]
        json: bool,
    },
    /// Get job details
    Get {
        /// Job name, full path or URL
        job: String,

        /// Print the raw JSON record
        #[arg(long)]
        json: bool,
    },
    /// List a job's recorded builds
    Builds {
        /// Job name, full path or URL
        job: String,
    },
    /// Enable a disabled job
    Enable { job: String },
    /// Disable a job
    Disable { job: String },
    /// Delete a job
    Delete { job: String },
}

/// Handle job commands
pub async fn handle_job_command(command: JobCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        JobCommands::Trigger { job, params } => trigger_job(&client, &job, params).await,
        JobCommands::Search {
            pattern,
            folder,
            depth,
            name_only,
            json,
        } => search_jobs(&client, &pattern, folder, depth, name_only, json).await,
        JobCommands::Get { job, json } => get_job(&client, &job, json).await,
        JobCommands::Builds { job } => list_builds(&client, &job).await,
        JobCommands::Enable { job } => {
            client.enable_job(&job_locator(&job)).await?;
            println!("{} enabled {}", "✓".green(), job.bold());
            Ok(())
        }
        JobCommands::Disable { job } => {
            client.disable_job(&job_locator(&job)).await?;
            println!("{} disabled {}", "✓".green(), job.bold());
            Ok(())
        }
        JobCommands::Delete { job } => {
            client.delete_job(&job_locator(&job)).await?;
            println!("{} deleted {}", "✓".green(), job.bold());
            Ok(())
        }
    }
}

/// Trigger a build and print its queue ticket
async fn trigger_job(
    client: &ServerClient,
    job: &str,
    params: Vec<(String, String)>,
) -> Result<()> {
    let ticket = client.trigger(&job_locator(job), &params).await?;

    println!(
        "{} queued {} as queue item {}",
        "▸".cyan(),
        job.bold(),
        ticket.queue_id.to_string().cyan()
    );
    println!(
        "  {}",
        format!("track it with: hoist queue build {}", ticket.queue_id).dimmed()
    );

    Ok(())
}

/// Search jobs and print matches
async fn search_jobs(
    client: &ServerClient,
    pattern: &str,
    folder: Option<String>,
    depth: u32,
    name_only: bool,
    json: bool,
) -> Result<()> {
    let scope = match folder {
        Some(folder) => SearchScope::Folder(job_locator(&folder)),
        None => SearchScope::Server,
    };

    let (matches, urls) = client
        .search_jobs(pattern, &scope, depth, !name_only)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!("{}", "No jobs matched.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} job(s):", matches.len()).bold());
    println!();
    for (entry, url) in matches.iter().zip(urls.iter()) {
        println!("  {} {}", "▸".cyan(), entry.match_name(true));
        println!("    {}", url.dimmed());
    }

    Ok(())
}

/// Get and display a single job
async fn get_job(client: &ServerClient, job: &str, json: bool) -> Result<()> {
    let Some(info) = client.job_info(&job_locator(job)).await? else {
        bail!("job not found: {}", job);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", "Job Details:".bold());
    println!(
        "  Name:        {}",
        info.full_name.as_deref().unwrap_or(&info.name).cyan()
    );
    println!("  URL:         {}", info.url.dimmed());
    println!("  Last build:  #{}", info.last_build_number());
    if let Some(next) = info.next_build_number {
        println!("  Next build:  #{}", next);
    }
    if info.in_queue == Some(true) {
        println!("  Queue:       {}", "a build is waiting in the queue".yellow());
    }

    Ok(())
}

/// List a job's recorded builds
async fn list_builds(client: &ServerClient, job: &str) -> Result<()> {
    let (builds, _urls) = client.build_list(&job_locator(job)).await?;

    if builds.is_empty() {
        println!("{}", "No builds recorded.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} build(s):", builds.len()).bold());
    for build in builds {
        println!("  {} #{}  {}", "▸".cyan(), build.number, build.url.dimmed());
    }

    Ok(())
}

/// Parse a KEY=VALUE build parameter
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_parse_as_key_value() {
        assert_eq!(
            parse_key_val("TARGET=prod"),
            Ok(("TARGET".to_string(), "prod".to_string()))
        );
        assert_eq!(
            parse_key_val("EMPTY="),
            Ok(("EMPTY".to_string(), String::new()))
        );
        assert!(parse_key_val("=nokey").is_err());
        assert!(parse_key_val("novalue").is_err());
    }
}
