//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod build;
mod job;
mod queue;

pub use build::BuildCommands;
pub use job::JobCommands;
pub use queue::QueueCommands;

use anyhow::Result;
use clap::Subcommand;

use hoist_core::domain::reference::JobLocator;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Job discovery and lifecycle
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Build status, logs and control
    Build {
        #[command(subcommand)]
        command: BuildCommands,
    },
    /// Build queue inspection
    Queue {
        #[command(subcommand)]
        command: QueueCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Job { command } => job::handle_job_command(command, config).await,
        Commands::Build { command } => build::handle_build_command(command, config).await,
        Commands::Queue { command } => queue::handle_queue_command(command, config).await,
    }
}

/// Interpret a job argument as either a URL or a full job path
pub(crate) fn job_locator(job: &str) -> JobLocator {
    if job.starts_with("http://") || job.starts_with("https://") {
        JobLocator::Url(job.to_string())
    } else {
        JobLocator::Name(job.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_argument_forms() {
        assert_eq!(
            job_locator("area/demo"),
            JobLocator::Name("area/demo".to_string())
        );
        assert_eq!(
            job_locator("https://ci.example.com/job/demo/"),
            JobLocator::Url("https://ci.example.com/job/demo/".to_string())
        );
    }
}
