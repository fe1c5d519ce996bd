// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Raw CLI structure (§6.6): the two commands the orchestrator exposes.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Media-to-subtitles pipeline orchestrator.
#[derive(Debug, Parser)]
#[command(name = "media-pipeline", version, about = "Media-to-subtitles pipeline orchestrator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Executes the pipeline for a prepared job directory.
    Run {
        /// Path to the job directory containing `descriptor.json`.
        #[arg(long)]
        job: PathBuf,
    },
    /// Prints each stage's resume classification without executing anything.
    Status {
        /// Path to the job directory containing `descriptor.json`.
        #[arg(long)]
        job: PathBuf,
    },
}

/// Parses raw CLI arguments with clap. `--help`/`--version` are handled by
/// clap and exit the process before this returns.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_with_job_flag() {
        let cli = Cli::parse_from(["media-pipeline", "run", "--job", "/jobs/1"]);
        match cli.command {
            Commands::Run { job } => assert_eq!(job, PathBuf::from("/jobs/1")),
            Commands::Status { .. } => panic!("expected Run"),
        }
    }

    #[test]
    fn parses_status_with_job_flag() {
        let cli = Cli::parse_from(["media-pipeline", "status", "--job", "/jobs/1"]);
        match cli.command {
            Commands::Status { job } => assert_eq!(job, PathBuf::from("/jobs/1")),
            Commands::Run { .. } => panic!("expected Status"),
        }
    }

    #[test]
    fn rejects_unknown_subcommand() {
        let result = Cli::try_parse_from(["media-pipeline", "bogus", "--job", "/jobs/1"]);
        assert!(result.is_err());
    }

    #[test]
    fn requires_job_flag() {
        let result = Cli::try_parse_from(["media-pipeline", "run"]);
        assert!(result.is_err());
    }
}
