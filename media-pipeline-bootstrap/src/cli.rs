// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Command-Line Interface Module
//!
//! Bootstrap-layer CLI handling with security-first design (§6.6):
//!
//! ```text
//! 1. parser::parse_cli()        Parse CLI with clap
//! 2. validator::validate_cli()  Security validation (path canonicalization)
//! 3. ValidatedCli                Safe, validated config
//! ```

pub mod parser;
pub mod validator;

pub use parser::{parse_cli, Cli, Commands};
pub use validator::{ParseError, SecureArgParser};

use std::path::PathBuf;

/// Validated CLI configuration: all paths canonicalized and existence-checked.
#[derive(Debug, Clone)]
pub struct ValidatedCli {
    pub command: ValidatedCommand,
}

/// Validated command variants (§6.6).
#[derive(Debug, Clone)]
pub enum ValidatedCommand {
    /// `run --job <job_dir>`: executes the pipeline.
    Run { job_dir: PathBuf },
    /// `status --job <job_dir>`: prints resume classification only.
    Status { job_dir: PathBuf },
}

/// Parses and validates CLI arguments in one call.
pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    validate_cli(parser::parse_cli())
}

fn validate_cli(cli: Cli) -> Result<ValidatedCli, ParseError> {
    let command = match cli.command {
        Commands::Run { job } => ValidatedCommand::Run {
            job_dir: SecureArgParser::validate_existing_dir("job", &job)?,
        },
        Commands::Status { job } => ValidatedCommand::Status {
            job_dir: SecureArgParser::validate_existing_dir("job", &job)?,
        },
    };

    Ok(ValidatedCli { command })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn validates_an_existing_job_dir_for_run() {
        let dir = tempdir().unwrap();
        let cli = Cli {
            command: Commands::Run { job: dir.path().to_path_buf() },
        };

        let validated = validate_cli(cli).unwrap();
        match validated.command {
            ValidatedCommand::Run { job_dir } => assert_eq!(job_dir, dir.path().canonicalize().unwrap()),
            ValidatedCommand::Status { .. } => panic!("expected Run"),
        }
    }

    #[test]
    fn rejects_a_nonexistent_job_dir_for_status() {
        let cli = Cli {
            command: Commands::Status {
                job: PathBuf::from("/nonexistent/path/xyz"),
            },
        };

        assert!(validate_cli(cli).is_err());
    }
}
