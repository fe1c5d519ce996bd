// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Secure Argument Validation
//!
//! Security validation for CLI arguments: path canonicalization and
//! existence checks, and rejection of shell-metacharacter / path-traversal
//! patterns in string arguments. Separated from parsing so `clap`'s parse
//! errors (malformed flags) and this module's validation errors (unsafe or
//! nonexistent values) are never confused.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// A validation failure, distinct from a `clap` parse failure.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid value for --{arg}: {reason}")]
    InvalidValue { arg: String, reason: String },

    #[error("path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("I/O error resolving path: {0}")]
    Io(String),
}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Validates CLI-supplied strings and paths before they reach application
/// logic.
pub struct SecureArgParser;

impl SecureArgParser {
    /// Validates a path argument that is expected to already exist (the job
    /// directory, which an external "prepare" step must have created) and
    /// returns its canonical form.
    pub fn validate_existing_dir(arg_name: &str, path: &Path) -> Result<PathBuf, ParseError> {
        if !path.exists() {
            return Err(ParseError::PathNotFound(path.to_path_buf()));
        }
        let canonical = path.canonicalize()?;
        if !canonical.is_dir() {
            return Err(ParseError::InvalidValue {
                arg: arg_name.to_string(),
                reason: format!("{} is not a directory", canonical.display()),
            });
        }
        Ok(canonical)
    }

    /// Validates a free-form string argument contains no NUL bytes or
    /// control characters that could smuggle data into logs or subprocess
    /// environments.
    pub fn validate_argument(arg_name: &str, value: &str) -> Result<(), ParseError> {
        if value.chars().any(|c| c == '\0' || (c.is_control() && c != '\t')) {
            return Err(ParseError::InvalidValue {
                arg: arg_name.to_string(),
                reason: "contains control characters".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_nonexistent_job_dir() {
        let err = SecureArgParser::validate_existing_dir("job", Path::new("/nonexistent/path/xyz")).unwrap_err();
        assert!(matches!(err, ParseError::PathNotFound(_)));
    }

    #[test]
    fn rejects_control_characters() {
        assert!(SecureArgParser::validate_argument("job", "hello\0world").is_err());
        assert!(SecureArgParser::validate_argument("job", "hello world").is_ok());
    }
}
