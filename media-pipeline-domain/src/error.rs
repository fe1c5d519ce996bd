// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Error
//!
//! A single, categorized error type for the whole orchestrator, following the
//! error taxonomy by *kind* rather than by source (descriptor errors, resume
//! classification errors, containment violations, timeouts, cancellation,
//! declared-output-missing, workflow constraint violations).

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used throughout the domain and infrastructure crates.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// The orchestrator's unified error type.
///
/// Variants are grouped by the taxonomy: descriptor errors abort before any
/// stage runs; resume classification errors are logged and treated as
/// "missing"; containment violations and declared-output-missing are fatal
/// for the stage that caused them; timeouts and cancellation carry their
/// conventional exit codes (124 and 130 respectively).
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    /// `descriptor.json` is missing, unreadable, or fails to parse.
    #[error("descriptor error: {0}")]
    InvalidDescriptor(String),

    /// A config key was rejected: either an unknown orchestrator-level key
    /// (`pipeline.*` / `stage.<name>.*`) or a value of the wrong type.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// `translate` workflow requested with a source language outside the
    /// supported (Indic) set. Surfaced at descriptor validation time.
    #[error("workflow constraint violation: {0}")]
    WorkflowConstraintViolation(String),

    /// The registry contains two stages sharing an index, or `by_name`
    /// was asked for a stage that does not exist.
    #[error("stage registry error: {0}")]
    StageRegistryError(String),

    /// `manifest.json` exists but failed to parse. Not fatal: callers must
    /// treat the stage as "missing" and continue.
    #[error("manifest parse failure at {path}: {reason}")]
    ManifestParseFailure { path: PathBuf, reason: String },

    /// A stage (or its I/O context) wrote outside its own stage directory.
    #[error("stage '{stage_name}' violated containment: wrote to {path}")]
    StageContainmentViolation { stage_name: String, path: PathBuf },

    /// A stage exited 0 but a declared output does not exist, or its digest
    /// no longer matches what the manifest records.
    #[error("stage '{stage_name}' did not produce declared output {path}")]
    DeclaredOutputMissing { stage_name: String, path: PathBuf },

    /// A stage exceeded its configured timeout and was killed.
    #[error("stage '{stage_name}' timed out after {timeout_seconds}s")]
    StageTimeout {
        stage_name: String,
        timeout_seconds: u64,
    },

    /// The orchestrator received a termination signal while a stage was
    /// in-flight and forwarded it.
    #[error("job cancelled by signal during stage '{stage_name}'")]
    Cancelled { stage_name: String },

    /// A stage's subprocess/container invocation failed to even start.
    #[error("failed to launch stage '{stage_name}': {reason}")]
    StageLaunchFailure { stage_name: String, reason: String },

    /// A required file could not be found.
    #[error("not found: {0}")]
    NotFound(PathBuf),

    /// Any other I/O failure (read, write, rename, create_dir).
    #[error("I/O error: {0}")]
    IoError(String),

    /// JSON (de)serialization failure for a manifest, descriptor, or report.
    #[error("serialization error: {0}")]
    SerializationError(String),
}

impl PipelineError {
    pub fn invalid_descriptor(msg: impl Into<String>) -> Self {
        Self::InvalidDescriptor(msg.into())
    }

    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub fn workflow_constraint_violation(msg: impl Into<String>) -> Self {
        Self::WorkflowConstraintViolation(msg.into())
    }

    pub fn stage_registry_error(msg: impl Into<String>) -> Self {
        Self::StageRegistryError(msg.into())
    }

    /// Returns a short, stable category tag, suitable for metrics labels or
    /// log fields, without allocating a full message.
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidDescriptor(_) => "descriptor",
            Self::InvalidConfiguration(_) => "configuration",
            Self::WorkflowConstraintViolation(_) => "workflow_constraint",
            Self::StageRegistryError(_) => "stage_registry",
            Self::ManifestParseFailure { .. } => "manifest_parse",
            Self::StageContainmentViolation { .. } => "containment",
            Self::DeclaredOutputMissing { .. } => "declared_output_missing",
            Self::StageTimeout { .. } => "timeout",
            Self::Cancelled { .. } => "cancelled",
            Self::StageLaunchFailure { .. } => "launch_failure",
            Self::NotFound(_) => "not_found",
            Self::IoError(_) => "io",
            Self::SerializationError(_) => "serialization",
        }
    }

    /// Errors the orchestrator logs and treats as non-fatal: the affected
    /// stage is simply classified "missing" and re-executed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ManifestParseFailure { .. })
    }

    /// Errors that abort the pipeline before or during stage execution,
    /// as opposed to errors that are locally handled (optional-stage
    /// failures never construct a `PipelineError` at all; they are
    /// represented as a non-zero exit code the orchestrator interprets).
    pub fn is_critical_for_pipeline(&self) -> bool {
        !self.is_recoverable()
    }

    /// The conventional process exit code this error implies, when it is
    /// the terminal reason a stage execution stopped. `None` means "let
    /// the subprocess's own exit code stand".
    pub fn conventional_exit_code(&self) -> Option<i32> {
        match self {
            Self::StageTimeout { .. } => Some(124),
            Self::Cancelled { .. } => Some(130),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(PathBuf::new())
        } else {
            Self::IoError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_is_stable_per_variant() {
        let err = PipelineError::invalid_descriptor("missing workflow");
        assert_eq!(err.category(), "descriptor");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn manifest_parse_failure_is_recoverable() {
        let err = PipelineError::ManifestParseFailure {
            path: PathBuf::from("01_demux/manifest.json"),
            reason: "unexpected eof".into(),
        };
        assert!(err.is_recoverable());
        assert!(!err.is_critical_for_pipeline());
    }

    #[test]
    fn conventional_exit_codes_match_spec() {
        let timeout = PipelineError::StageTimeout {
            stage_name: "asr".into(),
            timeout_seconds: 5,
        };
        assert_eq!(timeout.conventional_exit_code(), Some(124));

        let cancelled = PipelineError::Cancelled {
            stage_name: "asr".into(),
        };
        assert_eq!(cancelled.conventional_exit_code(), Some(130));

        let other = PipelineError::invalid_descriptor("x");
        assert_eq!(other.conventional_exit_code(), None);
    }
}
