// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Exit Codes
//!
//! Process exit codes the orchestrator returns from `main`. The CLI's actual
//! contract (§6.6, §7) is narrow: 0 success, 1 critical failure, 2
//! signal cancellation for `run`; `status` always exits 0 unless the
//! descriptor is missing. Bootstrap-phase failures (malformed
//! arguments, an unreadable job directory) happen before a job even starts
//! and deserve a more specific code than a bare `1`, in the `sysexits.h`
//! tradition the rest of this enum follows.

use std::fmt;

use media_pipeline_domain::PipelineError;

use crate::cli::ParseError;

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Job ran to completion with overall status `success` or
    /// `partial_success` and no critical failures.
    Success = 0,
    /// A critical stage failed, a declared output was missing, or a
    /// workflow constraint was violated.
    Failure = 1,
    /// The orchestrator was terminated by a signal.
    Cancelled = 2,
    /// Malformed CLI usage (`sysexits.h` EX_USAGE).
    UsageError = 64,
    /// The job directory or `descriptor.json` could not be found
    /// (`sysexits.h` EX_NOINPUT).
    NoInput = 66,
    /// `descriptor.json` failed to parse or validate, or the config was
    /// invalid (`sysexits.h` EX_CONFIG / EX_DATAERR boundary).
    Config = 78,
}

impl ExitCode {
    /// Classifies a top-level [`PipelineError`] into the exit code `main`
    /// should return, following §7's taxonomy.
    pub fn from_pipeline_error(err: &PipelineError) -> Self {
        match err {
            PipelineError::InvalidDescriptor(_)
            | PipelineError::InvalidConfiguration(_)
            | PipelineError::WorkflowConstraintViolation(_)
            | PipelineError::StageRegistryError(_) => Self::Config,
            PipelineError::NotFound(_) => Self::NoInput,
            PipelineError::Cancelled { .. } => Self::Cancelled,
            _ => Self::Failure,
        }
    }

    /// Classifies a CLI validation failure before any descriptor is read.
    pub fn from_parse_error(err: &ParseError) -> Self {
        match err {
            ParseError::PathNotFound(_) => Self::NoInput,
            ParseError::InvalidValue { .. } | ParseError::Io(_) => Self::UsageError,
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Cancelled => "cancelled",
            Self::UsageError => "usage error",
            Self::NoInput => "no input",
            Self::Config => "config error",
        };
        write!(f, "{s}")
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(i32::from(code) as u8)
    }
}
