// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Stage Runner
//!
//! Launches a stage body according to its [`crate::value_objects::StageKind`]
//! and returns an exit code (§4.8, C8). The runner does not interpret
//! the exit code; that is the Pipeline Orchestrator's job (§7).

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::PipelineError;
use crate::value_objects::StageKind;

/// Everything the runner needs to invoke one stage attempt.
#[derive(Debug, Clone)]
pub struct StageInvocation {
    pub kind: StageKind,
    /// The command to invoke for `native_subprocess`/`container` kinds, or
    /// the registered name looked up for `pure_function` (§4.8).
    pub command: String,
    pub args: Vec<String>,
    /// The environment subset captured per `StageSpec.environment_keys`
    /// (§4.8), plus the job-specific `PATH`/config path/`LOG_LEVEL`
    /// every invocation must receive.
    pub env: BTreeMap<String, String>,
    pub job_dir: PathBuf,
    pub stage_dir: PathBuf,
    /// `None` means no timeout (§3 `timeout_seconds == 0`).
    pub timeout: Option<Duration>,
    /// Grace period between a termination signal and an escalated kill
    /// signal (§4.8, §5).
    pub grace_period: Duration,
}

/// The result of one stage attempt, prior to the orchestrator's containment
/// and declared-output checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageRunnerOutcome {
    pub exit_code: i32,
    /// True if the stage was killed because it exceeded `timeout`
    /// (conventionally reported with `exit_code == 124`).
    pub timed_out: bool,
    /// True if the stage was killed because `cancel` was observed set
    /// (conventionally reported with `exit_code == 130`).
    pub cancelled: bool,
}

/// Invokes one stage attempt and waits for it to finish.
///
/// # Cancellation
///
/// `cancel` is polled by the implementation while the stage is in-flight; if
/// it becomes `true`, the runner forwards a termination signal to the
/// running subprocess/container, waits up to `invocation.grace_period`, then
/// escalates to a kill signal (§5).
#[async_trait]
pub trait StageRunner: Send + Sync {
    async fn execute(
        &self,
        invocation: &StageInvocation,
        cancel: &AtomicBool,
    ) -> Result<StageRunnerOutcome, PipelineError>;
}
