// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Job Report
//!
//! The end-of-run summary written once to `job_dir/report.json` (§3,
//! §4.10, C10): overall status, per-stage summary, total wall time, and
//! skip/re-execution counts.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The job's terminal outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Success,
    PartialSuccess,
    Failed,
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::PartialSuccess => "partial_success",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// How a stage was handled during this particular run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageExecutionKind {
    /// Actually invoked via the Stage Runner this run.
    Executed,
    /// Classified `Done` and skipped.
    Cached,
    /// An optional stage that failed; downstream stages that do not depend
    /// on it may still run.
    FailedOptional,
    /// Not runnable this pass because a declared input was never produced
    /// by an upstream optional stage (§9).
    SkippedMissingUpstream,
}

/// One stage's entry in the final report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobReportStage {
    pub stage_name: String,
    pub stage_index: u32,
    pub execution_kind: StageExecutionKind,
    pub exit_code: Option<i32>,
    pub duration_seconds: Option<f64>,
    pub output_artifact_paths: Vec<PathBuf>,
    pub containment_violation: bool,
    pub log_path: PathBuf,
}

/// The consolidated end-of-run summary (§3, §6.1 `report.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobReport {
    pub job_id: String,
    pub overall: OverallStatus,
    pub stages: Vec<JobReportStage>,
    pub total_wall_time_seconds: f64,
    pub skipped_count: u32,
    pub re_executed_count: u32,
    /// Whether the run ended because the orchestrator observed a
    /// termination signal (§5, §7 item 5), as opposed to a stage simply
    /// exiting non-zero. `run`'s exit-code mapping (§6.6) consults this
    /// rather than inferring cancellation from `overall` alone, since a
    /// cancelled run and an ordinary critical failure both report
    /// `overall: failed`.
    pub cancelled: bool,
    pub generated_at: DateTime<Utc>,
}

impl JobReport {
    /// Derives the summary counters from the per-stage entries, so callers
    /// only need to assemble `stages` and let this compute the rest.
    pub fn from_stages(
        job_id: impl Into<String>,
        stages: Vec<JobReportStage>,
        overall: OverallStatus,
        total_wall_time_seconds: f64,
        cancelled: bool,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let skipped_count = stages
            .iter()
            .filter(|s| matches!(s.execution_kind, StageExecutionKind::Cached))
            .count() as u32;
        let re_executed_count = stages
            .iter()
            .filter(|s| matches!(s.execution_kind, StageExecutionKind::Executed))
            .count() as u32;

        Self {
            job_id: job_id.into(),
            overall,
            stages,
            total_wall_time_seconds,
            skipped_count,
            re_executed_count,
            cancelled,
            generated_at,
        }
    }
}
