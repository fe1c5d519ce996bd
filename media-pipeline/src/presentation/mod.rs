// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Presentation Layer
//!
//! Formats the structured data the application layer returns into the
//! human-readable output `main.rs` prints to stdout. Nothing here decides
//! process exit codes; that's `media_pipeline_bootstrap::exit_code`'s job.

use media_pipeline_domain::entities::{JobReport, StageExecutionKind};

use crate::infrastructure::StageStatus;

/// Renders a `run` command's final report as a short human-readable summary,
/// one line per stage plus an overall verdict.
pub fn format_report(report: &JobReport) -> String {
    let mut out = format!(
        "job {}: {}{} ({} stages, {} skipped, {} re-executed, {:.1}s)\n",
        report.job_id,
        report.overall,
        if report.cancelled { " (cancelled)" } else { "" },
        report.stages.len(),
        report.skipped_count,
        report.re_executed_count,
        report.total_wall_time_seconds
    );

    for stage in &report.stages {
        let kind = match stage.execution_kind {
            StageExecutionKind::Executed => "executed",
            StageExecutionKind::Cached => "cached",
            StageExecutionKind::FailedOptional => "failed (optional)",
            StageExecutionKind::SkippedMissingUpstream => "skipped (missing upstream)",
        };
        let exit = stage
            .exit_code
            .map(|code| code.to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "  {:02} {:<28} {:<28} exit={}\n",
            stage.stage_index, stage.stage_name, kind, exit
        ));
    }

    out
}

/// Renders a `status` command's per-stage classification as a small table
/// (stage name, classification, last exit code, last duration), per §6.6.
pub fn format_status_table(statuses: &[StageStatus]) -> String {
    let mut out = String::from("stage                         status                      exit    duration(s)\n");

    for status in statuses {
        let exit = status
            .last_exit_code
            .map(|code| code.to_string())
            .unwrap_or_else(|| "-".to_string());
        let duration = status
            .last_duration_seconds
            .map(|d| format!("{d:.1}"))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:02} {:<27} {:<27} {:<7} {}\n",
            status.stage_index, status.stage_name, status.status, exit, duration
        ));
    }

    out
}
