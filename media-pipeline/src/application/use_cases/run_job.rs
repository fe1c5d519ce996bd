// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Run Job Use Case
//!
//! Loads a job's descriptor, drives it through the [`PipelineOrchestrator`]
//! to completion (or the first critical failure, or a termination signal),
//! and persists the resulting [`JobReport`] to `job_dir/report.json` per
//! §7's "always write `report.json`, even on failure". A critical stage
//! failure and a cancellation signal both come back as `Ok(JobReport)` (the
//! latter with `cancelled: true`), which this use case writes
//! unconditionally; only conditions the orchestrator cannot attribute to
//! any particular stage attempt (an unreadable manifest/descriptor, a
//! filesystem error reading a declared input) surface as `Err` with no
//! report written, mirroring how such errors already abort a stage body
//! outright rather than producing a partial result.

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use media_pipeline_domain::entities::JobReport;
use media_pipeline_domain::PipelineError;
use tracing::info;

use crate::infrastructure::{JobReportWriter, PipelineOrchestrator};

use super::descriptor_loader;

/// Runs a single job directory to completion.
///
/// ## Responsibilities
///
/// - Load and validate `descriptor.json`, layering in an optional
///   `CONFIG_FILE`'s overrides underneath the descriptor's own `config` map.
/// - Drive the orchestrator loop, observing the caller's cancellation flag.
/// - Write `report.json` regardless of whether the run succeeded, partially
///   succeeded, or failed outright.
pub struct RunJobUseCase {
    orchestrator: Arc<PipelineOrchestrator>,
    report_writer: Arc<JobReportWriter>,
    config_file: Option<PathBuf>,
}

impl RunJobUseCase {
    pub fn new(
        orchestrator: Arc<PipelineOrchestrator>,
        report_writer: Arc<JobReportWriter>,
        config_file: Option<PathBuf>,
    ) -> Self {
        Self {
            orchestrator,
            report_writer,
            config_file,
        }
    }

    /// Runs the job rooted at `job_dir`, honoring `cancel` for graceful
    /// shutdown (§7's cancellation propagation policy).
    pub async fn execute(&self, job_dir: &Path, cancel: &AtomicBool) -> Result<JobReport, PipelineError> {
        let descriptor = descriptor_loader::load(job_dir, self.config_file.as_deref()).await?;
        info!(job_id = %descriptor.job_id, workflow = %descriptor.workflow, "starting job run");

        let report = self.orchestrator.run(&descriptor, cancel).await;

        match report {
            Ok(report) => {
                self.report_writer.write(job_dir, &report).await?;
                info!(job_id = %descriptor.job_id, overall = %report.overall, "job run finished");
                Ok(report)
            }
            Err(err) => {
                info!(job_id = %descriptor.job_id, error = %err, "job run aborted before completion");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{CompositeStageRunner, JsonManifestStore, PipelineOrchestrator, Sha256ContentHasher};
    use tempfile::tempdir;

    const DESCRIPTOR: &str = r#"{
        "job_id": "20260727-01J5Z8X8K2Q3N4R5S6T7U8V9W0",
        "input_media": "/media/input.mp4",
        "workflow": "transcribe",
        "source_language": "hi",
        "target_language": null,
        "config": {},
        "created_at": "2026-07-27T00:00:00Z"
    }"#;

    fn use_case() -> RunJobUseCase {
        let orchestrator = PipelineOrchestrator::new(
            Arc::new(Sha256ContentHasher::new()),
            Arc::new(JsonManifestStore::new()),
            Arc::new(CompositeStageRunner::new()),
        )
        .unwrap();
        RunJobUseCase::new(Arc::new(orchestrator), Arc::new(JobReportWriter::new()), None)
    }

    #[tokio::test]
    async fn missing_descriptor_is_an_error_and_writes_no_report() {
        let dir = tempdir().unwrap();
        let err = use_case().execute(dir.path(), &AtomicBool::new(false)).await.unwrap_err();
        assert_eq!(err.category(), "not_found");
        assert!(!dir.path().join("report.json").exists());
    }

    #[tokio::test]
    async fn a_run_always_writes_report_json_even_on_critical_failure() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("descriptor.json"), DESCRIPTOR).unwrap();

        // `demux` is not on PATH in this test environment, so the run fails
        // critically at the first stage; report.json must still be written
        // per §7's "always write report.json, even on failure".
        let report = use_case().execute(dir.path(), &AtomicBool::new(false)).await.unwrap();
        assert!(dir.path().join("report.json").exists());
        assert_eq!(report.overall, media_pipeline_domain::entities::OverallStatus::Failed);
    }
}
