// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # JobReportWriter (C10)
//!
//! Writes `job_dir/report.json` exactly once at the end of a run
//! (§4.10, §6.1). Rather than scanning all stage directories itself,
//! this writer accepts the already-assembled [`JobReport`] the
//! [`crate::infrastructure::runtime::orchestrator::PipelineOrchestrator`]
//! built up while it ran each stage: the orchestrator already holds every
//! manifest it just loaded or wrote, so re-scanning the filesystem a second
//! time would only reproduce state already in memory. A fresh re-scan is
//! still exactly what `status` does, via the same
//! [`media_pipeline_domain::ResumePlanner`] entry point the orchestrator
//! itself uses.

use std::path::Path;

use tempfile::NamedTempFile;

use media_pipeline_domain::{JobReport, PipelineError};

pub const REPORT_FILE_NAME: &str = "report.json";

/// Atomically persists the end-of-run [`JobReport`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JobReportWriter;

impl JobReportWriter {
    pub fn new() -> Self {
        Self
    }

    pub async fn write(&self, job_dir: &Path, report: &JobReport) -> Result<(), PipelineError> {
        let path = job_dir.join(REPORT_FILE_NAME);
        let json = serde_json::to_vec_pretty(report)?;
        let job_dir = job_dir.to_path_buf();

        tokio::task::spawn_blocking(move || -> Result<(), PipelineError> {
            let mut temp = NamedTempFile::new_in(&job_dir)
                .map_err(|err| PipelineError::IoError(format!("creating temp report in {}: {err}", job_dir.display())))?;
            std::io::Write::write_all(&mut temp, &json)
                .map_err(|err| PipelineError::IoError(format!("writing temp report: {err}")))?;
            temp.persist(&path)
                .map_err(|err| PipelineError::IoError(format!("persisting {}: {err}", path.display())))?;
            Ok(())
        })
        .await
        .map_err(|err| PipelineError::IoError(format!("report write task panicked: {err}")))??;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use media_pipeline_domain::entities::{JobReportStage, OverallStatus, StageExecutionKind};
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[tokio::test]
    async fn writes_a_readable_report() {
        let dir = tempdir().unwrap();
        let report = JobReport::from_stages(
            "20260727-01J5Z8X8K2Q3N4R5S6T7U8V9W0",
            vec![JobReportStage {
                stage_name: "demux".into(),
                stage_index: 1,
                execution_kind: StageExecutionKind::Executed,
                exit_code: Some(0),
                duration_seconds: Some(2.0),
                output_artifact_paths: vec![PathBuf::from("01_demux/audio.wav")],
                containment_violation: false,
                log_path: PathBuf::from("01_demux/stage.log"),
            }],
            OverallStatus::Success,
            2.0,
            false,
            Utc::now(),
        );

        let writer = JobReportWriter::new();
        writer.write(dir.path(), &report).await.unwrap();

        let bytes = tokio::fs::read(dir.path().join(REPORT_FILE_NAME)).await.unwrap();
        let loaded: JobReport = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(loaded.overall, OverallStatus::Success);
        assert_eq!(loaded.stages.len(), 1);
    }
}
