// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Show Status Use Case
//!
//! Reports what a subsequent `run` would do to each resolved stage, without
//! executing anything (§6.6: `status --job <job_dir>` always exits 0
//! unless the descriptor itself is missing or invalid).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use media_pipeline_domain::PipelineError;

use crate::infrastructure::{PipelineOrchestrator, StageStatus};

use super::descriptor_loader;

/// Classifies every resolved stage's resume status for a job directory.
pub struct ShowStatusUseCase {
    orchestrator: Arc<PipelineOrchestrator>,
    config_file: Option<PathBuf>,
}

impl ShowStatusUseCase {
    pub fn new(orchestrator: Arc<PipelineOrchestrator>, config_file: Option<PathBuf>) -> Self {
        Self {
            orchestrator,
            config_file,
        }
    }

    /// Loads and validates `descriptor.json`, then classifies each resolved
    /// stage via [`PipelineOrchestrator::status`].
    pub async fn execute(&self, job_dir: &Path) -> Result<Vec<StageStatus>, PipelineError> {
        let descriptor = descriptor_loader::load(job_dir, self.config_file.as_deref()).await?;
        self.orchestrator.status(&descriptor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{CompositeStageRunner, JsonManifestStore, PipelineOrchestrator, Sha256ContentHasher};
    use media_pipeline_domain::value_objects::ResumeStatus;
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

    fn use_case() -> ShowStatusUseCase {
        let orchestrator = PipelineOrchestrator::new(
            Arc::new(Sha256ContentHasher::new()),
            Arc::new(JsonManifestStore::new()),
            Arc::new(CompositeStageRunner::new()),
        )
        .unwrap();
        ShowStatusUseCase::new(Arc::new(orchestrator), None)
    }

    #[tokio::test]
    async fn missing_descriptor_is_an_error() {
        let dir = tempdir().unwrap();
        let err = use_case().execute(dir.path()).await.unwrap_err();
        assert_eq!(err.category(), "not_found");
    }

    #[tokio::test]
    async fn a_fresh_job_directory_classifies_every_resolved_stage_as_missing_or_downstream() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("descriptor.json"), DESCRIPTOR).unwrap();

        let statuses = use_case().execute(dir.path()).await.unwrap();
        let demux = statuses.iter().find(|s| s.stage_name == "demux").unwrap();
        assert_eq!(demux.status, ResumeStatus::Missing);
        assert!(!statuses.is_empty());
    }
}
