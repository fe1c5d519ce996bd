// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # JsonManifestStore (C3)
//!
//! Loads and atomically stores `<stage_dir>/manifest.json` (§4.3,
//! §6.2). Atomicity is a temp file in the same directory followed by a
//! rename, so a manifest is never observed half-written by a concurrent
//! reader (e.g. the `status` command running against a job that is still
//! executing).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;

use media_pipeline_domain::entities::StageManifest;
use media_pipeline_domain::{ManifestRepository, PipelineError};

pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Filesystem-backed [`ManifestRepository`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonManifestStore;

impl JsonManifestStore {
    pub fn new() -> Self {
        Self
    }

    fn manifest_path(stage_dir: &Path) -> PathBuf {
        stage_dir.join(MANIFEST_FILE_NAME)
    }
}

#[async_trait]
impl ManifestRepository for JsonManifestStore {
    async fn load(&self, stage_dir: &Path) -> Result<Option<StageManifest>, PipelineError> {
        let path = Self::manifest_path(stage_dir);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(PipelineError::IoError(format!("reading {}: {err}", path.display()))),
        };

        serde_json::from_slice(&bytes).map(Some).map_err(|err| PipelineError::ManifestParseFailure {
            path,
            reason: err.to_string(),
        })
    }

    async fn store(&self, stage_dir: &Path, manifest: &StageManifest) -> Result<(), PipelineError> {
        tokio::fs::create_dir_all(stage_dir)
            .await
            .map_err(|err| PipelineError::IoError(format!("creating {}: {err}", stage_dir.display())))?;

        let path = Self::manifest_path(stage_dir);
        let json = serde_json::to_vec_pretty(manifest)?;
        let stage_dir = stage_dir.to_path_buf();

        tokio::task::spawn_blocking(move || -> Result<(), PipelineError> {
            let mut temp = NamedTempFile::new_in(&stage_dir)
                .map_err(|err| PipelineError::IoError(format!("creating temp manifest in {}: {err}", stage_dir.display())))?;
            std::io::Write::write_all(&mut temp, &json)
                .map_err(|err| PipelineError::IoError(format!("writing temp manifest: {err}")))?;
            temp.persist(&path)
                .map_err(|err| PipelineError::IoError(format!("persisting {}: {err}", path.display())))?;
            Ok(())
        })
        .await
        .map_err(|err| PipelineError::IoError(format!("manifest write task panicked: {err}")))??;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    fn sample_manifest() -> StageManifest {
        StageManifest {
            stage_name: "demux".into(),
            stage_index: 1,
            stage_version: "v1".into(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            duration_seconds: 1.5,
            exit_code: 0,
            fingerprint: None,
            inputs: vec![],
            outputs: vec![],
            environment: Default::default(),
            notes: vec![],
            containment_violation: false,
        }
    }

    #[tokio::test]
    async fn load_of_absent_manifest_is_none() {
        let dir = tempdir().unwrap();
        let store = JsonManifestStore::new();
        assert!(store.load(dir.path()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn store_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = JsonManifestStore::new();
        let manifest = sample_manifest();
        store.store(dir.path(), &manifest).await.unwrap();
        let loaded = store.load(dir.path()).await.unwrap().unwrap();
        assert_eq!(loaded.stage_name, manifest.stage_name);
        assert_eq!(loaded.exit_code, manifest.exit_code);
    }

    #[tokio::test]
    async fn corrupt_manifest_is_reported_as_parse_failure_not_missing() {
        let dir = tempdir().unwrap();
        tokio::fs::write(dir.path().join(MANIFEST_FILE_NAME), b"{ not json")
            .await
            .unwrap();
        let store = JsonManifestStore::new();
        let err = store.load(dir.path()).await.unwrap_err();
        assert!(matches!(err, PipelineError::ManifestParseFailure { .. }));
    }

    #[tokio::test]
    async fn store_creates_missing_stage_directory() {
        let dir = tempdir().unwrap();
        let stage_dir = dir.path().join("07_asr");
        let store = JsonManifestStore::new();
        store.store(&stage_dir, &sample_manifest()).await.unwrap();
        assert!(stage_dir.join(MANIFEST_FILE_NAME).exists());
    }
}
