// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Shared `descriptor.json` loading for both use cases: read the raw JSON,
//! layer the optional `CONFIG_FILE` under the descriptor's own `config` map
//! (the descriptor always wins, §6.6), then validate.

use std::path::Path;

use media_pipeline_domain::entities::{JobDescriptor, RawJobDescriptor};
use media_pipeline_domain::PipelineError;

use crate::infrastructure::config::{load_config_overrides, merge_config_overrides};

/// Loads and validates the job descriptor at `job_dir/descriptor.json`,
/// merging in file-provided config overrides from `config_file` if given.
pub async fn load(job_dir: &Path, config_file: Option<&Path>) -> Result<JobDescriptor, PipelineError> {
    let descriptor_path = JobDescriptor::descriptor_path(job_dir);
    let raw_json = tokio::fs::read_to_string(&descriptor_path)
        .await
        .map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                PipelineError::NotFound(descriptor_path.clone())
            } else {
                PipelineError::invalid_descriptor(format!("failed to read '{}': {err}", descriptor_path.display()))
            }
        })?;

    let mut raw: RawJobDescriptor = serde_json::from_str(&raw_json)
        .map_err(|err| PipelineError::invalid_descriptor(format!("malformed descriptor.json: {err}")))?;

    if let Some(config_file) = config_file {
        let file_overrides = load_config_overrides(config_file)?;
        raw.config = merge_config_overrides(file_overrides, raw.config);
    }

    JobDescriptor::try_from_raw(raw, job_dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_descriptor(job_dir: &Path, body: &str) {
        std::fs::write(JobDescriptor::descriptor_path(job_dir), body).unwrap();
    }

    const VALID_DESCRIPTOR: &str = r#"{
        "job_id": "20260727-01J5Z8X8K2Q3N4R5S6T7U8V9W0",
        "input_media": "/media/input.mp4",
        "workflow": "transcribe",
        "source_language": "hi",
        "target_language": null,
        "config": {},
        "created_at": "2026-07-27T00:00:00Z"
    }"#;

    #[tokio::test]
    async fn missing_descriptor_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = load(dir.path(), None).await.unwrap_err();
        assert_eq!(err.category(), "not_found");
    }

    #[tokio::test]
    async fn malformed_json_is_an_invalid_descriptor_error() {
        let dir = tempdir().unwrap();
        write_descriptor(dir.path(), "{ not json");

        let err = load(dir.path(), None).await.unwrap_err();
        assert_eq!(err.category(), "descriptor");
    }

    #[tokio::test]
    async fn loads_a_valid_descriptor_with_no_config_file() {
        let dir = tempdir().unwrap();
        write_descriptor(dir.path(), VALID_DESCRIPTOR);

        let descriptor = load(dir.path(), None).await.unwrap();
        assert_eq!(descriptor.workflow, media_pipeline_domain::value_objects::Workflow::Transcribe);
    }

    #[tokio::test]
    async fn descriptor_config_wins_over_config_file_overrides() {
        let dir = tempdir().unwrap();
        write_descriptor(
            dir.path(),
            r#"{
                "job_id": "20260727-01J5Z8X8K2Q3N4R5S6T7U8V9W0",
                "input_media": "/media/input.mp4",
                "workflow": "transcribe",
                "source_language": "hi",
                "target_language": null,
                "config": {"pipeline.cache_enabled": false},
                "created_at": "2026-07-27T00:00:00Z"
            }"#,
        );

        let mut config_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(config_file, "[pipeline]\ncache_enabled = true").unwrap();

        let descriptor = load(dir.path(), Some(config_file.path())).await.unwrap();
        assert!(!descriptor.config.cache_enabled);
    }

    #[tokio::test]
    async fn config_file_supplies_overrides_the_descriptor_does_not() {
        let dir = tempdir().unwrap();
        write_descriptor(dir.path(), VALID_DESCRIPTOR);

        let mut config_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(config_file, "[pipeline]\ndefault_stage_timeout_seconds = 42").unwrap();

        let descriptor = load(dir.path(), Some(config_file.path())).await.unwrap();
        assert_eq!(descriptor.config.default_stage_timeout_seconds, Some(42));
    }
}
