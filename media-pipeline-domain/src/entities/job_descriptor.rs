// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Job Descriptor
//!
//! The immutable per-job record (§3, §4.4, §6.3): input media path,
//! workflow kind, source/target languages, job directory, resolved config.
//!
//! ## Validation
//!
//! [`JobDescriptor::try_from_raw`] is the sole construction path from JSON and
//! performs every descriptor-time check §7 item 1 and item 7 require:
//! unknown workflow values are rejected, a missing `target_language`
//! is rejected when the workflow requires one, unrecognized orchestrator
//! config keys are rejected, and a `translate` workflow with a non-Indic
//! source language is rejected. Unknown language codes themselves are
//! tolerated (§4.4, an ML-layer concern).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::OrchestratorConfig;
use crate::error::PipelineError;
use crate::value_objects::{JobId, Language, Workflow};

/// The descriptor as it is read from and written to `descriptor.json`
/// (§6.3). Kept separate from [`JobDescriptor`] because the wire format uses
/// plain strings and a flat config map, while the domain type carries
/// validated value objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawJobDescriptor {
    pub job_id: String,
    pub input_media: PathBuf,
    pub workflow: String,
    pub source_language: String,
    pub target_language: Option<String>,
    #[serde(default)]
    pub config: HashMap<String, Value>,
    pub created_at: DateTime<Utc>,
}

/// Immutable per-job record. `job_dir` is not part of the JSON payload; it is
/// the directory the descriptor was loaded from, supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDescriptor {
    pub job_id: JobId,
    pub job_dir: PathBuf,
    pub input_media: PathBuf,
    pub workflow: Workflow,
    pub source_language: Language,
    pub target_language: Option<Language>,
    pub config: OrchestratorConfig,
    pub created_at: DateTime<Utc>,
}

impl JobDescriptor {
    /// Validates and constructs a descriptor from its wire representation.
    pub fn try_from_raw(raw: RawJobDescriptor, job_dir: impl Into<PathBuf>) -> Result<Self, PipelineError> {
        let job_id: JobId = raw.job_id.parse()?;
        let workflow: Workflow = raw.workflow.parse()?;
        let source_language: Language = raw.source_language.parse()?;
        let target_language = raw
            .target_language
            .map(|s| s.parse::<Language>())
            .transpose()?;

        if workflow.requires_target_language() {
            match &target_language {
                Some(lang) if !matches!(lang, Language::None) => {}
                _ => {
                    return Err(PipelineError::invalid_descriptor(format!(
                        "workflow '{workflow}' requires a target_language"
                    )))
                }
            }
        }

        // §7 item 7 / §9: translate workflow refuses non-Indic source
        // languages, checked here at descriptor-validation time so the job
        // fails fast without running any stage.
        if matches!(workflow, Workflow::Translate) && !matches!(source_language, Language::Auto) {
            if !source_language.is_indic() {
                return Err(PipelineError::workflow_constraint_violation(format!(
                    "translate workflow requires an Indic source language, got '{source_language}'"
                )));
            }
        }

        let config = OrchestratorConfig::from_flat_map(&raw.config)?;

        Ok(Self {
            job_id,
            job_dir: job_dir.into(),
            input_media: raw.input_media,
            workflow,
            source_language,
            target_language,
            config,
            created_at: raw.created_at,
        })
    }

    /// Converts back to the wire representation, e.g. to re-persist after an
    /// in-place edit is not supported (descriptors are immutable after
    /// creation) but is useful for round-trip tests.
    pub fn to_raw(&self) -> RawJobDescriptor {
        let mut config: HashMap<String, Value> = self.config.stage_private.clone();
        config.insert(
            "pipeline.stop_on_first_critical_failure".into(),
            Value::Bool(self.config.stop_on_first_critical_failure),
        );
        config.insert(
            "pipeline.cache_enabled".into(),
            Value::Bool(self.config.cache_enabled),
        );
        if let Some(timeout) = self.config.default_stage_timeout_seconds {
            config.insert(
                "pipeline.default_stage_timeout_seconds".into(),
                Value::from(timeout),
            );
        }
        for (stage_name, over) in &self.config.stage_overrides {
            if let Some(enabled) = over.enabled {
                config.insert(format!("stage.{stage_name}.enabled"), Value::Bool(enabled));
            }
            if let Some(timeout) = over.timeout_seconds {
                config.insert(
                    format!("stage.{stage_name}.timeout_seconds"),
                    Value::from(timeout),
                );
            }
        }

        RawJobDescriptor {
            job_id: self.job_id.to_string(),
            input_media: self.input_media.clone(),
            workflow: self.workflow.to_string(),
            source_language: self.source_language.to_string(),
            target_language: self.target_language.as_ref().map(|l| l.to_string()),
            config,
            created_at: self.created_at,
        }
    }

    /// The well-known location the descriptor is loaded from/stored to,
    /// relative to `job_dir` (§6.1).
    pub fn descriptor_path(job_dir: &Path) -> PathBuf {
        job_dir.join("descriptor.json")
    }
}
