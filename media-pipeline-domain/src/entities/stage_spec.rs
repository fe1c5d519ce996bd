// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Stage Spec
//!
//! A single row of the Stage Registry (§3, §4.5): name, index, kind,
//! declared inputs/outputs, workflow requirements, timeout, and version.

use serde::{Deserialize, Serialize};

use crate::value_objects::{StageIndex, StageKind, Workflow};

/// Whether a stage is mandatory, optional, or excluded for a given workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowRequirement {
    Required,
    Optional,
    Excluded,
}

/// A declared input or output path template, relative to `job_dir`, with an
/// optional placeholder for a prior stage's directory (e.g.
/// `01_demux/audio.wav`).
pub type PathTemplate = String;

/// One entry in the Stage Registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSpec {
    pub index: StageIndex,
    pub name: String,
    pub kind: StageKind,
    pub declared_inputs: Vec<PathTemplate>,
    pub declared_outputs: Vec<PathTemplate>,
    pub required_for_workflow: Vec<(Workflow, WorkflowRequirement)>,
    /// True means stage failure does not abort the pipeline. Derived from
    /// `required_for_workflow` for the workflow in play, but also carried
    /// as a registry-level default so `stage.<name>.enabled` overrides have
    /// something sensible to flip.
    pub optional: bool,
    /// 0 means no timeout.
    pub timeout_seconds: u64,
    /// Opaque string bumped when the stage's semantics change, invalidating
    /// any cached fingerprint.
    pub version: String,
    /// Config keys whose values are captured into the manifest's
    /// `environment` map and folded into the stage's fingerprint
    /// (§4.8, §4.11).
    pub environment_keys: Vec<String>,
}

impl StageSpec {
    /// The requirement this stage has for a specific workflow; stages not
    /// mentioned for a workflow are implicitly `Excluded`.
    pub fn requirement_for(&self, workflow: Workflow) -> WorkflowRequirement {
        self.required_for_workflow
            .iter()
            .find(|(w, _)| *w == workflow)
            .map(|(_, req)| *req)
            .unwrap_or(WorkflowRequirement::Excluded)
    }

    /// This stage's subdirectory name under `job_dir`, e.g. `07_asr`.
    pub fn dir_name(&self) -> String {
        format!("{}_{}", self.index.dir_prefix(), self.name)
    }
}
