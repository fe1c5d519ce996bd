// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Stage Registry
//!
//! A static, validated catalog of [`StageSpec`]s (§4.5, C5): ordered by
//! index, queryable by name, filterable by workflow.

use regex::Regex;

use crate::entities::StageSpec;
use crate::error::PipelineError;
use crate::value_objects::Workflow;

/// `name` (§3 StageSpec): lowercase snake-case, e.g. `whisperx_asr`.
/// Compiled per call rather than held in a static, since this runs once at
/// startup and is not worth the extra `once_cell`/`lazy_static` machinery.
fn stage_name_pattern() -> Regex {
    Regex::new(r"^[a-z][a-z0-9_]*$").expect("stage name pattern is a valid regex")
}

/// An ordered, validated catalog of stages.
///
/// Construction validates the registry-level invariants that no two stages
/// share an index and that every stage name is lowercase snake-case (§3,
/// §4.5 Edge case); everything else (workflow filtering, ordering) is a
/// read-only query over the validated list.
#[derive(Debug, Clone)]
pub struct StageRegistry {
    stages: Vec<StageSpec>,
}

impl StageRegistry {
    /// Builds the registry from the built-in thirteen-stage catalog
    /// (§4.6): demux through mux.
    pub fn standard() -> Result<Self, PipelineError> {
        Self::new(crate::services::stage_catalog::standard_stages())
    }

    /// Validates and wraps a list of stage specs. Stages need not already be
    /// sorted by index; this sorts them.
    pub fn new(mut stages: Vec<StageSpec>) -> Result<Self, PipelineError> {
        stages.sort_by_key(|s| s.index);

        let name_pattern = stage_name_pattern();
        for stage in &stages {
            if !name_pattern.is_match(&stage.name) {
                return Err(PipelineError::stage_registry_error(format!(
                    "stage name '{}' is not lowercase snake-case",
                    stage.name
                )));
            }
        }

        for pair in stages.windows(2) {
            if pair[0].index == pair[1].index {
                return Err(PipelineError::stage_registry_error(format!(
                    "duplicate stage index {} shared by '{}' and '{}'",
                    pair[0].index, pair[0].name, pair[1].name
                )));
            }
        }

        Ok(Self { stages })
    }

    /// All stages, in stable index order.
    pub fn ordered_stages(&self) -> &[StageSpec] {
        &self.stages
    }

    /// Stages whose `required_for_workflow` entry for `kind` is not
    /// `Excluded`, in index order.
    pub fn for_workflow(&self, kind: Workflow) -> Vec<&StageSpec> {
        self.stages
            .iter()
            .filter(|s| {
                !matches!(
                    s.requirement_for(kind),
                    crate::entities::stage_spec::WorkflowRequirement::Excluded
                )
            })
            .collect()
    }

    /// Looks up a stage by name.
    pub fn by_name(&self, name: &str) -> Result<&StageSpec, PipelineError> {
        self.stages
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| PipelineError::stage_registry_error(format!("no such stage '{name}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::stage_spec::WorkflowRequirement;
    use crate::value_objects::{StageIndex, StageKind};

    fn stage(index: u32, name: &str) -> StageSpec {
        StageSpec {
            index: StageIndex::new(index),
            name: name.into(),
            kind: StageKind::NativeSubprocess,
            declared_inputs: vec![],
            declared_outputs: vec![],
            required_for_workflow: vec![(Workflow::Subtitle, WorkflowRequirement::Required)],
            optional: false,
            timeout_seconds: 0,
            version: "v1".into(),
            environment_keys: vec![],
        }
    }

    #[test]
    fn rejects_duplicate_indices() {
        let err = StageRegistry::new(vec![stage(1, "demux"), stage(1, "mux")]).unwrap_err();
        assert_eq!(err.category(), "stage_registry");
    }

    #[test]
    fn rejects_non_snake_case_names() {
        for bad in ["Demux", "demux-stage", "1demux", "demux stage"] {
            let err = StageRegistry::new(vec![stage(1, bad)]).unwrap_err();
            assert_eq!(err.category(), "stage_registry");
        }
    }

    #[test]
    fn orders_by_index_regardless_of_input_order() {
        let reg = StageRegistry::new(vec![stage(2, "mux"), stage(1, "demux")]).unwrap();
        let names: Vec<_> = reg.ordered_stages().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["demux", "mux"]);
    }

    #[test]
    fn by_name_reports_missing_stage() {
        let reg = StageRegistry::new(vec![stage(1, "demux")]).unwrap();
        assert!(reg.by_name("asr").is_err());
        assert!(reg.by_name("demux").is_ok());
    }
}
