// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Workflow Resolver
//!
//! Produces the ordered list of stages a job must run, given its descriptor
//! and the registry (§4.6, C6): the decision table of which stages are
//! mandatory, optional, or excluded per workflow kind.
//!
//! Required stages always run. Excluded stages never run. Optional stages
//! run only when `stage.<name>.enabled` is set `true` in the job's config
//! (§6.5: "`stage.<name>.enabled` overrides StageSpec default for
//! optional stages"; §4.6: "optional means the stage runs if config enables
//! it").

use crate::config::OrchestratorConfig;
use crate::entities::stage_spec::WorkflowRequirement;
use crate::entities::StageSpec;
use crate::services::stage_registry::StageRegistry;
use crate::value_objects::Workflow;

/// A stage selected to run for a given workflow, with its effective
/// optionality already resolved.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedStage<'a> {
    pub spec: &'a StageSpec,
    pub optional: bool,
}

/// Resolves the ordered list of stages to execute for `workflow`, honoring
/// `config`'s `stage.<name>.enabled` overrides for optional stages.
pub fn resolve_workflow<'a>(
    registry: &'a StageRegistry,
    workflow: Workflow,
    config: &OrchestratorConfig,
) -> Vec<ResolvedStage<'a>> {
    registry
        .ordered_stages()
        .iter()
        .filter_map(|spec| {
            match spec.requirement_for(workflow) {
                WorkflowRequirement::Required => Some(ResolvedStage {
                    spec,
                    optional: false,
                }),
                WorkflowRequirement::Optional => {
                    let enabled = config.stage_enabled_override(&spec.name).unwrap_or(false);
                    enabled.then_some(ResolvedStage {
                        spec,
                        optional: true,
                    })
                }
                WorkflowRequirement::Excluded => None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::{StageIndex, StageKind};

    fn stage(index: u32, name: &str, reqs: Vec<(Workflow, WorkflowRequirement)>) -> StageSpec {
        StageSpec {
            index: StageIndex::new(index),
            name: name.into(),
            kind: StageKind::NativeSubprocess,
            declared_inputs: vec![],
            declared_outputs: vec![],
            required_for_workflow: reqs,
            optional: false,
            timeout_seconds: 0,
            version: "v1".into(),
            environment_keys: vec![],
        }
    }

    fn registry() -> StageRegistry {
        StageRegistry::new(vec![
            stage(
                1,
                "demux",
                vec![
                    (Workflow::Subtitle, WorkflowRequirement::Required),
                    (Workflow::Transcribe, WorkflowRequirement::Required),
                    (Workflow::Translate, WorkflowRequirement::Required),
                ],
            ),
            stage(
                2,
                "source_separation",
                vec![
                    (Workflow::Subtitle, WorkflowRequirement::Optional),
                    (Workflow::Transcribe, WorkflowRequirement::Optional),
                    (Workflow::Translate, WorkflowRequirement::Optional),
                ],
            ),
            stage(
                3,
                "mux",
                vec![(Workflow::Subtitle, WorkflowRequirement::Required)],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn excluded_stages_never_appear() {
        let resolved = resolve_workflow(&registry(), Workflow::Transcribe, &OrchestratorConfig::default());
        assert!(resolved.iter().all(|r| r.spec.name != "mux"));
    }

    #[test]
    fn optional_stage_absent_by_default() {
        let resolved = resolve_workflow(&registry(), Workflow::Subtitle, &OrchestratorConfig::default());
        assert!(!resolved.iter().any(|r| r.spec.name == "source_separation"));
    }

    #[test]
    fn optional_stage_included_when_enabled() {
        let mut config = OrchestratorConfig::default();
        config.stage_overrides.entry("source_separation".into()).or_default().enabled = Some(true);
        let resolved = resolve_workflow(&registry(), Workflow::Subtitle, &config);
        let entry = resolved.iter().find(|r| r.spec.name == "source_separation").unwrap();
        assert!(entry.optional);
    }

    #[test]
    fn resolved_stages_preserve_index_order() {
        let mut config = OrchestratorConfig::default();
        config.stage_overrides.entry("source_separation".into()).or_default().enabled = Some(true);
        let resolved = resolve_workflow(&registry(), Workflow::Subtitle, &config);
        let indices: Vec<_> = resolved.iter().map(|r| r.spec.index.get()).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }
}
