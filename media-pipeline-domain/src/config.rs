// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Orchestrator Configuration
//!
//! A typed configuration structure for the keys the orchestrator core
//! recognizes (§6.5), plus an escape-hatch map for stage-private values. This
//! replaces a dynamic, string-keyed dictionary with a structure that rejects
//! typos in orchestrator-level keys at load time while still passing
//! stage-private keys through untouched.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PipelineError;

/// Per-stage overrides recognized by the orchestrator core: `stage.<name>.enabled`
/// and `stage.<name>.timeout_seconds`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageOverride {
    pub enabled: Option<bool>,
    pub timeout_seconds: Option<u64>,
}

/// The orchestrator-recognized configuration surface (§6.5), plus an
/// escape hatch for everything else.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrchestratorConfig {
    /// `pipeline.stop_on_first_critical_failure`, default true.
    #[serde(default = "default_true")]
    pub stop_on_first_critical_failure: bool,

    /// `pipeline.default_stage_timeout_seconds`: fallback when a
    /// `StageSpec` does not specify one.
    pub default_stage_timeout_seconds: Option<u64>,

    /// `pipeline.cache_enabled`, default true; when false every stage
    /// re-executes regardless of fingerprint.
    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    /// `stage.<name>.*` overrides, keyed by stage name.
    #[serde(default)]
    pub stage_overrides: HashMap<String, StageOverride>,

    /// Everything else: stage-private keys that flow through to stages
    /// unexamined, keyed by their original dotted name.
    #[serde(default)]
    pub stage_private: HashMap<String, Value>,
}

fn default_true() -> bool {
    true
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            stop_on_first_critical_failure: true,
            default_stage_timeout_seconds: None,
            cache_enabled: true,
            stage_overrides: HashMap::new(),
            stage_private: HashMap::new(),
        }
    }
}

impl OrchestratorConfig {
    /// Builds a config from a flat `descriptor.json`-style `config` map,
    /// recognizing the §6.5 keys and rejecting unknown orchestrator-level
    /// keys (those starting with `pipeline.` or `stage.<name>.`) while
    /// passing everything else through as stage-private.
    pub fn from_flat_map(map: &HashMap<String, Value>) -> Result<Self, PipelineError> {
        let mut cfg = Self::default();

        for (key, value) in map {
            if let Some(rest) = key.strip_prefix("pipeline.") {
                match rest {
                    "stop_on_first_critical_failure" => {
                        cfg.stop_on_first_critical_failure = expect_bool(key, value)?;
                    }
                    "default_stage_timeout_seconds" => {
                        cfg.default_stage_timeout_seconds = Some(expect_u64(key, value)?);
                    }
                    "cache_enabled" => {
                        cfg.cache_enabled = expect_bool(key, value)?;
                    }
                    other => {
                        return Err(PipelineError::invalid_configuration(format!(
                            "unrecognized orchestrator key 'pipeline.{other}'"
                        )));
                    }
                }
            } else if let Some(rest) = key.strip_prefix("stage.") {
                let Some((stage_name, field)) = rest.split_once('.') else {
                    return Err(PipelineError::invalid_configuration(format!(
                        "malformed stage override key '{key}'"
                    )));
                };
                let entry = cfg.stage_overrides.entry(stage_name.to_string()).or_default();
                match field {
                    "enabled" => entry.enabled = Some(expect_bool(key, value)?),
                    "timeout_seconds" => entry.timeout_seconds = Some(expect_u64(key, value)?),
                    other => {
                        return Err(PipelineError::invalid_configuration(format!(
                            "unrecognized stage override field 'stage.{stage_name}.{other}'"
                        )));
                    }
                }
            } else {
                cfg.stage_private.insert(key.clone(), value.clone());
            }
        }

        Ok(cfg)
    }

    /// Looks up the effective `enabled` override for a stage, if any.
    pub fn stage_enabled_override(&self, stage_name: &str) -> Option<bool> {
        self.stage_overrides.get(stage_name).and_then(|o| o.enabled)
    }

    /// Looks up the effective timeout override for a stage, if any.
    pub fn stage_timeout_override(&self, stage_name: &str) -> Option<u64> {
        self.stage_overrides
            .get(stage_name)
            .and_then(|o| o.timeout_seconds)
    }
}

fn expect_bool(key: &str, value: &Value) -> Result<bool, PipelineError> {
    value
        .as_bool()
        .ok_or_else(|| PipelineError::invalid_configuration(format!("'{key}' must be a boolean")))
}

fn expect_u64(key: &str, value: &Value) -> Result<u64, PipelineError> {
    value
        .as_u64()
        .ok_or_else(|| PipelineError::invalid_configuration(format!("'{key}' must be a non-negative integer")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn recognized_keys_populate_struct_fields() {
        let cfg = OrchestratorConfig::from_flat_map(&map(&[
            ("pipeline.cache_enabled", json!(false)),
            ("pipeline.default_stage_timeout_seconds", json!(300)),
            ("stage.asr.timeout_seconds", json!(120)),
            ("asr.model", json!("large-v3")),
        ]))
        .unwrap();

        assert!(!cfg.cache_enabled);
        assert_eq!(cfg.default_stage_timeout_seconds, Some(300));
        assert_eq!(cfg.stage_timeout_override("asr"), Some(120));
        assert_eq!(cfg.stage_private.get("asr.model"), Some(&json!("large-v3")));
    }

    #[test]
    fn unknown_orchestrator_key_is_rejected() {
        let err = OrchestratorConfig::from_flat_map(&map(&[(
            "pipeline.typo_key",
            json!(true),
        )]))
        .unwrap_err();
        assert_eq!(err.category(), "configuration");
    }

    #[test]
    fn unknown_stage_field_is_rejected() {
        let err = OrchestratorConfig::from_flat_map(&map(&[(
            "stage.asr.bogus",
            json!(true),
        )]))
        .unwrap_err();
        assert_eq!(err.category(), "configuration");
    }

    #[test]
    fn defaults_match_spec() {
        let cfg = OrchestratorConfig::default();
        assert!(cfg.stop_on_first_critical_failure);
        assert!(cfg.cache_enabled);
    }
}
