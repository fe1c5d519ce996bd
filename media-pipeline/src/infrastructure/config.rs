// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Config File Loading
//!
//! Loads the optional `CONFIG_FILE` (TOML, §6.6) into the flat,
//! dotted-key map [`OrchestratorConfig::from_flat_map`] expects, following
//! the same `ConfigService` pattern used elsewhere in this crate: a missing
//! file is not an error, it just means there are no file-provided overrides.
//!
//! The per-job `descriptor.json`'s own `config` map always wins over values
//! loaded here: [`merge_config_overrides`] applies the file's values first
//! and lets the descriptor overwrite them.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use media_pipeline_domain::PipelineError;

/// Loads a TOML config file and flattens its nested tables into the
/// dotted-key convention (`pipeline.*`, `stage.<name>.*`, arbitrary
/// stage-private keys) that [`OrchestratorConfig::from_flat_map`] expects.
///
/// A file that does not exist yields an empty map and a warning, mirroring
/// `ConfigService::load_observability_config`'s missing-file behavior.
/// `CONFIG_FILE` is an optional convenience, not a required input.
///
/// [`OrchestratorConfig::from_flat_map`]: media_pipeline_domain::config::OrchestratorConfig::from_flat_map
pub fn load_config_overrides(path: &Path) -> Result<HashMap<String, Value>, PipelineError> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "CONFIG_FILE not found, proceeding with no file-provided overrides");
        return Ok(HashMap::new());
    }

    let settings = config::Config::builder()
        .add_source(config::File::from(path).format(config::FileFormat::Toml))
        .build()
        .map_err(|err| PipelineError::invalid_configuration(format!("failed to load '{}': {err}", path.display())))?;

    let root: Value = settings
        .try_deserialize()
        .map_err(|err| PipelineError::invalid_configuration(format!("failed to parse '{}': {err}", path.display())))?;

    let mut flat = HashMap::new();
    flatten(String::new(), &root, &mut flat);
    Ok(flat)
}

/// Recursively flattens a JSON object into dotted keys. Non-object leaves
/// (including arrays) terminate the recursion and become a single entry.
fn flatten(prefix: String, value: &Value, out: &mut HashMap<String, Value>) {
    match value.as_object() {
        Some(map) => {
            for (key, child) in map {
                let dotted = if prefix.is_empty() { key.clone() } else { format!("{prefix}.{key}") };
                flatten(dotted, child, out);
            }
        }
        None => {
            if !prefix.is_empty() {
                out.insert(prefix, value.clone());
            }
        }
    }
}

/// Merges a job descriptor's own `config` map over a config file's
/// flattened overrides. The descriptor always wins: a `CONFIG_FILE` sets
/// fleet-wide defaults, the descriptor is the per-job word on top of them.
pub fn merge_config_overrides(
    file_overrides: HashMap<String, Value>,
    descriptor_overrides: HashMap<String, Value>,
) -> HashMap<String, Value> {
    let mut merged = file_overrides;
    merged.extend(descriptor_overrides);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_config_file_yields_no_overrides() {
        let overrides = load_config_overrides(Path::new("/nonexistent/path/does-not-exist.toml")).unwrap();
        assert!(overrides.is_empty());
    }

    #[test]
    fn nested_tables_flatten_into_dotted_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [pipeline]
            cache_enabled = false
            default_stage_timeout_seconds = 120

            [stage.asr]
            timeout_seconds = 600
            "#
        )
        .unwrap();

        let overrides = load_config_overrides(file.path()).unwrap();
        assert_eq!(overrides.get("pipeline.cache_enabled"), Some(&Value::Bool(false)));
        assert_eq!(
            overrides.get("pipeline.default_stage_timeout_seconds"),
            Some(&Value::from(120))
        );
        assert_eq!(overrides.get("stage.asr.timeout_seconds"), Some(&Value::from(600)));
    }

    #[test]
    fn descriptor_overrides_win_over_file_overrides() {
        let mut file_overrides = HashMap::new();
        file_overrides.insert("pipeline.cache_enabled".to_string(), Value::Bool(true));

        let mut descriptor_overrides = HashMap::new();
        descriptor_overrides.insert("pipeline.cache_enabled".to_string(), Value::Bool(false));

        let merged = merge_config_overrides(file_overrides, descriptor_overrides);
        assert_eq!(merged.get("pipeline.cache_enabled"), Some(&Value::Bool(false)));
    }
}
