// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Stage Manifest
//!
//! The per-stage, per-job JSON record (§3, §4.2, §4.3, §6.2): what ran,
//! what it consumed, what it produced, and how it ended. Every stage
//! execution writes exactly one manifest, even on crash (§9); there is
//! no "optional manifest" path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Fingerprint;

/// One hashed file reference, used for both `inputs[]` and `outputs[]`.
/// `role` identifies the output's purpose (e.g. `transcript`, `subtitles`)
/// and is `None` for plain inputs that carry no semantic role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub path: String,
    pub sha256: String,
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl ManifestEntry {
    pub fn new(path: impl Into<String>, sha256: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            path: path.into(),
            sha256: sha256.into(),
            size_bytes,
            role: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// The finalized record of one stage attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageManifest {
    pub stage_name: String,
    pub stage_index: u32,
    pub stage_version: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_seconds: f64,
    pub exit_code: i32,
    pub fingerprint: Option<Fingerprint>,
    #[serde(default)]
    pub inputs: Vec<ManifestEntry>,
    #[serde(default)]
    pub outputs: Vec<ManifestEntry>,
    #[serde(default)]
    pub environment: std::collections::BTreeMap<String, String>,
    #[serde(default)]
    pub notes: Vec<String>,
    /// Set when a post-stage containment check found a file written outside
    /// the stage's own directory (§7 item 3). Not part of the §6.2
    /// wire schema verbatim, but an additive field the orchestrator is
    /// required to record.
    #[serde(default)]
    pub containment_violation: bool,
}

impl StageManifest {
    pub fn is_success(&self) -> bool {
        self.exit_code == 0 && !self.containment_violation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_requires_zero_exit_and_no_containment_violation() {
        let base = StageManifest {
            stage_name: "demux".into(),
            stage_index: 1,
            stage_version: "v1".into(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            duration_seconds: 1.0,
            exit_code: 0,
            fingerprint: None,
            inputs: vec![],
            outputs: vec![],
            environment: Default::default(),
            notes: vec![],
            containment_violation: false,
        };
        assert!(base.is_success());

        let violated = StageManifest {
            containment_violation: true,
            ..base.clone()
        };
        assert!(!violated.is_success());

        let failed = StageManifest {
            exit_code: 1,
            ..base
        };
        assert!(!failed.is_success());
    }

    #[test]
    fn serializes_role_only_when_present() {
        let entry = ManifestEntry::new("audio.wav", "a".repeat(64), 100);
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("role"));

        let with_role = entry.with_role("transcript");
        let json = serde_json::to_string(&with_role).unwrap();
        assert!(json.contains("transcript"));
    }
}
