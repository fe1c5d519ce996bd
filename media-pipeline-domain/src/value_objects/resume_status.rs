// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Resume classification of a single stage (§4.7, C7).

use std::fmt;

use serde::{Deserialize, Serialize};

/// The Resume Planner's classification of one stage against its manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeStatus {
    /// Manifest exists, exit 0, every declared output exists and hashes
    /// match, and the fingerprint matches what would be computed now.
    Done,
    /// Manifest exists with exit 0 but the fingerprint no longer matches.
    Stale,
    /// Manifest exists with a non-zero exit code.
    Failed,
    /// No manifest exists for this stage.
    Missing,
    /// An upstream optional stage that this stage depends on failed to
    /// produce its declared outputs; this stage is not runnable this pass
    /// (§9, Open Question: optional stage dependencies).
    SkippedMissingUpstream,
}

impl ResumeStatus {
    /// Whether this status means "nothing to do for this stage".
    pub fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }

    /// Whether this status requires the stage to (re-)execute this run.
    pub fn requires_execution(self) -> bool {
        matches!(self, Self::Stale | Self::Failed | Self::Missing)
    }
}

impl fmt::Display for ResumeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Done => "done",
            Self::Stale => "stale",
            Self::Failed => "failed",
            Self::Missing => "missing",
            Self::SkippedMissingUpstream => "skipped_missing_upstream",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_done_short_circuits_execution() {
        assert!(ResumeStatus::Done.is_done());
        assert!(!ResumeStatus::Done.requires_execution());
        assert!(ResumeStatus::Stale.requires_execution());
        assert!(ResumeStatus::Failed.requires_execution());
        assert!(ResumeStatus::Missing.requires_execution());
        assert!(!ResumeStatus::SkippedMissingUpstream.requires_execution());
    }
}
