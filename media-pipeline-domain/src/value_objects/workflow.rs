// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The named subset of the stage list a job selects (§3, §4.6).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// One of the three workflow kinds the orchestrator understands.
///
/// ```
/// use media_pipeline_domain::Workflow;
///
/// assert_eq!("subtitle".parse::<Workflow>().unwrap(), Workflow::Subtitle);
/// assert_eq!(Workflow::Translate.to_string(), "translate");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Workflow {
    Subtitle,
    Transcribe,
    Translate,
}

impl Workflow {
    /// Whether this workflow requires a `target_language` (§3).
    pub fn requires_target_language(self) -> bool {
        matches!(self, Self::Subtitle | Self::Translate)
    }
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Subtitle => "subtitle",
            Self::Transcribe => "transcribe",
            Self::Translate => "translate",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Workflow {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subtitle" => Ok(Self::Subtitle),
            "transcribe" => Ok(Self::Transcribe),
            "translate" => Ok(Self::Translate),
            other => Err(PipelineError::invalid_descriptor(format!(
                "unknown workflow '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_workflow() {
        assert!("subtitles".parse::<Workflow>().is_err());
    }

    #[test]
    fn target_language_requirement_matches_spec() {
        assert!(Workflow::Subtitle.requires_target_language());
        assert!(Workflow::Translate.requires_target_language());
        assert!(!Workflow::Transcribe.requires_target_language());
    }
}
