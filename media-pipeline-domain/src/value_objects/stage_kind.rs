// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! How the Stage Runner invokes a stage (§3 `StageSpec.kind`, §4.8).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// The invocation mechanism for a stage body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Spawned as a child process with a controlled environment.
    NativeSubprocess,
    /// Spawned via an equivalent invocation that mounts `job_dir` read-write
    /// and shared model caches read-only.
    Container,
    /// Executed in-process inside the orchestrator, for trivial stages.
    PureFunction,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NativeSubprocess => "native_subprocess",
            Self::Container => "container",
            Self::PureFunction => "pure_function",
        };
        write!(f, "{s}")
    }
}

impl FromStr for StageKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "native_subprocess" => Ok(Self::NativeSubprocess),
            "container" => Ok(Self::Container),
            "pure_function" => Ok(Self::PureFunction),
            other => Err(PipelineError::invalid_descriptor(format!(
                "unknown stage kind '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_display_and_from_str() {
        for kind in [StageKind::NativeSubprocess, StageKind::Container, StageKind::PureFunction] {
            let s = kind.to_string();
            assert_eq!(s.parse::<StageKind>().unwrap(), kind);
        }
    }
}
