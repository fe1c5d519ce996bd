// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Stable, 1-based stage ordinal (§3 `StageSpec.index`).

use std::fmt;

use serde::{Deserialize, Serialize};

/// A stage's position in the pipeline, 1..N, stable and gap-free within a
/// registry. `Ord`/`PartialOrd` give total-order comparisons so stages can be
/// sorted and compared directly by execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageIndex(u32);

impl StageIndex {
    /// Constructs an index. Panics on `0`, since indices are 1-based by
    /// definition; callers at the registry boundary should validate input
    /// before calling this (see `StageRegistry::validate`).
    pub fn new(value: u32) -> Self {
        assert!(value > 0, "stage index must be >= 1");
        Self(value)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Directory prefix used for this stage's subdirectory, e.g. `01`.
    pub fn dir_prefix(self) -> String {
        format!("{:02}", self.0)
    }
}

impl fmt::Display for StageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_prefix_is_zero_padded() {
        assert_eq!(StageIndex::new(1).dir_prefix(), "01");
        assert_eq!(StageIndex::new(12).dir_prefix(), "12");
    }

    #[test]
    #[should_panic]
    fn zero_is_invalid() {
        StageIndex::new(0);
    }

    #[test]
    fn ordering_follows_numeric_value() {
        assert!(StageIndex::new(1) < StageIndex::new(2));
    }
}
