// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Manifest Store
//!
//! Purely file-backed persistence for [`crate::entities::StageManifest`]
//! (§3, §4.3, C3). No in-memory index. Implementations must write
//! atomically (temp-file + rename) so a manifest is never observed
//! half-written.

use std::path::Path;

use async_trait::async_trait;

use crate::entities::StageManifest;
use crate::error::PipelineError;

/// Loads and stores `manifest.json` under a stage directory.
///
/// Hash re-verification of recorded entries against the current filesystem
/// state is the caller's responsibility (the Resume Planner), not this
/// trait's.
#[async_trait]
pub trait ManifestRepository: Send + Sync {
    /// Reads `<stage_dir>/manifest.json`. Returns `Ok(None)` if the file is
    /// absent. A parse failure is reported as
    /// [`PipelineError::ManifestParseFailure`]; callers treat that the same
    /// as "missing" (§4.3, §7 item 2), logging it but not propagating
    /// it as a fatal error.
    async fn load(&self, stage_dir: &Path) -> Result<Option<StageManifest>, PipelineError>;

    /// Atomically replaces `<stage_dir>/manifest.json` with `manifest`.
    async fn store(&self, stage_dir: &Path, manifest: &StageManifest) -> Result<(), PipelineError>;
}
