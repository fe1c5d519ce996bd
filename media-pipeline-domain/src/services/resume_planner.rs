// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Resume Planner (C7)
//!
//! Classifies a single stage's resume status against its manifest
//! (§4.7). The orchestrator calls [`ResumePlanner::classify`] once per stage,
//! in index order, immediately before deciding whether to (re-)execute it;
//! this is what lets "stale inputs changed because an earlier stage just
//! re-ran" propagate correctly without any separate bulk-invalidation pass:
//! by the time stage `i` is classified, stage `i-1` has already either been
//! confirmed `Done` or has just finished (re-)executing, so the input
//! digests and fingerprint fed into `classify` are always current.
//!
//! The `status` CLI command uses the same entry point, just without ever
//! calling a Stage Runner: it classifies every stage against whatever is on
//! disk right now.

use crate::entities::StageManifest;
use crate::value_objects::{Fingerprint, ResumeStatus};

/// Everything the planner needs to classify one stage. Computing these
/// fields (hashing files, checking existence, re-deriving the fingerprint)
/// is the infrastructure layer's job; this type is the seam between that
/// I/O and this pure decision.
#[derive(Debug, Clone)]
pub struct StageResumeInput {
    /// The stage's existing manifest, if one was found and parsed.
    pub manifest: Option<StageManifest>,
    /// Declared input paths that do not currently exist because an
    /// upstream optional stage failed to produce them (§9, Open
    /// Question: optional stage dependencies). Empty in the common case.
    pub missing_declared_inputs: Vec<String>,
    /// Whether every declared output exists and its current SHA-256
    /// matches the manifest's recorded digest (§8 property 4).
    pub outputs_intact: bool,
    /// The fingerprint as it would be computed right now, or `None` if it
    /// could not be computed (e.g. a declared input is currently missing
    /// for a reason other than upstream failure, §4.11's "deferred
    /// decision" edge case). A `None` here is treated conservatively as a
    /// cache miss.
    pub current_fingerprint: Option<Fingerprint>,
}

/// A stage's classification, paired with its name for reporting (used by
/// the `status` command).
#[derive(Debug, Clone)]
pub struct ResumeDecision {
    pub stage_name: String,
    pub status: ResumeStatus,
}

/// Stateless classifier; a struct rather than a free function to match the
/// rest of the domain's service-object convention.
pub struct ResumePlanner;

impl ResumePlanner {
    /// Classifies one stage (§4.7):
    ///
    /// - [`ResumeStatus::SkippedMissingUpstream`] if a declared input is
    ///   missing because an upstream optional stage did not produce it.
    /// - [`ResumeStatus::Missing`] if no manifest exists.
    /// - [`ResumeStatus::Failed`] if the manifest records a non-zero exit
    ///   code.
    /// - [`ResumeStatus::Stale`] if the manifest records success but either
    ///   an output no longer matches its recorded digest, or the
    ///   fingerprint could not be confirmed to be unchanged.
    /// - [`ResumeStatus::Done`] only when the manifest records success, all
    ///   outputs are intact, and the fingerprint matches.
    pub fn classify(input: &StageResumeInput) -> ResumeStatus {
        if !input.missing_declared_inputs.is_empty() {
            return ResumeStatus::SkippedMissingUpstream;
        }

        let Some(manifest) = &input.manifest else {
            return ResumeStatus::Missing;
        };

        if manifest.exit_code != 0 {
            return ResumeStatus::Failed;
        }

        if !input.outputs_intact {
            return ResumeStatus::Stale;
        }

        match (&input.current_fingerprint, &manifest.fingerprint) {
            (Some(current), Some(recorded)) if current == recorded => ResumeStatus::Done,
            _ => ResumeStatus::Stale,
        }
    }
}
