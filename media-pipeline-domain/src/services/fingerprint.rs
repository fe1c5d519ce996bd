// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Cache Keys / Fingerprints (C11)
//!
//! Derives a reuse fingerprint for a stage (§4.11):
//!
//! ```text
//! fp(S) = SHA256(
//!   stage_version(S)
//!   || SHA256(declared_inputs_content(S))
//!   || SHA256(declared_environment(S))
//! )
//! ```
//!
//! `declared_inputs_content` is the sorted concatenation of each declared
//! input's own SHA-256 digest (already computed by the [`crate::ContentHasher`]
//! when the input was recorded), not a re-read of the file. `declared_environment`
//! is the sorted `key=value` concatenation of the config subset named in the
//! stage's `environment_keys`.
//!
//! For stages with no declared inputs (e.g. `metadata_enrich`, which consumes
//! only the descriptor), callers pass descriptor-derived fields in place of
//! input hashes (§4.11 Edge cases).

use sha2::{Digest as _, Sha256};

use crate::value_objects::Fingerprint;

/// The pieces of state a stage's fingerprint is derived from.
#[derive(Debug, Clone)]
pub struct FingerprintInputs<'a> {
    pub stage_version: &'a str,
    /// SHA-256 digests of each declared input (or, for input-less stages,
    /// of whatever descriptor fields the stage depends on). Order does not
    /// matter: this function sorts before hashing so callers need not.
    pub input_digests: Vec<String>,
    /// The config subset this stage depends on, as `key=value` pairs.
    /// Order does not matter for the same reason.
    pub environment: Vec<(String, String)>,
}

/// Computes the stage's fingerprint from its version, input digests, and
/// captured environment.
pub fn compute_fingerprint(inputs: &FingerprintInputs<'_>) -> Fingerprint {
    let mut sorted_digests = inputs.input_digests.clone();
    sorted_digests.sort();
    let inputs_hash = Sha256::digest(sorted_digests.join("\n").as_bytes());

    let mut sorted_env = inputs.environment.clone();
    sorted_env.sort();
    let env_joined: String = sorted_env
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("\n");
    let env_hash = Sha256::digest(env_joined.as_bytes());

    let mut hasher = Sha256::new();
    hasher.update(inputs.stage_version.as_bytes());
    hasher.update(inputs_hash);
    hasher.update(env_hash);
    let digest = hasher.finalize();

    // `Fingerprint::from_hex` only fails on malformed input; a hex encoding
    // of a SHA-256 digest is always exactly 64 lowercase hex characters.
    Fingerprint::from_hex(hex::encode(digest)).expect("hex encoding of a sha256 digest is always valid")
}
