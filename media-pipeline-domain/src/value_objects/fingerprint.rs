// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! A content-addressed reuse key for a stage (§3, §4.11, C11).
//!
//! This type only carries and validates the 64-hex-digit digest; the
//! derivation algorithm itself (`fp(S) = SHA256(version || SHA256(inputs) ||
//! SHA256(env))`) lives in [`crate::services::fingerprint`], which is the
//! only producer of a `Fingerprint` outside of parsing one back from a
//! stored manifest.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// A SHA-256 digest representing a stage's reuse key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wraps a raw hex digest, validating it is exactly 64 lowercase hex
    /// characters (as produced by `hex::encode` over a SHA-256 digest).
    pub fn from_hex(hex: impl Into<String>) -> Result<Self, PipelineError> {
        let hex = hex.into();
        if hex.len() == 64 && hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()) {
            Ok(Self(hex))
        } else {
            Err(PipelineError::invalid_configuration(format!(
                "'{hex}' is not a valid 64-hex-digit fingerprint"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_digest() {
        let digest = "a".repeat(64);
        assert!(Fingerprint::from_hex(digest).is_ok());
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(Fingerprint::from_hex("abc").is_err());
    }

    #[test]
    fn rejects_uppercase() {
        let digest = "A".repeat(64);
        assert!(Fingerprint::from_hex(digest).is_err());
    }
}
