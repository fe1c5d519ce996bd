// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Job ID
//!
//! An opaque, date-prefixed, unique-per-run identifier (§3 `JobDescriptor.job_id`).
//!
//! ## Format
//!
//! `<YYYYMMDD>-<26-char ULID>`, e.g. `20260727-01J5Z8X8K2Q3N4R5S6T7U8V9W0`. The
//! date prefix makes job directories sort and glob naturally by day; the ULID
//! suffix is itself lexicographically sortable by creation time and carries
//! 80 bits of randomness, so collisions across concurrently-prepared jobs are
//! not a practical concern.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::PipelineError;

/// Opaque, date-prefixed job identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobId(String);

impl JobId {
    /// Generates a fresh id stamped with the current UTC date.
    pub fn generate() -> Self {
        Self::generate_at(Utc::now())
    }

    /// Generates a fresh id stamped with a caller-supplied timestamp, useful
    /// for deterministic tests.
    pub fn generate_at(now: DateTime<Utc>) -> Self {
        let date = now.format("%Y%m%d");
        let ulid = Ulid::new();
        Self(format!("{date}-{ulid}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (date, suffix) = s.split_once('-').ok_or_else(|| {
            PipelineError::invalid_descriptor(format!("job_id '{s}' is missing a date prefix"))
        })?;

        if date.len() != 8 || !date.chars().all(|c| c.is_ascii_digit()) {
            return Err(PipelineError::invalid_descriptor(format!(
                "job_id '{s}' has a malformed date prefix"
            )));
        }

        if suffix.is_empty() {
            return Err(PipelineError::invalid_descriptor(format!(
                "job_id '{s}' is missing its identifier suffix"
            )));
        }

        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for JobId {
    type Error = PipelineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<JobId> for String {
    fn from(value: JobId) -> Self {
        value.0
    }
}
