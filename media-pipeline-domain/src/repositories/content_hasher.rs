// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Content Hasher
//!
//! Stable SHA-256 hashing of files and small in-memory payloads (§4.1,
//! C1). Required to be deterministic across platforms: reads in binary mode
//! with no normalization, and never loads an entire file into memory:
//! implementations must stream in fixed-size chunks (e.g. 64 KiB).
//!
//! `hash_file` is async because it performs real file I/O; `hash_bytes` is a
//! pure, synchronous computation and deliberately is not part of the async
//! trait, mirroring the domain's sync-compute / async-I/O split.

use std::path::Path;

use async_trait::async_trait;

use crate::error::PipelineError;

/// A 64-hex-digit SHA-256 digest, as produced by `hex::encode`.
pub type Digest = String;

/// Hashes files and byte payloads for manifests and fingerprints.
///
/// # Errors
///
/// `hash_file` fails with [`PipelineError::NotFound`] if `path` does not
/// exist, and [`PipelineError::IoError`] on any other read failure.
#[async_trait]
pub trait ContentHasher: Send + Sync {
    /// Streams `path` in fixed-size chunks and returns its SHA-256 digest.
    async fn hash_file(&self, path: &Path) -> Result<Digest, PipelineError>;

    /// Hashes an in-memory byte string. Pure and synchronous: no I/O is
    /// involved, so implementations must not block on anything else.
    fn hash_bytes(&self, data: &[u8]) -> Digest;
}
