// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Sha256ContentHasher (C1)
//!
//! Streaming SHA-256 over `tokio::fs`, never loading a whole file into
//! memory (§4.1): reads fixed 64 KiB chunks until EOF.

use std::path::Path;

use async_trait::async_trait;
use sha2::{Digest as _, Sha256};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use media_pipeline_domain::repositories::content_hasher::Digest;
use media_pipeline_domain::{ContentHasher, PipelineError};

const CHUNK_SIZE: usize = 64 * 1024;

/// Streaming, chunked SHA-256 hasher.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256ContentHasher;

impl Sha256ContentHasher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ContentHasher for Sha256ContentHasher {
    async fn hash_file(&self, path: &Path) -> Result<Digest, PipelineError> {
        let mut file = File::open(path).await.map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                PipelineError::NotFound(path.to_path_buf())
            } else {
                PipelineError::IoError(format!("reading {}: {err}", path.display()))
            }
        })?;

        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            let read = file
                .read(&mut buf)
                .await
                .map_err(|err| PipelineError::IoError(format!("reading {}: {err}", path.display())))?;
            if read == 0 {
                break;
            }
            hasher.update(&buf[..read]);
        }

        Ok(hex::encode(hasher.finalize()))
    }

    fn hash_bytes(&self, data: &[u8]) -> Digest {
        hex::encode(Sha256::digest(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn hashes_a_file_streamed_in_chunks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audio.wav");
        let mut file = File::create(&path).await.unwrap();
        file.write_all(&vec![0xAB; CHUNK_SIZE * 3 + 17]).await.unwrap();
        file.flush().await.unwrap();

        let hasher = Sha256ContentHasher::new();
        let digest = hasher.hash_file(&path).await.unwrap();
        assert_eq!(digest.len(), 64);

        let expected = hasher.hash_bytes(&vec![0xAB; CHUNK_SIZE * 3 + 17]);
        assert_eq!(digest, expected);
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let hasher = Sha256ContentHasher::new();
        let err = hasher.hash_file(Path::new("/no/such/file")).await.unwrap_err();
        assert!(matches!(err, PipelineError::NotFound(_)));
    }

    #[test]
    fn hash_bytes_is_deterministic() {
        let hasher = Sha256ContentHasher::new();
        assert_eq!(hasher.hash_bytes(b"hello"), hasher.hash_bytes(b"hello"));
        assert_ne!(hasher.hash_bytes(b"hello"), hasher.hash_bytes(b"world"));
    }
}
