// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Concrete adapters for the domain's infrastructure ports.

pub mod content_hasher;

pub use content_hasher::Sha256ContentHasher;
