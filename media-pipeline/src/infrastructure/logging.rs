// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline-Wide Logging
//!
//! Installs the global `tracing` subscriber the bootstrap layer's
//! `LogLevel` selects (§9's "pipeline-wide log is a distinct Logger
//! instance" design note). Every stage's [`StageIoContext`](crate::infrastructure::StageIoContext)
//! span nests under whatever subscriber is installed here.

use media_pipeline_bootstrap::config::LogLevel;

/// Installs a `fmt` subscriber at the given level as the global default.
///
/// Idempotent in the sense that a second call is harmless: `try_init`
/// reports (and this function swallows) the "already set" error rather than
/// panicking, since tests across the workspace may each want logging active.
pub fn init(level: LogLevel) {
    let subscriber = tracing_subscriber::fmt().with_max_level(tracing::Level::from(level)).finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::trace!("global tracing subscriber already installed, skipping");
    }
}
