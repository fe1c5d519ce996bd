// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Infrastructure Layer
//!
//! Concrete implementations of the domain's repository ports, plus the
//! runtime machinery (Stage I/O Context, Stage Runner, Pipeline Orchestrator)
//! that drives them. Nothing outside this layer touches a filesystem path or
//! spawns a process directly.

pub mod adapters;
pub mod config;
pub mod logging;
pub mod repositories;
pub mod runtime;

pub use adapters::Sha256ContentHasher;
pub use repositories::{JobReportWriter, JsonManifestStore};
pub use runtime::orchestrator::{PipelineOrchestrator, StageStatus};
pub use runtime::stage_context::StageIoContext;
pub use runtime::stage_runner::CompositeStageRunner;
