// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Media-to-Subtitles Pipeline Orchestrator
//!
//! Runs a media file through a fixed, ordered sequence of external tool
//! invocations (ASR, translation, subtitle rendering, ...) and tracks what
//! happened in a per-job directory so an interrupted job can be resumed
//! without redoing finished work.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               application                    │
//! │  use cases: run a job, report its status      │
//! └─────────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────────┐
//! │            media-pipeline-domain              │
//! │  entities, value objects, domain services      │
//! │  (pure; repositories/ports defined as traits)  │
//! └─────────────────────────────────────────────┘
//!                      ▲
//!                      │
//! ┌─────────────────────────────────────────────┐
//! │              infrastructure                   │
//! │  orchestrator loop, subprocess stage runner,   │
//! │  JSON manifest/report stores, content hasher   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! `application` depends only on the domain's traits; `infrastructure`
//! supplies the concrete implementations wired together in `main.rs`.

pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use media_pipeline_domain::{
    JobDescriptor, JobId, JobReport, OrchestratorConfig, PipelineError, PipelineResult, StageManifest, StageRegistry,
    StageSpec, Workflow,
};
