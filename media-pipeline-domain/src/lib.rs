// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Media Pipeline Domain
//!
//! Pure domain layer for the media-to-subtitles pipeline orchestrator, following
//! Domain-Driven Design principles.
//!
//! ## Overview
//!
//! This crate contains the orchestrator's business rules with no dependency on
//! an async runtime, a filesystem, or a process model:
//!
//! - **Value Objects**: [`JobId`], [`StageIndex`], [`Workflow`], [`Language`],
//!   [`StageKind`], [`Fingerprint`], [`ResumeStatus`]: immutable, self-validating
//!   types.
//! - **Entities**: [`JobDescriptor`], [`StageSpec`], [`StageManifest`],
//!   [`JobReport`]: the records that persist across process invocations.
//! - **Repositories** (ports): [`ContentHasher`], [`ManifestRepository`],
//!   [`StageRunner`]: traits implemented by the infrastructure crate.
//! - **Services**: [`StageRegistry`], workflow resolution, fingerprinting, and
//!   the [`ResumePlanner`]: the algorithmic heart of the orchestrator.
//!
//! ## Design
//!
//! Domain services that are purely computational (workflow resolution,
//! fingerprint derivation, resume classification) are synchronous functions.
//! Traits that front I/O (reading a file, launching a subprocess, persisting a
//! manifest) are `async_trait` ports with no concrete implementation here;
//! implementing them is the infrastructure crate's job. This mirrors the rule
//! that CPU-bound domain logic stays synchronous while I/O-bound contracts
//! remain async, even though both live in the domain layer.
//!
//! No module in this crate touches `tokio`, opens a file, or spawns a process.

pub mod config;
pub mod entities;
pub mod error;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use config::OrchestratorConfig;
pub use entities::{JobDescriptor, JobReport, StageManifest, StageSpec};
pub use error::{PipelineError, PipelineResult};
pub use repositories::{ContentHasher, ManifestRepository, StageRunner};
pub use services::{
    compute_fingerprint, resolve_workflow, FingerprintInputs, ResumeDecision, ResumePlanner, StageRegistry,
};
pub use value_objects::{
    Fingerprint, JobId, Language, ResumeStatus, StageIndex, StageKind, Workflow,
};
