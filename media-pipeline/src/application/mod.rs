// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Application Layer
//!
//! Use cases that load a job descriptor and drive the orchestrator: `run`
//! executes a job to completion (or failure), `status` reports what a `run`
//! would do without doing it. Use cases depend only on the domain's traits
//! and return structured data; formatting that data for a terminal is
//! `presentation`'s job.

pub mod use_cases;

pub use use_cases::{RunJobUseCase, ShowStatusUseCase};
