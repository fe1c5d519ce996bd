// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The records that persist across process invocations: [`JobDescriptor`],
//! [`StageSpec`], [`StageManifest`], [`JobReport`].

pub mod job_descriptor;
pub mod job_report;
pub mod stage_manifest;
pub mod stage_spec;

pub use job_descriptor::{JobDescriptor, RawJobDescriptor};
pub use job_report::{JobReport, JobReportStage, OverallStatus, StageExecutionKind};
pub use stage_manifest::{ManifestEntry, StageManifest};
pub use stage_spec::StageSpec;
