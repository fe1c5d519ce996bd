// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Bootstrap Module
//!
//! The bootstrap module sits **outside** the enterprise application layers
//! (domain, application, infrastructure). It is the composition root: the
//! only place that knows how to turn a process invocation into a running
//! job.
//!
//! - **Argument parsing** - secure CLI argument validation (`cli`)
//! - **Configuration** - `LOG_LEVEL` / `CONFIG_FILE` environment reading (`config`)
//! - **Signal handling** - SIGTERM/SIGINT/SIGHUP (Unix) or Ctrl-C (Windows) (`signals`)
//! - **Shutdown coordination** - cancellation flag shared with the orchestrator (`shutdown`)
//! - **Exit codes** - mapping pipeline/CLI errors onto the process exit status (`exit_code`)
//! - **Logging** - bootstrap-phase log sink, independent of the job's own logging (`logger`)
//!
//! ## Architecture Position
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │          BOOTSTRAP (This Module)             │
//! │  - CLI parsing & validation                  │
//! │  - Signal handling & shutdown coordination   │
//! │  - Exit code mapping                         │
//! └─────────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────────┐
//! │       media-pipeline (application +          │
//! │       infrastructure layers)                 │
//! └─────────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────────┐
//! │        media-pipeline-domain                 │
//! │  - Business Logic                            │
//! │  - Domain Services                           │
//! │  - Entities & Value Objects                  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Key Design Principles
//!
//! 1. **Separation from enterprise layers** - bootstrap can see the domain and
//!    infrastructure crates; neither of those sees back into bootstrap.
//! 2. **Graceful shutdown** - a signal handler fires [`shutdown::ShutdownCoordinator::initiate_shutdown`]
//!    exactly once; the orchestrator polls the resulting flag between stages.
//! 3. **Security first** - CLI paths are canonicalized and existence-checked
//!    before any domain code sees them.
//! 4. **Testability** - every component sits behind a trait with a no-op
//!    implementation for tests.

pub mod cli;
pub mod config;
pub mod exit_code;
pub mod logger;
pub mod shutdown;
pub mod signals;

pub use cli::{parse_and_validate, ParseError, ValidatedCli, ValidatedCommand};
pub use config::AppConfig;
pub use exit_code::ExitCode;
pub use shutdown::ShutdownCoordinator;
pub use signals::{create_signal_handler, SystemSignals};
