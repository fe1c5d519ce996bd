// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # CompositeStageRunner (C8)
//!
//! Dispatches a stage attempt according to its [`StageKind`] (§4.8):
//!
//! - `native_subprocess`: spawns the configured command with a controlled
//!   environment, streams stdout/stderr line-by-line into `stage.log`, and
//!   enforces `timeout`/cancellation by sending `SIGTERM` then escalating to
//!   `SIGKILL` after `grace_period` (§4.8, §5).
//! - `container`: the same invocation, wrapped so the command runs inside a
//!   container mounting `job_dir` read-write and a shared model cache
//!   read-only (§4.8).
//! - `pure_function`: executed in-process by name, for trivial stages that
//!   need no external tool (`glossary_load`, `metadata_enrich`,
//!   `subtitle_generate`).

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;

use media_pipeline_domain::repositories::stage_runner::{StageInvocation, StageRunnerOutcome};
use media_pipeline_domain::value_objects::StageKind;
use media_pipeline_domain::{PipelineError, StageRunner};

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// The container runtime binary, overridable for environments that use
/// something other than Docker (e.g. Podman) via an env var escape hatch.
fn container_runtime_bin() -> String {
    std::env::var("CONTAINER_RUNTIME_BIN").unwrap_or_else(|_| "docker".to_string())
}

/// Read-only shared model cache mounted into every container invocation.
fn model_cache_dir() -> PathBuf {
    std::env::var_os("MEDIA_PIPELINE_MODEL_CACHE")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/var/cache/media-pipeline/models"))
}

/// Dispatches stage attempts by [`StageKind`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CompositeStageRunner;

impl CompositeStageRunner {
    pub fn new() -> Self {
        Self
    }

    async fn run_command(&self, program: &str, args: &[String], invocation: &StageInvocation, cancel: &AtomicBool) -> Result<StageRunnerOutcome, PipelineError> {
        let mut command = Command::new(program);
        command
            .args(args)
            .current_dir(&invocation.job_dir)
            .env_clear()
            .envs(&invocation.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|err| PipelineError::StageLaunchFailure {
            stage_name: program.to_string(),
            reason: err.to_string(),
        })?;

        let log_path = invocation.stage_dir.join("stage.log");
        let stdout = child.stdout.take().expect("piped stdout");
        let stderr = child.stderr.take().expect("piped stderr");

        let stdout_task = tokio::spawn(stream_to_log(stdout, log_path.clone(), "stdout"));
        let stderr_task = tokio::spawn(stream_to_log(stderr, log_path.clone(), "stderr"));

        let pid = child.id();
        let deadline = invocation.timeout.map(|timeout| tokio::time::Instant::now() + timeout);

        let outcome = loop {
            let wait = child.wait();
            tokio::pin!(wait);

            let poll = tokio::time::sleep(CANCEL_POLL_INTERVAL);

            tokio::select! {
                status = &mut wait => {
                    let status = status.map_err(|err| PipelineError::IoError(format!("waiting for child: {err}")))?;
                    break StageRunnerOutcome {
                        exit_code: status.code().unwrap_or(-1),
                        timed_out: false,
                        cancelled: false,
                    };
                }
                _ = poll => {
                    if cancel.load(Ordering::SeqCst) {
                        terminate_then_kill(pid, &mut child, invocation.grace_period).await;
                        let status = child.wait().await.map_err(|err| PipelineError::IoError(format!("waiting for killed child: {err}")))?;
                        break StageRunnerOutcome {
                            exit_code: status.code().unwrap_or(130),
                            timed_out: false,
                            cancelled: true,
                        };
                    }

                    if let Some(deadline) = deadline {
                        if tokio::time::Instant::now() >= deadline {
                            terminate_then_kill(pid, &mut child, invocation.grace_period).await;
                            let status = child.wait().await.map_err(|err| PipelineError::IoError(format!("waiting for timed-out child: {err}")))?;
                            break StageRunnerOutcome {
                                exit_code: status.code().unwrap_or(124),
                                timed_out: true,
                                cancelled: false,
                            };
                        }
                    }
                }
            }
        };

        let _ = stdout_task.await;
        let _ = stderr_task.await;

        Ok(outcome)
    }
}

#[async_trait]
impl StageRunner for CompositeStageRunner {
    async fn execute(&self, invocation: &StageInvocation, cancel: &AtomicBool) -> Result<StageRunnerOutcome, PipelineError> {
        match invocation.kind {
            StageKind::NativeSubprocess => {
                self.run_command(&invocation.command, &invocation.args, invocation, cancel).await
            }
            StageKind::Container => {
                let runtime = container_runtime_bin();
                let mount = invocation.job_dir.display().to_string();
                let cache = model_cache_dir().display().to_string();

                let mut args = vec![
                    "run".to_string(),
                    "--rm".to_string(),
                    "-v".to_string(),
                    format!("{mount}:{mount}:rw"),
                    "-v".to_string(),
                    format!("{cache}:{cache}:ro"),
                ];
                for (key, value) in &invocation.env {
                    args.push("-e".to_string());
                    args.push(format!("{key}={value}"));
                }
                args.push(invocation.command.clone());
                args.extend(invocation.args.iter().cloned());

                self.run_command(&runtime, &args, invocation, cancel).await
            }
            StageKind::PureFunction => super::pure_functions::run(invocation).await,
        }
    }
}

async fn stream_to_log(reader: impl tokio::io::AsyncRead + Unpin, log_path: PathBuf, stream_name: &'static str) {
    let mut lines = BufReader::new(reader).lines();
    let mut file = match tokio::fs::OpenOptions::new().append(true).create(true).open(&log_path).await {
        Ok(file) => file,
        Err(_) => return,
    };

    while let Ok(Some(line)) = lines.next_line().await {
        let record = format!("[{stream_name}] {line}\n");
        let _ = file.write_all(record.as_bytes()).await;
    }
}

/// Sends a termination signal, waits up to `grace_period`, then escalates
/// to an unconditional kill if the child has not exited (§4.8, §5).
async fn terminate_then_kill(pid: Option<u32>, child: &mut tokio::process::Child, grace_period: Duration) {
    #[cfg(unix)]
    if let Some(pid) = pid {
        unsafe {
            libc::kill(pid as libc::pid_t, libc::SIGTERM);
        }
    }
    #[cfg(not(unix))]
    let _ = pid;

    let exited_gracefully = tokio::time::timeout(grace_period, child.wait()).await.is_ok();
    if !exited_gracefully {
        let _ = child.start_kill();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn invocation(job_dir: PathBuf, stage_dir: PathBuf, command: &str, args: &[&str]) -> StageInvocation {
        StageInvocation {
            kind: StageKind::NativeSubprocess,
            command: command.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            env: BTreeMap::new(),
            job_dir,
            stage_dir,
            timeout: None,
            grace_period: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn native_subprocess_captures_exit_code() {
        let dir = tempdir().unwrap();
        let stage_dir = dir.path().join("01_demux");
        tokio::fs::create_dir_all(&stage_dir).await.unwrap();

        let runner = CompositeStageRunner::new();
        let invocation = invocation(dir.path().to_path_buf(), stage_dir.clone(), "true", &[]);
        let cancel = AtomicBool::new(false);
        let outcome = runner.execute(&invocation, &cancel).await.unwrap();
        assert_eq!(outcome.exit_code, 0);
        assert!(!outcome.timed_out);
        assert!(!outcome.cancelled);
    }

    #[tokio::test]
    async fn native_subprocess_streams_output_to_stage_log() {
        let dir = tempdir().unwrap();
        let stage_dir = dir.path().join("01_demux");
        tokio::fs::create_dir_all(&stage_dir).await.unwrap();

        let runner = CompositeStageRunner::new();
        let invocation = invocation(
            dir.path().to_path_buf(),
            stage_dir.clone(),
            "/bin/sh",
            &["-c", "echo hello-from-stage"],
        );
        let cancel = AtomicBool::new(false);
        runner.execute(&invocation, &cancel).await.unwrap();

        let log = tokio::fs::read_to_string(stage_dir.join("stage.log")).await.unwrap();
        assert!(log.contains("hello-from-stage"));
    }

    #[tokio::test]
    async fn timeout_kills_a_long_running_process() {
        let dir = tempdir().unwrap();
        let stage_dir = dir.path().join("07_asr");
        tokio::fs::create_dir_all(&stage_dir).await.unwrap();

        let runner = CompositeStageRunner::new();
        let mut invocation = invocation(dir.path().to_path_buf(), stage_dir, "sleep", &["30"]);
        invocation.timeout = Some(Duration::from_millis(100));
        invocation.grace_period = Duration::from_millis(50);

        let cancel = AtomicBool::new(false);
        let outcome = runner.execute(&invocation, &cancel).await.unwrap();
        assert!(outcome.timed_out);
    }

    #[tokio::test]
    async fn cancellation_flag_kills_a_running_process() {
        let dir = tempdir().unwrap();
        let stage_dir = dir.path().join("07_asr");
        tokio::fs::create_dir_all(&stage_dir).await.unwrap();

        let runner = CompositeStageRunner::new();
        let invocation = invocation(dir.path().to_path_buf(), stage_dir, "sleep", &["30"]);
        let cancel = std::sync::Arc::new(AtomicBool::new(false));
        let cancel_clone = cancel.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            cancel_clone.store(true, Ordering::SeqCst);
        });

        let outcome = runner.execute(&invocation, &cancel).await.unwrap();
        assert!(outcome.cancelled);
    }
}
