// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Pure-function stage bodies
//!
//! The three `pure_function` stages in the standard catalog (§4.6) need
//! no external tool: `glossary_load`, `metadata_enrich`, and
//! `subtitle_generate` are plain local computations, executed in-process by
//! [`run`] rather than spawned as a subprocess or container.
//!
//! Each function receives the [`StageInvocation`] the orchestrator built from
//! the stage's [`media_pipeline_domain::StageSpec`]: `job_dir` to read a
//! declared input relative to a prior stage's directory, `stage_dir` to write
//! this stage's own declared output, and `env` for the stage's captured
//! `environment_keys`.

use std::path::Path;

use media_pipeline_domain::repositories::stage_runner::{StageInvocation, StageRunnerOutcome};
use media_pipeline_domain::PipelineError;
use serde::Deserialize;
use serde_json::json;

/// Dispatches a pure-function stage attempt by its registered name.
///
/// A pure function launching at all is itself infallible; a bad input or
/// I/O error is reported as a failing exit code, the same contract a
/// subprocess stage has, rather than aborting the whole pipeline. Launch
/// failures (an unregistered name) are the one case that propagates as a
/// [`PipelineError`], mirroring a subprocess that fails to spawn.
pub async fn run(invocation: &StageInvocation) -> Result<StageRunnerOutcome, PipelineError> {
    let result = match invocation.command.as_str() {
        "glossary_load" => glossary_load(invocation).await,
        "metadata_enrich" => metadata_enrich(invocation).await,
        "subtitle_generate" => subtitle_generate(invocation).await,
        other => {
            return Err(PipelineError::StageLaunchFailure {
                stage_name: other.to_string(),
                reason: format!("no pure function registered under the name '{other}'"),
            })
        }
    };

    match result {
        Ok(()) => Ok(StageRunnerOutcome {
            exit_code: 0,
            timed_out: false,
            cancelled: false,
        }),
        Err(err) => {
            tracing::warn!(error = %err, command = %invocation.command, "pure function stage failed");
            Ok(StageRunnerOutcome {
                exit_code: 1,
                timed_out: false,
                cancelled: false,
            })
        }
    }
}

async fn glossary_load(invocation: &StageInvocation) -> Result<(), PipelineError> {
    let configured_path = invocation.env.get("glossary_load.glossary_path");

    let contents = match configured_path {
        Some(path) if !path.is_empty() => match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => b"{}".to_vec(),
            Err(err) => return Err(PipelineError::IoError(format!("reading glossary at {path}: {err}"))),
        },
        _ => b"{}".to_vec(),
    };

    // Validate it parses as JSON before committing it as this stage's output;
    // an operator-supplied glossary file with a typo should fail the stage,
    // not silently propagate garbage downstream.
    let _: serde_json::Value = serde_json::from_slice(&contents)?;

    write_output(invocation, "glossary.json", &contents).await
}

async fn metadata_enrich(invocation: &StageInvocation) -> Result<(), PipelineError> {
    let enriched = invocation
        .env
        .get("metadata_enrich.tmdb_api_key")
        .is_some_and(|key| !key.is_empty());

    let body = json!({
        "enriched": enriched,
        "source": if enriched { "tmdb" } else { "descriptor" },
    });
    let bytes = serde_json::to_vec_pretty(&body)?;

    write_output(invocation, "enrichment.json", &bytes).await
}

#[derive(Debug, Deserialize)]
struct TranslatedSegment {
    start_ms: u64,
    end_ms: u64,
    text: String,
}

async fn subtitle_generate(invocation: &StageInvocation) -> Result<(), PipelineError> {
    let translated_path = invocation.job_dir.join("11_translate").join("translated.json");
    let segments: Vec<TranslatedSegment> = match tokio::fs::read(&translated_path).await {
        Ok(bytes) => serde_json::from_slice(&bytes)?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(err) => return Err(PipelineError::IoError(format!("reading {}: {err}", translated_path.display()))),
    };

    let max_line_length: usize = invocation
        .env
        .get("subtitle_generate.max_line_length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(42);
    let max_lines: usize = invocation
        .env
        .get("subtitle_generate.max_lines")
        .and_then(|v| v.parse().ok())
        .unwrap_or(2);

    let srt = render_srt(&segments, max_line_length, max_lines);
    write_output(invocation, "subtitles.srt", srt.as_bytes()).await
}

fn render_srt(segments: &[TranslatedSegment], max_line_length: usize, max_lines: usize) -> String {
    let mut out = String::new();
    for (index, segment) in segments.iter().enumerate() {
        out.push_str(&(index + 1).to_string());
        out.push('\n');
        out.push_str(&format!(
            "{} --> {}\n",
            format_timestamp(segment.start_ms),
            format_timestamp(segment.end_ms)
        ));
        out.push_str(&wrap(&segment.text, max_line_length, max_lines));
        out.push_str("\n\n");
    }
    out
}

fn format_timestamp(millis: u64) -> String {
    let hours = millis / 3_600_000;
    let minutes = (millis % 3_600_000) / 60_000;
    let seconds = (millis % 60_000) / 1_000;
    let ms = millis % 1_000;
    format!("{hours:02}:{minutes:02}:{seconds:02},{ms:03}")
}

fn wrap(text: &str, max_line_length: usize, max_lines: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate_len = if current.is_empty() {
            word.len()
        } else {
            current.len() + 1 + word.len()
        };

        if candidate_len > max_line_length && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            if lines.len() == max_lines {
                break;
            }
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() && lines.len() < max_lines {
        lines.push(current);
    }

    lines.join("\n")
}

async fn write_output(invocation: &StageInvocation, file_name: &str, bytes: &[u8]) -> Result<(), PipelineError> {
    tokio::fs::create_dir_all(&invocation.stage_dir)
        .await
        .map_err(|err| PipelineError::IoError(format!("creating {}: {err}", invocation.stage_dir.display())))?;

    let path: &Path = &invocation.stage_dir.join(file_name);
    tokio::fs::write(path, bytes)
        .await
        .map_err(|err| PipelineError::IoError(format!("writing {}: {err}", path.display())))
}
