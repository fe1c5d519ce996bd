// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Process entry point: parses and validates the CLI (§6.6), installs
//! logging and signal handling, then dispatches to the `run` or `status`
//! use case. All business logic lives in `media_pipeline`; this binary only
//! wires dependencies together and translates the result into a process
//! exit code.

use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use media_pipeline::infrastructure::{
    CompositeStageRunner, JobReportWriter, JsonManifestStore, PipelineOrchestrator, Sha256ContentHasher,
};
use media_pipeline::application::{RunJobUseCase, ShowStatusUseCase};
use media_pipeline::presentation;
use media_pipeline_bootstrap::{
    create_signal_handler, parse_and_validate, AppConfig, ExitCode as PipelineExitCode, ShutdownCoordinator,
    ValidatedCommand,
};

#[tokio::main]
async fn main() -> ExitCode {
    let validated = match parse_and_validate() {
        Ok(validated) => validated,
        Err(err) => {
            eprintln!("{err}");
            return PipelineExitCode::from_parse_error(&err).into();
        }
    };

    let app_config = AppConfig::from_env();
    media_pipeline::infrastructure::logging::init(app_config.log_level);

    let orchestrator = match build_orchestrator() {
        Ok(orchestrator) => Arc::new(orchestrator),
        Err(err) => {
            eprintln!("failed to initialize the stage registry: {err}");
            return PipelineExitCode::Config.into();
        }
    };

    let shutdown = ShutdownCoordinator::default();
    let cancel_flag = shutdown.cancellation_flag();
    let signal_handler = create_signal_handler();
    let shutdown_for_signal = shutdown.clone();
    tokio::spawn(async move {
        signal_handler
            .wait_for_signal(Box::new(move || shutdown_for_signal.initiate_shutdown()))
            .await;
    });

    match validated.command {
        ValidatedCommand::Run { job_dir } => {
            let use_case = RunJobUseCase::new(
                Arc::clone(&orchestrator),
                Arc::new(JobReportWriter::new()),
                app_config.config_file.clone(),
            );
            let cancel: &AtomicBool = cancel_flag.as_ref();

            match use_case.execute(&job_dir, cancel).await {
                Ok(report) => {
                    print!("{}", presentation::format_report(&report));
                    job_exit_code(&report).into()
                }
                Err(err) => {
                    eprintln!("run failed: {err}");
                    job_error_exit_code(&err).into()
                }
            }
        }
        ValidatedCommand::Status { job_dir } => {
            let use_case = ShowStatusUseCase::new(Arc::clone(&orchestrator), app_config.config_file.clone());

            match use_case.execute(&job_dir).await {
                Ok(statuses) => {
                    print!("{}", presentation::format_status_table(&statuses));
                    PipelineExitCode::Success.into()
                }
                Err(err) => {
                    eprintln!("status failed: {err}");
                    PipelineExitCode::from_pipeline_error(&err).into()
                }
            }
        }
    }
}

fn build_orchestrator() -> Result<PipelineOrchestrator, media_pipeline::PipelineError> {
    PipelineOrchestrator::new(
        Arc::new(Sha256ContentHasher::new()),
        Arc::new(JsonManifestStore::new()),
        Arc::new(CompositeStageRunner::new()),
    )
}

/// `run`'s exit code follows §6.6/§7's narrow 0/1/2 contract once a job
/// actually produced a report: a run the orchestrator stopped because it
/// observed a termination signal (§5, §7 item 5) is always 2, regardless of
/// `overall`, since `report.json` is still written in that case rather than
/// the error path ([`job_error_exit_code`]) handling it. Otherwise
/// `success`/`partial_success` is 0, `failed` is 1.
fn job_exit_code(report: &media_pipeline::JobReport) -> PipelineExitCode {
    use media_pipeline_domain::entities::OverallStatus;

    if report.cancelled {
        return PipelineExitCode::Cancelled;
    }

    match report.overall {
        OverallStatus::Success | OverallStatus::PartialSuccess => PipelineExitCode::Success,
        OverallStatus::Failed => PipelineExitCode::Failure,
    }
}

/// Errors reaching `main` before a `JobReport` exists at all: a descriptor
/// that fails to load, or a `StageRegistry` construction failure. These
/// precede any stage ever running, so there is nothing a cancellation
/// signal could interrupt; everything here maps to 1 per §7.
fn job_error_exit_code(_err: &media_pipeline::PipelineError) -> PipelineExitCode {
    PipelineExitCode::Failure
}
