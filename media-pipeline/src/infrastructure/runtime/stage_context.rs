// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Stage I/O Context (C2)
//!
//! Owns one stage attempt's directory, log, and in-progress manifest
//! (§4.2). The orchestrator opens one context per stage attempt, feeds it
//! declared inputs/outputs as it learns about them, and closes it with
//! [`StageIoContext::finish`], which is the only place a manifest is
//! written, unconditionally, even when the stage failed or the runner
//! itself errored, so there is never an "optional manifest" path (§9).
//!
//! A true RAII `Drop` impl cannot `await` the manifest write, so the
//! orchestrator is responsible for calling `finish` on every code path
//! (success, stage failure, runner error) instead of relying on scope exit.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use chrono::Utc;

use media_pipeline_domain::entities::ManifestEntry;
use media_pipeline_domain::{ContentHasher, Fingerprint, ManifestRepository, PipelineError, StageManifest, StageSpec};

/// A foreign-file snapshot: every regular file under `job_dir` that is not
/// inside this stage's own directory, keyed by path with `(size, mtime)` so
/// a second snapshot can be diffed against it cheaply.
type ForeignSnapshot = HashMap<PathBuf, (u64, SystemTime)>;

/// One stage attempt's I/O surface.
pub struct StageIoContext {
    hasher: Arc<dyn ContentHasher>,
    manifests: Arc<dyn ManifestRepository>,
    job_dir: PathBuf,
    stage_dir: PathBuf,
    stage_name: String,
    stage_index: u32,
    stage_version: String,
    started_at: chrono::DateTime<Utc>,
    inputs: Vec<ManifestEntry>,
    outputs: Vec<ManifestEntry>,
    environment: BTreeMap<String, String>,
    notes: Vec<String>,
    containment_violation: bool,
    foreign_snapshot: ForeignSnapshot,
    span: tracing::Span,
}

impl StageIoContext {
    /// Creates `job_dir/<index>_<name>/` if absent, opens (or creates)
    /// `stage.log`, and snapshots every file outside the new stage
    /// directory so [`check_containment`](Self::check_containment) can
    /// later detect a stage writing somewhere it should not have.
    pub async fn open(
        hasher: Arc<dyn ContentHasher>,
        manifests: Arc<dyn ManifestRepository>,
        job_dir: PathBuf,
        spec: &StageSpec,
    ) -> Result<Self, PipelineError> {
        let stage_dir = job_dir.join(spec.dir_name());
        tokio::fs::create_dir_all(&stage_dir)
            .await
            .map_err(|err| PipelineError::IoError(format!("creating {}: {err}", stage_dir.display())))?;

        let log_path = stage_dir.join("stage.log");
        if tokio::fs::metadata(&log_path).await.is_err() {
            tokio::fs::File::create(&log_path)
                .await
                .map_err(|err| PipelineError::IoError(format!("creating {}: {err}", log_path.display())))?;
        }

        let foreign_snapshot = snapshot_foreign(&job_dir, &stage_dir).await?;
        let span = tracing::info_span!("stage", name = %spec.name, index = spec.index.get());

        Ok(Self {
            hasher,
            manifests,
            job_dir,
            stage_dir,
            stage_name: spec.name.clone(),
            stage_index: spec.index.get(),
            stage_version: spec.version.clone(),
            started_at: Utc::now(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            environment: BTreeMap::new(),
            notes: Vec::new(),
            containment_violation: false,
            foreign_snapshot,
            span,
        })
    }

    pub fn stage_dir(&self) -> &Path {
        &self.stage_dir
    }

    pub fn log_path(&self) -> PathBuf {
        self.stage_dir.join("stage.log")
    }

    /// The tracing span for this stage attempt's lifetime; the orchestrator
    /// enters it for the duration of the invocation.
    pub fn span(&self) -> &tracing::Span {
        &self.span
    }

    pub fn inputs(&self) -> &[ManifestEntry] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[ManifestEntry] {
        &self.outputs
    }

    /// Records a declared input, hashing it lazily at call time. `path` is
    /// relative to `job_dir` (§6.1's `NN_name/file` convention).
    pub async fn add_input(&mut self, path: impl Into<String>, role: Option<&str>) -> Result<(), PipelineError> {
        let rel = path.into();
        let abs = self.job_dir.join(&rel);
        let entry = self.hash_entry(&abs, rel, role).await?;
        self.inputs.push(entry);
        Ok(())
    }

    /// Records a declared output, hashing it lazily at call time. `path` is
    /// relative to this stage's own directory; a path that escapes it is a
    /// fatal [`PipelineError::StageContainmentViolation`] (§4.2).
    pub async fn add_output(&mut self, path: impl Into<String>, role: Option<&str>) -> Result<(), PipelineError> {
        let rel = path.into();
        if escapes_containing_directory(&rel) {
            self.containment_violation = true;
            self.notes.push(format!("declared output '{rel}' escapes its stage directory"));
            return Err(PipelineError::StageContainmentViolation {
                stage_name: self.stage_name.clone(),
                path: PathBuf::from(&rel),
            });
        }

        let abs = self.stage_dir.join(&rel);
        let entry = self.hash_entry(&abs, rel, role).await?;
        self.outputs.push(entry);
        Ok(())
    }

    async fn hash_entry(&self, abs: &Path, rel: String, role: Option<&str>) -> Result<ManifestEntry, PipelineError> {
        let digest = self.hasher.hash_file(abs).await?;
        let size = tokio::fs::metadata(abs)
            .await
            .map_err(|err| PipelineError::IoError(format!("stat {}: {err}", abs.display())))?
            .len();
        let mut entry = ManifestEntry::new(rel, digest, size);
        if let Some(role) = role {
            entry = entry.with_role(role);
        }
        Ok(entry)
    }

    pub fn add_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn set_environment(&mut self, environment: BTreeMap<String, String>) {
        self.environment = environment;
    }

    /// Appends a line to `stage.log`, used to mirror orchestrator-level
    /// diagnostics alongside the stage body's own captured stdout/stderr
    /// (§1 logging: "mirrors lines into stage.log at info/error").
    pub async fn log_line(&self, line: &str) -> Result<(), PipelineError> {
        use tokio::io::AsyncWriteExt;

        let path = self.log_path();
        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .await
            .map_err(|err| PipelineError::IoError(format!("opening {}: {err}", path.display())))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|err| PipelineError::IoError(format!("writing {}: {err}", path.display())))?;
        file.write_all(b"\n")
            .await
            .map_err(|err| PipelineError::IoError(format!("writing {}: {err}", path.display())))?;
        Ok(())
    }

    /// Re-snapshots the job directory and compares it against the snapshot
    /// taken at `open` time; any file outside the stage's own directory
    /// that is new or changed marks this attempt as a containment
    /// violation.
    pub async fn check_containment(&mut self) -> Result<(), PipelineError> {
        let current = snapshot_foreign(&self.job_dir, &self.stage_dir).await?;
        if current != self.foreign_snapshot {
            self.containment_violation = true;
            self.notes.push("stage wrote outside its own stage directory".to_string());
        }
        Ok(())
    }

    pub fn containment_violation(&self) -> bool {
        self.containment_violation
    }

    /// Finalizes and atomically persists the manifest (§4.2, §4.3):
    /// fills in `finished_at`/`duration_seconds`/`exit_code`, whatever
    /// fingerprint the caller computed, and returns the manifest it wrote.
    /// Called unconditionally by the orchestrator regardless of how the
    /// stage attempt ended.
    pub async fn finish(self, exit_code: i32, fingerprint: Option<Fingerprint>) -> Result<StageManifest, PipelineError> {
        let finished_at = Utc::now();
        let duration_seconds = (finished_at - self.started_at).num_milliseconds() as f64 / 1000.0;

        let manifest = StageManifest {
            stage_name: self.stage_name,
            stage_index: self.stage_index,
            stage_version: self.stage_version,
            started_at: self.started_at,
            finished_at,
            duration_seconds,
            exit_code,
            fingerprint,
            inputs: self.inputs,
            outputs: self.outputs,
            environment: self.environment,
            notes: self.notes,
            containment_violation: self.containment_violation,
        };

        self.manifests.store(&self.stage_dir, &manifest).await?;
        Ok(manifest)
    }
}

/// True if `rel` would resolve outside the directory it is declared
/// relative to: an absolute path, or one containing a `..` component.
fn escapes_containing_directory(rel: &str) -> bool {
    let path = Path::new(rel);
    path.is_absolute() || path.components().any(|c| matches!(c, std::path::Component::ParentDir))
}

async fn snapshot_foreign(job_dir: &Path, stage_dir: &Path) -> Result<ForeignSnapshot, PipelineError> {
    let job_dir = job_dir.to_path_buf();
    let stage_dir = stage_dir.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<ForeignSnapshot, PipelineError> {
        let mut snapshot = ForeignSnapshot::new();
        walk(&job_dir, &stage_dir, &mut snapshot)?;
        Ok(snapshot)
    })
    .await
    .map_err(|err| PipelineError::IoError(format!("containment scan panicked: {err}")))?
}

fn walk(dir: &Path, excluded: &Path, out: &mut ForeignSnapshot) -> Result<(), PipelineError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(PipelineError::IoError(format!("reading {}: {err}", dir.display()))),
    };

    for entry in entries {
        let entry = entry.map_err(|err| PipelineError::IoError(format!("reading {}: {err}", dir.display())))?;
        let path = entry.path();
        if path == excluded {
            continue;
        }

        let metadata = entry
            .metadata()
            .map_err(|err| PipelineError::IoError(format!("stat {}: {err}", path.display())))?;

        if metadata.is_dir() {
            walk(&path, excluded, out)?;
        } else {
            let mtime = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            out.insert(path, (metadata.len(), mtime));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{JsonManifestStore, Sha256ContentHasher};
    use media_pipeline_domain::value_objects::{StageIndex, StageKind};
    use tempfile::tempdir;

    fn spec() -> StageSpec {
        StageSpec {
            index: StageIndex::new(1),
            name: "demux".into(),
            kind: StageKind::NativeSubprocess,
            declared_inputs: vec![],
            declared_outputs: vec!["audio.wav".into()],
            required_for_workflow: vec![],
            optional: false,
            timeout_seconds: 0,
            version: "v1".into(),
            environment_keys: vec![],
        }
    }

    fn context_deps() -> (Arc<dyn ContentHasher>, Arc<dyn ManifestRepository>) {
        (Arc::new(Sha256ContentHasher::new()), Arc::new(JsonManifestStore::new()))
    }

    #[tokio::test]
    async fn open_creates_stage_directory_and_log() {
        let dir = tempdir().unwrap();
        let (hasher, manifests) = context_deps();
        let ctx = StageIoContext::open(hasher, manifests, dir.path().to_path_buf(), &spec())
            .await
            .unwrap();
        assert!(ctx.stage_dir().ends_with("01_demux"));
        assert!(ctx.log_path().exists());
    }

    #[tokio::test]
    async fn add_output_outside_stage_dir_is_containment_violation() {
        let dir = tempdir().unwrap();
        let (hasher, manifests) = context_deps();
        let mut ctx = StageIoContext::open(hasher, manifests, dir.path().to_path_buf(), &spec())
            .await
            .unwrap();

        let err = ctx.add_output("../escaped.txt", None).await.unwrap_err();
        assert!(matches!(err, PipelineError::StageContainmentViolation { .. }));
        assert!(ctx.containment_violation());
    }

    #[tokio::test]
    async fn add_output_hashes_a_produced_file() {
        let dir = tempdir().unwrap();
        let (hasher, manifests) = context_deps();
        let mut ctx = StageIoContext::open(hasher, manifests, dir.path().to_path_buf(), &spec())
            .await
            .unwrap();

        tokio::fs::write(ctx.stage_dir().join("audio.wav"), b"pcm-data").await.unwrap();
        ctx.add_output("audio.wav", None).await.unwrap();
        assert_eq!(ctx.outputs().len(), 1);
        assert_eq!(ctx.outputs()[0].path, "audio.wav");
    }

    #[tokio::test]
    async fn check_containment_flags_files_written_outside_stage_dir() {
        let dir = tempdir().unwrap();
        let (hasher, manifests) = context_deps();
        let mut ctx = StageIoContext::open(hasher, manifests, dir.path().to_path_buf(), &spec())
            .await
            .unwrap();

        tokio::fs::write(dir.path().join("rogue.txt"), b"oops").await.unwrap();
        ctx.check_containment().await.unwrap();
        assert!(ctx.containment_violation());
    }

    #[tokio::test]
    async fn finish_writes_a_manifest_with_derived_duration() {
        let dir = tempdir().unwrap();
        let (hasher, manifests) = context_deps();
        let ctx = StageIoContext::open(hasher, manifests.clone(), dir.path().to_path_buf(), &spec())
            .await
            .unwrap();
        let stage_dir = ctx.stage_dir().to_path_buf();

        let manifest = ctx.finish(0, None).await.unwrap();
        assert_eq!(manifest.exit_code, 0);
        assert!(manifest.duration_seconds >= 0.0);

        let reloaded = manifests.load(&stage_dir).await.unwrap().unwrap();
        assert_eq!(reloaded.stage_name, "demux");
    }
}
