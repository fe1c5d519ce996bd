// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Standard Stage Catalog
//!
//! The concrete, built-in thirteen-row Stage Registry table (§4.6): the
//! one piece of the orchestrator that is genuinely static data rather than
//! derived logic. Every other domain service (workflow resolution,
//! fingerprinting, resume classification) is generic over whatever
//! [`StageSpec`]s it is handed; this module is where the actual pipeline,
//! demux through mux, is named.
//!
//! Declared input/output path templates are relative to `job_dir` and
//! reference a prior stage's directory by its `NN_name` form (§6.1).

use crate::entities::stage_spec::WorkflowRequirement as Req;
use crate::entities::StageSpec;
use crate::value_objects::{StageIndex, StageKind, Workflow};

const SUBTITLE: Workflow = Workflow::Subtitle;
const TRANSCRIBE: Workflow = Workflow::Transcribe;
const TRANSLATE: Workflow = Workflow::Translate;

fn stage(
    index: u32,
    name: &str,
    kind: StageKind,
    declared_inputs: &[&str],
    declared_outputs: &[&str],
    required_for_workflow: &[(Workflow, Req)],
    timeout_seconds: u64,
    environment_keys: &[&str],
) -> StageSpec {
    let optional = required_for_workflow
        .iter()
        .any(|(_, req)| matches!(req, Req::Optional));

    StageSpec {
        index: StageIndex::new(index),
        name: name.to_string(),
        kind,
        declared_inputs: declared_inputs.iter().map(|s| s.to_string()).collect(),
        declared_outputs: declared_outputs.iter().map(|s| s.to_string()).collect(),
        required_for_workflow: required_for_workflow.to_vec(),
        optional,
        timeout_seconds,
        version: "v1".to_string(),
        environment_keys: environment_keys.iter().map(|s| s.to_string()).collect(),
    }
}

/// The built-in pipeline: demux through mux, in the order and with the
/// workflow requirements the §4.6 decision table names.
pub fn standard_stages() -> Vec<StageSpec> {
    vec![
        stage(
            1,
            "demux",
            StageKind::NativeSubprocess,
            &[],
            &["audio.wav"],
            &[
                (SUBTITLE, Req::Required),
                (TRANSCRIBE, Req::Required),
                (TRANSLATE, Req::Required),
            ],
            300,
            &["demux.sample_rate_hz"],
        ),
        stage(
            2,
            "metadata_enrich",
            StageKind::PureFunction,
            &[],
            &["enrichment.json"],
            &[(SUBTITLE, Req::Required)],
            60,
            &["metadata_enrich.tmdb_api_key"],
        ),
        stage(
            3,
            "glossary_load",
            StageKind::PureFunction,
            &[],
            &["glossary.json"],
            &[
                (SUBTITLE, Req::Required),
                (TRANSCRIBE, Req::Optional),
                (TRANSLATE, Req::Required),
            ],
            30,
            &["glossary_load.glossary_path"],
        ),
        stage(
            4,
            "source_separation",
            StageKind::Container,
            &["01_demux/audio.wav"],
            &["vocals.wav"],
            &[
                (SUBTITLE, Req::Optional),
                (TRANSCRIBE, Req::Optional),
                (TRANSLATE, Req::Optional),
            ],
            900,
            &["source_separation.model"],
        ),
        stage(
            5,
            "voice_activity_detect",
            StageKind::NativeSubprocess,
            &["01_demux/audio.wav"],
            &["segments.json"],
            &[
                (SUBTITLE, Req::Required),
                (TRANSCRIBE, Req::Required),
                (TRANSLATE, Req::Required),
            ],
            180,
            &["vad.model", "vad.threshold"],
        ),
        stage(
            6,
            "speaker_diarize",
            StageKind::NativeSubprocess,
            &["01_demux/audio.wav", "05_voice_activity_detect/segments.json"],
            &["speakers.json"],
            &[(SUBTITLE, Req::Required), (TRANSLATE, Req::Optional)],
            900,
            &["diarize.model"],
        ),
        stage(
            7,
            "asr",
            StageKind::NativeSubprocess,
            &["01_demux/audio.wav", "05_voice_activity_detect/segments.json"],
            &["transcript.json"],
            &[
                (SUBTITLE, Req::Required),
                (TRANSCRIBE, Req::Required),
                (TRANSLATE, Req::Required),
            ],
            1800,
            &["asr.model", "asr.device", "asr.compute_type"],
        ),
        stage(
            8,
            "alignment",
            StageKind::NativeSubprocess,
            &["01_demux/audio.wav", "07_asr/transcript.json"],
            &["aligned.json"],
            &[
                (SUBTITLE, Req::Required),
                (TRANSCRIBE, Req::Required),
                (TRANSLATE, Req::Required),
            ],
            300,
            &["alignment.model"],
        ),
        stage(
            9,
            "lyrics_detect",
            StageKind::NativeSubprocess,
            &["08_alignment/aligned.json"],
            &["lyrics_flags.json"],
            &[(SUBTITLE, Req::Required)],
            120,
            &["lyrics_detect.model"],
        ),
        stage(
            10,
            "hallucination_remove",
            StageKind::NativeSubprocess,
            &["08_alignment/aligned.json", "09_lyrics_detect/lyrics_flags.json"],
            &["cleaned.json"],
            &[(SUBTITLE, Req::Required), (TRANSLATE, Req::Optional)],
            120,
            &["hallucination_remove.repetition_threshold"],
        ),
        stage(
            11,
            "translate",
            StageKind::Container,
            &["10_hallucination_remove/cleaned.json", "03_glossary_load/glossary.json"],
            &["translated.json"],
            &[(SUBTITLE, Req::Required), (TRANSLATE, Req::Required)],
            1800,
            &["translate.model", "translate.target_language"],
        ),
        stage(
            12,
            "subtitle_generate",
            StageKind::PureFunction,
            &["11_translate/translated.json"],
            &["subtitles.srt"],
            &[(SUBTITLE, Req::Required), (TRANSLATE, Req::Required)],
            60,
            &["subtitle_generate.max_line_length", "subtitle_generate.max_lines"],
        ),
        stage(
            13,
            "mux",
            StageKind::NativeSubprocess,
            &["12_subtitle_generate/subtitles.srt"],
            &["subtitled.mkv"],
            &[(SUBTITLE, Req::Required)],
            600,
            &["mux.container_format"],
        ),
    ]
}
