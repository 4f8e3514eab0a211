//! Supervised execution of the external transcoder.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use pcut_models::EncodingConfig;

use crate::command::{FfmpegCommand, ProcessRunner};
use crate::error::{MediaError, MediaResult};
use crate::graph::{FilterGraph, AUDIO_OUT_LABEL, VIDEO_OUT_LABEL};

/// Upper bound on the diagnostic excerpt stored with a failure.
pub const DIAGNOSTICS_EXCERPT_LEN: usize = 2000;

/// Everything needed for one transcode run. Ephemeral, never persisted.
#[derive(Debug, Clone)]
pub struct TranscodeRequest {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub graph: FilterGraph,
    pub encoding: EncodingConfig,
}

/// Runs the external transcoder as a supervised child process.
#[derive(Clone)]
pub struct Transcoder {
    runner: Arc<dyn ProcessRunner>,
    program: String,
}

impl Transcoder {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            runner,
            program: "ffmpeg".to_string(),
        }
    }

    /// Override the transcoder binary name or path.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Run one transcode. No retries: a failure is terminal for the run.
    ///
    /// The input must exist and be non-empty before the child is spawned,
    /// and the output must exist and be non-empty after it exits cleanly.
    pub async fn transcode(&self, req: &TranscodeRequest) -> MediaResult<()> {
        ensure_non_empty(&req.input_path, MediaError::EmptyInput).await?;

        let args = FfmpegCommand::new(&req.input_path, &req.output_path)
            .filter_complex(req.graph.filter_complex())
            .map(VIDEO_OUT_LABEL)
            .map(AUDIO_OUT_LABEL)
            .output_args(req.encoding.to_output_args())
            .build_args();

        info!(
            input = %req.input_path.display(),
            output = %req.output_path.display(),
            segments = req.graph.segment_count(),
            crf = req.encoding.crf,
            "starting transcode"
        );

        let outcome = self.runner.run(&self.program, &args).await?;
        if !outcome.success {
            return Err(MediaError::TranscodeFailed {
                exit_code: outcome.exit_code,
                diagnostics: excerpt(&outcome.diagnostics),
            });
        }

        ensure_non_empty(&req.output_path, MediaError::EmptyOutput).await?;
        Ok(())
    }
}

/// Truncate diagnostics to a bounded excerpt, keeping the leading context.
fn excerpt(diagnostics: &str) -> String {
    let mut end = DIAGNOSTICS_EXCERPT_LEN.min(diagnostics.len());
    while !diagnostics.is_char_boundary(end) {
        end -= 1;
    }
    diagnostics[..end].to_string()
}

async fn ensure_non_empty(
    path: &Path,
    make_err: fn(PathBuf) -> MediaError,
) -> MediaResult<()> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.len() > 0 => Ok(()),
        _ => Err(make_err(path.to_path_buf())),
    }
}
