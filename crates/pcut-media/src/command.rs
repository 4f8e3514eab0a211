//! FFmpeg command construction and process supervision.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Builder for FFmpeg invocations.
///
/// Arguments before `-i` are fixed (`-y -v error`); everything added through
/// the builder lands between the input and the output path.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    input: PathBuf,
    output: PathBuf,
    output_args: Vec<String>,
}

impl FfmpegCommand {
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
        }
    }

    /// Add a single output argument.
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the filter-complex expression.
    pub fn filter_complex(self, filter: impl Into<String>) -> Self {
        self.output_arg("-filter_complex").output_arg(filter)
    }

    /// Map a labeled stream into the output.
    pub fn map(self, label: impl Into<String>) -> Self {
        self.output_arg("-map").output_arg(label)
    }

    /// Build the full argument vector.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-v".to_string(),
            "error".to_string(),
            "-i".to_string(),
            self.input.to_string_lossy().to_string(),
        ];
        args.extend(self.output_args.iter().cloned());
        args.push(self.output.to_string_lossy().to_string());
        args
    }
}

/// Outcome of a supervised child process.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub exit_code: Option<i32>,
    pub success: bool,
    /// Diagnostic stream (FFmpeg writes diagnostics to stderr).
    pub diagnostics: String,
}

/// Capability interface for spawning the external transcoder.
///
/// Tests substitute a fake runner so no real binary is invoked.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> std::io::Result<ProcessOutput>;
}

/// Runner that spawns real child processes via tokio, waiting for exit
/// without blocking the runtime.
#[derive(Debug, Default, Clone)]
pub struct SystemRunner;

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[String]) -> std::io::Result<ProcessOutput> {
        debug!("running: {} {}", program, args.join(" "));

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        Ok(ProcessOutput {
            exit_code: output.status.code(),
            success: output.status.success(),
            diagnostics: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Check that FFmpeg is available on PATH.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_args_order() {
        let args = FfmpegCommand::new("/tmp/in.mp4", "/tmp/out.mp4")
            .filter_complex("[0:v]null[v]")
            .map("[v]")
            .output_args(["-c:v", "libx264"])
            .build_args();

        assert_eq!(
            args,
            vec![
                "-y",
                "-v",
                "error",
                "-i",
                "/tmp/in.mp4",
                "-filter_complex",
                "[0:v]null[v]",
                "-map",
                "[v]",
                "-c:v",
                "libx264",
                "/tmp/out.mp4",
            ]
        );
    }

    #[test]
    fn output_path_is_last() {
        let args = FfmpegCommand::new("a.mp4", "b.webm").build_args();
        assert_eq!(args.last().unwrap(), "b.webm");
    }

    #[tokio::test]
    async fn system_runner_reports_failure() {
        // `false` exits non-zero on any unix; skip if unavailable.
        if which::which("false").is_err() {
            return;
        }
        let outcome = SystemRunner.run("false", &[]).await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.exit_code, Some(1));
    }

    #[tokio::test]
    async fn system_runner_surfaces_spawn_errors() {
        let result = SystemRunner
            .run("definitely-not-a-real-binary-9f2c", &[])
            .await;
        assert!(result.is_err());
    }
}
