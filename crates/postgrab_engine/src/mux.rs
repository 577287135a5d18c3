//! Combining a downloaded video stream with an optional audio stream.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

use engine_logging::engine_debug;
use thiserror::Error;
use tokio::process::Command;

/// Paths for one mux run. All of them live inside the job's working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuxRequest {
    pub video: PathBuf,
    pub audio: Option<PathBuf>,
    pub output: PathBuf,
}

#[derive(Debug, Error)]
pub enum MuxError {
    #[error("ffmpeg not found: {0}")]
    BinaryNotFound(String),
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("muxer exited with {status:?}: {stderr}")]
    Failed { status: Option<i32>, stderr: String },
}

#[async_trait::async_trait]
pub trait Muxer: Send + Sync {
    /// Writes `request.output`, replacing whatever is there.
    async fn mux(&self, request: &MuxRequest) -> Result<(), MuxError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuxSettings {
    /// Explicit ffmpeg binary; `None` searches `PATH`.
    pub ffmpeg_path: Option<PathBuf>,
    pub video_codec: String,
    pub audio_codec: String,
}

impl Default for MuxSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
        }
    }
}

/// Runs the external `ffmpeg` binary.
#[derive(Debug, Clone)]
pub struct FfmpegMuxer {
    binary: PathBuf,
    video_codec: String,
    audio_codec: String,
}

impl FfmpegMuxer {
    pub fn new(binary: PathBuf, settings: &MuxSettings) -> Self {
        Self {
            binary,
            video_codec: settings.video_codec.clone(),
            audio_codec: settings.audio_codec.clone(),
        }
    }

    /// Uses the configured binary, or finds `ffmpeg` on `PATH`.
    pub fn from_settings(settings: &MuxSettings) -> Result<Self, MuxError> {
        let binary = match &settings.ffmpeg_path {
            Some(path) => path.clone(),
            None => which::which("ffmpeg").map_err(|err| MuxError::BinaryNotFound(err.to_string()))?,
        };
        Ok(Self::new(binary, settings))
    }

    fn args(&self, request: &MuxRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-y", "-hide_banner", "-loglevel", "error", "-i"]
            .iter()
            .map(OsString::from)
            .collect();
        args.push(request.video.clone().into_os_string());
        if let Some(audio) = &request.audio {
            args.push("-i".into());
            args.push(audio.clone().into_os_string());
        }
        args.extend(["-map", "0:v:0"].map(OsString::from));
        if request.audio.is_some() {
            args.extend(["-map", "1:a:0", "-c:a"].map(OsString::from));
            args.push(self.audio_codec.clone().into());
        }
        args.push("-c:v".into());
        args.push(self.video_codec.clone().into());
        args.extend(["-movflags", "+faststart"].map(OsString::from));
        args.push(request.output.clone().into_os_string());
        args
    }
}

#[async_trait::async_trait]
impl Muxer for FfmpegMuxer {
    async fn mux(&self, request: &MuxRequest) -> Result<(), MuxError> {
        let args = self.args(request);
        engine_debug!("{} {:?}", self.binary.display(), args);

        let output = Command::new(&self.binary)
            .args(&args)
            .output()
            .await
            .map_err(|source| MuxError::Spawn {
                program: self.binary.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(MuxError::Failed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}
