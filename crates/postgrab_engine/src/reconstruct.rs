use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use engine_logging::{engine_debug, engine_info, engine_warn};
use tempfile::{Builder, TempDir, TempPath};
use thiserror::Error;

use crate::mux::{MuxError, MuxRequest, Muxer};
use crate::persist::{ensure_output_dir, persist_without_clobber, PersistError};
use crate::{FetchError, Fetcher};

const VIDEO_FILE: &str = "video.mp4";
const AUDIO_FILE: &str = "audio.mp4";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconstructOutcome {
    /// Video with its audio track attached.
    Muxed(PathBuf),
    /// Audio was missing or unusable; the file holds the video alone.
    VideoOnly(PathBuf),
}

impl ReconstructOutcome {
    pub fn path(&self) -> &Path {
        match self {
            ReconstructOutcome::Muxed(path) | ReconstructOutcome::VideoOnly(path) => path,
        }
    }

    pub fn has_audio(&self) -> bool {
        matches!(self, ReconstructOutcome::Muxed(_))
    }
}

#[derive(Debug, Error)]
pub enum ReconstructError {
    #[error("destination {0} has no parent directory")]
    Destination(PathBuf),
    #[error("failed to fetch media: {0}")]
    Fetch(#[from] FetchError),
    #[error("failed to mux: {0}")]
    Mux(#[from] MuxError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Working directory of one reconstruction. Removed when dropped, whatever the outcome.
struct ReconstructionJob {
    dir: TempDir,
}

impl ReconstructionJob {
    /// Created next to the destination so the final move stays on one filesystem.
    fn new_in(parent: &Path) -> io::Result<Self> {
        let dir = Builder::new().prefix(".postgrab-").tempdir_in(parent)?;
        Ok(Self { dir })
    }

    async fn materialize(
        &self,
        fetcher: &dyn Fetcher,
        url: &str,
        name: &str,
    ) -> Result<PathBuf, ReconstructError> {
        let path = self.dir.path().join(name);
        let written = fetcher.download_to(url, &path).await?;
        engine_debug!("Stored {} bytes from {} as {}", written, url, name);
        Ok(path)
    }

    fn output_path(&self) -> io::Result<TempPath> {
        let file = Builder::new()
            .prefix("muxed-")
            .suffix(".mp4")
            .tempfile_in(self.dir.path())?;
        Ok(file.into_temp_path())
    }
}

/// Produces one playable file from a video stream and an optional audio stream.
pub struct MediaReconstructor {
    fetcher: Arc<dyn Fetcher>,
    muxer: Arc<dyn Muxer>,
}

impl MediaReconstructor {
    pub fn new(fetcher: Arc<dyn Fetcher>, muxer: Arc<dyn Muxer>) -> Self {
        Self { fetcher, muxer }
    }

    /// Downloads, muxes and moves the result to `destination` (or a numbered
    /// sibling if that name is taken).
    ///
    /// Only video failures are errors. A missing or broken audio stream
    /// downgrades the result to [`ReconstructOutcome::VideoOnly`].
    pub async fn reconstruct(
        &self,
        video_url: &str,
        audio_url: Option<&str>,
        destination: &Path,
    ) -> Result<ReconstructOutcome, ReconstructError> {
        let parent = destination
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .ok_or_else(|| ReconstructError::Destination(destination.to_path_buf()))?;
        ensure_output_dir(parent)?;

        let job = ReconstructionJob::new_in(parent)?;
        let video = job
            .materialize(self.fetcher.as_ref(), video_url, VIDEO_FILE)
            .await?;

        let audio = match audio_url {
            Some(url) => match job.materialize(self.fetcher.as_ref(), url, AUDIO_FILE).await {
                Ok(path) => Some(path),
                Err(err) => {
                    engine_warn!("No audio for {}: {}", video_url, err);
                    None
                }
            },
            None => None,
        };

        let output = job.output_path()?;
        let mut request = MuxRequest {
            video,
            audio: audio.clone(),
            output: output.to_path_buf(),
        };
        let first_attempt = self.muxer.mux(&request).await;
        let has_audio = match first_attempt {
            Ok(()) => request.audio.is_some(),
            Err(err) if request.audio.is_some() => {
                engine_warn!("Muxing with audio failed, keeping video only: {}", err);
                request.audio = None;
                self.muxer.mux(&request).await?;
                false
            }
            Err(err) => return Err(err.into()),
        };

        let written = persist_without_clobber(output, destination)?;
        if let Some(audio) = audio {
            if let Err(err) = std::fs::remove_file(&audio) {
                engine_warn!("Could not remove {}: {}", audio.display(), err);
            }
        }
        engine_info!("Saved {}", written.display());

        Ok(if has_audio {
            ReconstructOutcome::Muxed(written)
        } else {
            ReconstructOutcome::VideoOnly(written)
        })
    }
}
