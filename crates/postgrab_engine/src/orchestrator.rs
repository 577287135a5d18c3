use std::path::PathBuf;
use std::sync::Arc;

use engine_logging::{engine_debug, engine_error, engine_info};
use postgrab_core::{
    locate, post_from_document, post_json_url, BatchReport, MediaPlan, PermalinkError,
    PostRecord, PostResultKind,
};
use thiserror::Error;

use crate::fetch::fetch_json;
use crate::filename::sanitize_filename;
use crate::images::{ImageSetReport, ImageSetWriter};
use crate::persist::{ensure_output_dir, PersistError};
use crate::reconstruct::{MediaReconstructor, ReconstructError, ReconstructOutcome};
use crate::{EngineEvent, FailureKind, FetchError, Fetcher, PostIndex, ProgressSink, Stage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostOutcome {
    Video(ReconstructOutcome),
    Images(ImageSetReport),
    NoMedia,
}

impl PostOutcome {
    pub fn result_kind(&self) -> PostResultKind {
        match self {
            PostOutcome::Video(_) => PostResultKind::Saved,
            PostOutcome::Images(report) if report.all_failed() => PostResultKind::Failed,
            PostOutcome::Images(_) => PostResultKind::Saved,
            PostOutcome::NoMedia => PostResultKind::Skipped,
        }
    }
}

#[derive(Debug, Error)]
pub enum PostError {
    #[error(transparent)]
    Permalink(#[from] PermalinkError),
    #[error("cannot prepare output folder: {0}")]
    OutputDir(#[from] PersistError),
    #[error("video reconstruction failed: {0}")]
    Reconstruct(#[from] ReconstructError),
    #[error("cannot fetch post: {0}")]
    Fetch(#[from] FetchError),
}

/// Saves posts one by one, isolating each post's failure from the rest of the batch.
pub struct PostOrchestrator {
    fetcher: Arc<dyn Fetcher>,
    reconstructor: MediaReconstructor,
    images: ImageSetWriter,
    output_root: PathBuf,
}

impl PostOrchestrator {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        reconstructor: MediaReconstructor,
        images: ImageSetWriter,
        output_root: PathBuf,
    ) -> Self {
        Self {
            fetcher,
            reconstructor,
            images,
            output_root,
        }
    }

    /// `<root>/<collection>/<id>_<title>/`, then video or images depending on the post.
    pub async fn save_post(
        &self,
        index: PostIndex,
        post: &PostRecord,
        sink: &dyn ProgressSink,
    ) -> Result<PostOutcome, PostError> {
        let permalink = post.permalink()?;
        let dir = self
            .output_root
            .join(sanitize_filename(&permalink.collection))
            .join(sanitize_filename(&permalink.folder_name()));
        ensure_output_dir(&dir)?;

        sink.emit(EngineEvent::PostProgress {
            index,
            stage: Stage::Locating,
        });
        let plan = locate(post);
        engine_debug!("Post {} classified as {}", permalink.post_id, plan.kind());

        let outcome = match plan {
            MediaPlan::Video {
                video_url,
                audio_url,
            } => {
                sink.emit(EngineEvent::PostProgress {
                    index,
                    stage: Stage::Muxing,
                });
                let destination = dir.join(sanitize_filename(&format!("{}.mp4", permalink.title)));
                let result = self
                    .reconstructor
                    .reconstruct(&video_url, audio_url.as_deref(), &destination)
                    .await?;
                PostOutcome::Video(result)
            }
            MediaPlan::ImageSet(urls) => {
                sink.emit(EngineEvent::PostProgress {
                    index,
                    stage: Stage::Downloading,
                });
                let report = self
                    .images
                    .write_all(index, &urls, &dir, &permalink.title, sink)
                    .await;
                PostOutcome::Images(report)
            }
            MediaPlan::None => PostOutcome::NoMedia,
        };

        sink.emit(EngineEvent::PostProgress {
            index,
            stage: Stage::Done,
        });
        Ok(outcome)
    }

    /// Saves every post in order. Failures are logged and counted, never propagated.
    pub async fn save_posts(&self, posts: &[PostRecord], sink: &dyn ProgressSink) -> BatchReport {
        let mut report = BatchReport::default();
        for (position, post) in posts.iter().enumerate() {
            let index = position + 1;
            let permalink = post.permalink_str().unwrap_or("<no permalink>").to_string();
            engine_info!("Saving post {} out of {}: {}", index, posts.len(), permalink);
            sink.emit(EngineEvent::PostStarted {
                index,
                total: posts.len(),
                permalink: permalink.clone(),
            });

            let result = self.save_post(index, post, sink).await;
            let kind = self.record(index, &permalink, result, sink);
            report.record(kind);
        }
        report
    }

    /// Fetches the post behind a permalink.
    pub async fn fetch_post(&self, link: &str) -> Result<PostRecord, PostError> {
        let url = post_json_url(link);
        let document = fetch_json(self.fetcher.as_ref(), &url).await?;
        post_from_document(&document).ok_or_else(|| {
            FetchError::new(FailureKind::Parse, format!("{url}: no post in document")).into()
        })
    }

    /// Fetches and saves each link in order.
    pub async fn save_links(&self, links: &[String], sink: &dyn ProgressSink) -> BatchReport {
        let mut report = BatchReport::default();
        for (position, link) in links.iter().enumerate() {
            let index = position + 1;
            engine_info!("Saving post {} out of {}: {}", index, links.len(), link);
            sink.emit(EngineEvent::PostStarted {
                index,
                total: links.len(),
                permalink: link.clone(),
            });

            let result = match self.fetch_post(link).await {
                Ok(post) => self.save_post(index, &post, sink).await,
                Err(err) => Err(err),
            };
            let kind = self.record(index, link, result, sink);
            report.record(kind);
        }
        report
    }

    fn record(
        &self,
        index: PostIndex,
        permalink: &str,
        result: Result<PostOutcome, PostError>,
        sink: &dyn ProgressSink,
    ) -> PostResultKind {
        let kind = match result {
            Ok(outcome) => {
                match &outcome {
                    PostOutcome::Video(video) if !video.has_audio() => {
                        engine_info!("{} saved without audio", video.path().display())
                    }
                    PostOutcome::NoMedia => engine_info!("No media to save for {}", permalink),
                    _ => {}
                }
                outcome.result_kind()
            }
            Err(err) => {
                engine_error!("Failed to download {}: {}", permalink, err);
                PostResultKind::Failed
            }
        };
        sink.emit(EngineEvent::PostCompleted {
            index,
            result: kind,
        });
        kind
    }
}
