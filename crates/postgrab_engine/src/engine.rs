use std::path::PathBuf;
use std::sync::Arc;

use engine_logging::engine_warn;
use postgrab_core::{BatchReport, ListingRequest};

use crate::config::EngineConfig;
use crate::fetch::{Fetcher, ReqwestFetcher};
use crate::images::ImageSetWriter;
use crate::mux::{FfmpegMuxer, Muxer};
use crate::orchestrator::PostOrchestrator;
use crate::paginate::Paginator;
use crate::reconstruct::MediaReconstructor;
use crate::ProgressSink;

/// Entry points for a download session. Everything runs sequentially.
pub struct Engine {
    paginator: Paginator,
    orchestrator: PostOrchestrator,
}

impl Engine {
    /// Production wiring: reqwest for HTTP, ffmpeg for muxing.
    ///
    /// A missing ffmpeg only fails video posts, so image downloads still work.
    pub fn new(config: EngineConfig) -> Self {
        let muxer = FfmpegMuxer::from_settings(&config.mux).unwrap_or_else(|err| {
            engine_warn!("{}; video posts will fail", err);
            FfmpegMuxer::new(PathBuf::from("ffmpeg"), &config.mux)
        });
        let fetcher = Arc::new(ReqwestFetcher::new(config.fetch.clone()));
        Self::with_parts(config, fetcher, Arc::new(muxer))
    }

    pub fn with_parts(config: EngineConfig, fetcher: Arc<dyn Fetcher>, muxer: Arc<dyn Muxer>) -> Self {
        let paginator = Paginator::new(fetcher.clone(), config.api_base.clone(), config.pacing);
        let reconstructor = MediaReconstructor::new(fetcher.clone(), muxer);
        let images = ImageSetWriter::new(fetcher.clone(), config.pacing.image_delay);
        let orchestrator =
            PostOrchestrator::new(fetcher, reconstructor, images, config.output_root);
        Self {
            paginator,
            orchestrator,
        }
    }

    /// Paginates the listing, then saves every post found.
    pub async fn download_listing(
        &self,
        request: &ListingRequest,
        sink: &dyn ProgressSink,
    ) -> BatchReport {
        let posts = self.paginator.paginate(request, sink).await;
        self.orchestrator.save_posts(&posts, sink).await
    }

    /// Saves the posts behind a list of permalinks.
    pub async fn download_links(&self, links: &[String], sink: &dyn ProgressSink) -> BatchReport {
        self.orchestrator.save_links(links, sink).await
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    pub fn orchestrator(&self) -> &PostOrchestrator {
        &self.orchestrator
    }
}
