use std::sync::Arc;

use engine_logging::{engine_error, engine_info, engine_warn};
use postgrab_core::{
    ListingPage, ListingRequest, ListingState, PacingConfig, PageStep, PostRecord, StopReason,
};

use crate::fetch::fetch_json;
use crate::{EngineEvent, Fetcher, ProgressSink};

/// Walks a cursor-paginated listing one page at a time.
pub struct Paginator {
    fetcher: Arc<dyn Fetcher>,
    api_base: String,
    pacing: PacingConfig,
}

impl Paginator {
    pub fn new(fetcher: Arc<dyn Fetcher>, api_base: impl Into<String>, pacing: PacingConfig) -> Self {
        Self {
            fetcher,
            api_base: api_base.into(),
            pacing,
        }
    }

    /// Collects posts until the limit, the end of the listing, too many
    /// fruitless pages or a fetch failure. Never fails: whatever was gathered
    /// is returned.
    pub async fn paginate(
        &self,
        request: &ListingRequest,
        sink: &dyn ProgressSink,
    ) -> Vec<PostRecord> {
        let mut state = ListingState::new(request.limit, &self.pacing);
        let mut cursor: Option<String> = None;

        let reason = loop {
            let url = match request.page_url(&self.api_base, cursor.as_deref()) {
                Ok(url) => url,
                Err(err) => {
                    engine_error!("Cannot build listing url for {:?}: {}", request.source, err);
                    break StopReason::TransportFailure;
                }
            };

            let document = match fetch_json(self.fetcher.as_ref(), url.as_str()).await {
                Ok(document) => document,
                Err(err) => {
                    engine_error!("Listing page {} failed: {}", url, err);
                    break StopReason::TransportFailure;
                }
            };

            let Some(page) = ListingPage::from_document(&document) else {
                break StopReason::EndOfData;
            };

            let outcome = state.apply_page(page);
            sink.emit(EngineEvent::PageFetched {
                page: state.pages(),
                added: outcome.added,
                total: outcome.total,
            });
            if let Some(stalls) = outcome.stalls {
                engine_warn!(
                    "Failed to find new posts: {}/{}",
                    stalls,
                    self.pacing.stall_threshold
                );
                sink.emit(EngineEvent::PaginationStalled {
                    stalls,
                    threshold: self.pacing.stall_threshold,
                });
            }

            match outcome.step {
                PageStep::Stop(reason) => break reason,
                PageStep::Continue { cursor: next } => {
                    engine_info!(
                        "Found {} new posts. Total: {}. Sleeping {:?}.",
                        outcome.added,
                        outcome.total,
                        self.pacing.page_delay
                    );
                    if !self.pacing.page_delay.is_zero() {
                        tokio::time::sleep(self.pacing.page_delay).await;
                    }
                    cursor = Some(next);
                }
            }
        };

        let posts = state.finish();
        engine_info!("{} posts found ({}).", posts.len(), reason);
        sink.emit(EngineEvent::PaginationFinished {
            total: posts.len(),
            reason,
        });
        posts
    }
}
