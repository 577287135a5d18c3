use engine_logging::{engine_debug, engine_info, engine_warn};
use postgrab_core::PostResultKind;
use postgrab_engine::{EngineEvent, ProgressSink};

/// Reports engine progress through the logger.
pub struct LogSink;

impl ProgressSink for LogSink {
    fn emit(&self, event: EngineEvent) {
        match event {
            EngineEvent::PageFetched { page, added, total } => {
                engine_info!("Page {}: {} new posts, {} collected", page, added, total);
            }
            EngineEvent::PaginationStalled { stalls, threshold } => {
                engine_warn!("No new posts on this page ({}/{})", stalls, threshold);
            }
            EngineEvent::PaginationFinished { total, reason } => {
                engine_info!("Collected {} posts ({})", total, reason);
            }
            EngineEvent::PostStarted {
                index,
                total,
                permalink,
            } => {
                engine_info!("[{}/{}] {}", index, total, permalink);
            }
            EngineEvent::PostProgress { index, stage } => {
                engine_debug!("[{}] {:?}", index, stage);
            }
            EngineEvent::ImageSaved {
                index,
                image,
                count,
                path,
            } => {
                engine_info!("[{}] Image {}/{} saved to {}", index, image, count, path.display());
            }
            EngineEvent::ImageFailed {
                index,
                image,
                count,
                reason,
            } => {
                engine_warn!("[{}] Image {}/{} failed: {}", index, image, count, reason);
            }
            EngineEvent::PostCompleted { index, result } => match result {
                PostResultKind::Saved => engine_info!("[{}] Saved", index),
                PostResultKind::Skipped => engine_info!("[{}] No media, skipped", index),
                PostResultKind::Failed => engine_warn!("[{}] Failed", index),
            },
        }
    }
}
