use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};

use crate::filename::{sanitize_filename, truncate_on_char_boundary, MAX_FILENAME_BYTES};
use crate::persist::AtomicFileWriter;
use crate::{EngineEvent, Fetcher, PostIndex, ProgressSink};

/// Per-image results of one image set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageSetReport {
    pub saved: Vec<PathBuf>,
    pub failed: usize,
}

impl ImageSetReport {
    pub fn all_failed(&self) -> bool {
        self.saved.is_empty() && self.failed > 0
    }
}

/// Downloads the images of a post one after the other, as `<title>_<n>.jpg`.
pub struct ImageSetWriter {
    fetcher: Arc<dyn Fetcher>,
    image_delay: Duration,
}

impl ImageSetWriter {
    pub fn new(fetcher: Arc<dyn Fetcher>, image_delay: Duration) -> Self {
        Self {
            fetcher,
            image_delay,
        }
    }

    pub async fn write_all(
        &self,
        post: PostIndex,
        urls: &[String],
        dir: &Path,
        title: &str,
        sink: &dyn ProgressSink,
    ) -> ImageSetReport {
        let writer = AtomicFileWriter::new(dir.to_path_buf());
        let count = urls.len();
        let mut report = ImageSetReport::default();

        for (position, url) in urls.iter().enumerate() {
            let image = position + 1;
            if position > 0 && !self.image_delay.is_zero() {
                tokio::time::sleep(self.image_delay).await;
            }

            let filename = image_filename(title, image);
            let written = match self.fetcher.fetch(url).await {
                Ok(output) => writer
                    .write(&filename, &output.bytes)
                    .map_err(|err| err.to_string()),
                Err(err) => Err(err.to_string()),
            };

            match written {
                Ok(path) => {
                    engine_info!("Image {} of {} downloaded successfully.", image, count);
                    sink.emit(EngineEvent::ImageSaved {
                        index: post,
                        image,
                        count,
                        path: path.clone(),
                    });
                    report.saved.push(path);
                }
                Err(reason) => {
                    engine_warn!("{} failed to download: {}", filename, reason);
                    sink.emit(EngineEvent::ImageFailed {
                        index: post,
                        image,
                        count,
                        reason,
                    });
                    report.failed += 1;
                }
            }
        }
        report
    }
}

/// `<title>_<n>.jpg`; a long title is shortened so the index survives.
fn image_filename(title: &str, image: usize) -> String {
    let suffix = format!("_{image}.jpg");
    let title = truncate_on_char_boundary(title, MAX_FILENAME_BYTES - suffix.len());
    sanitize_filename(&format!("{title}{suffix}"))
}
