use std::time::Duration;

/// Rate-limit courtesy settings shared by the paginator and the post orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingConfig {
    /// Zero-progress pages tolerated before pagination gives up.
    pub stall_threshold: u32,
    /// Pause between two listing pages.
    pub page_delay: Duration,
    /// Pause between two image downloads of the same post.
    pub image_delay: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            stall_threshold: 5,
            page_delay: Duration::from_secs(5),
            image_delay: Duration::from_millis(500),
        }
    }
}

impl PacingConfig {
    /// No pauses at all; the stall threshold is kept.
    pub fn without_delays(self) -> Self {
        Self {
            page_delay: Duration::ZERO,
            image_delay: Duration::ZERO,
            ..self
        }
    }
}
