use std::path::PathBuf;

use postgrab_core::PacingConfig;

use crate::fetch::FetchSettings;
use crate::mux::MuxSettings;

pub const DEFAULT_API_BASE: &str = "https://www.reddit.com";

/// Everything the engine needs to run a download session.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub output_root: PathBuf,
    pub api_base: String,
    pub pacing: PacingConfig,
    pub fetch: FetchSettings,
    pub mux: MuxSettings,
}

impl EngineConfig {
    pub fn default_with_output(output_root: PathBuf) -> Self {
        Self {
            output_root,
            api_base: DEFAULT_API_BASE.to_string(),
            pacing: PacingConfig::default(),
            fetch: FetchSettings::default(),
            mux: MuxSettings::default(),
        }
    }
}
