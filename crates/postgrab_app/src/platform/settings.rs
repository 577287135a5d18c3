//! Optional RON settings file layered over the engine defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use engine_logging::engine_info;
use postgrab_engine::EngineConfig;
use ron::extensions::Extensions;
use serde::Deserialize;

pub const DEFAULT_SETTINGS_FILE: &str = "postgrab.ron";

/// Every field is optional; absent ones keep the engine default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    pub api_base: Option<String>,
    pub user_agent: Option<String>,
    pub stall_threshold: Option<u32>,
    pub page_delay_ms: Option<u64>,
    pub image_delay_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub max_bytes: Option<u64>,
    pub ffmpeg_path: Option<PathBuf>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
}

impl FileSettings {
    pub fn parse(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .from_str(text)
    }

    pub fn apply(self, mut config: EngineConfig) -> EngineConfig {
        if let Some(api_base) = self.api_base {
            config.api_base = api_base;
        }
        if let Some(user_agent) = self.user_agent {
            config.fetch.user_agent = user_agent;
        }
        if let Some(threshold) = self.stall_threshold {
            config.pacing.stall_threshold = threshold;
        }
        if let Some(ms) = self.page_delay_ms {
            config.pacing.page_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = self.image_delay_ms {
            config.pacing.image_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = self.request_timeout_secs {
            config.fetch.request_timeout = Duration::from_secs(secs);
        }
        if let Some(max_bytes) = self.max_bytes {
            config.fetch.max_bytes = max_bytes;
        }
        if let Some(path) = self.ffmpeg_path {
            config.mux.ffmpeg_path = Some(path);
        }
        if let Some(codec) = self.video_codec {
            config.mux.video_codec = codec;
        }
        if let Some(codec) = self.audio_codec {
            config.mux.audio_codec = codec;
        }
        config
    }
}

/// Reads the settings file.
///
/// An explicit path must exist. Without one, `./postgrab.ron` is used when
/// present and defaults otherwise.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<FileSettings> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_SETTINGS_FILE);
            if !default.is_file() {
                return Ok(FileSettings::default());
            }
            default
        }
    };

    let text = fs::read_to_string(&path)
        .with_context(|| format!("cannot read settings file {}", path.display()))?;
    let settings = FileSettings::parse(&text)
        .with_context(|| format!("invalid settings file {}", path.display()))?;
    engine_info!("Loaded settings from {}", path.display());
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use postgrab_engine::EngineConfig;

    use super::{load, FileSettings};

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let settings = FileSettings::parse(
            r#"(
                stall_threshold: 2,
                page_delay_ms: 1500,
                user_agent: "custom/1.0",
            )"#,
        )
        .unwrap();
        let config = settings.apply(EngineConfig::default_with_output(PathBuf::from("out")));

        assert_eq!(config.pacing.stall_threshold, 2);
        assert_eq!(config.pacing.page_delay, Duration::from_millis(1500));
        assert_eq!(config.pacing.image_delay, Duration::from_millis(500));
        assert_eq!(config.fetch.user_agent, "custom/1.0");
        assert_eq!(config.mux.video_codec, "libx264");
        assert_eq!(config.output_root, PathBuf::from("out"));
    }

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(FileSettings::parse("()").unwrap(), FileSettings::default());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(FileSettings::parse("(stall_limit: 3)").is_err());
    }

    #[test]
    fn explicit_file_is_read_and_must_exist() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("custom.ron");
        std::fs::write(&path, r#"(ffmpeg_path: "/opt/ffmpeg", video_codec: "libx265")"#).unwrap();

        let settings = load(Some(&path)).unwrap();
        assert_eq!(settings.ffmpeg_path, Some(PathBuf::from("/opt/ffmpeg")));
        assert_eq!(settings.video_codec.as_deref(), Some("libx265"));

        assert!(load(Some(&temp.path().join("missing.ron"))).is_err());
    }
}
