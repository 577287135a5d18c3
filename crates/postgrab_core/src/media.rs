use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::tree::find_str;
use crate::PostRecord;

const FALLBACK_KEY: &str = "fallback_url";
const FALLBACK_MARKER: &str = "?source=fallback";
const VIDEO_EXTENSION: &str = ".mp4";
const AUDIO_SEGMENT: &str = "DASH_audio.mp4";

/// What a post carries and where to get it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaPlan {
    Video {
        video_url: String,
        audio_url: Option<String>,
    },
    ImageSet(Vec<String>),
    None,
}

impl MediaPlan {
    pub fn kind(&self) -> &'static str {
        match self {
            MediaPlan::Video { .. } => "video",
            MediaPlan::ImageSet(_) => "image set",
            MediaPlan::None => "none",
        }
    }
}

/// Classifies a post and resolves its media locations.
///
/// Video posts whose fallback URL cannot be found fall through to the image
/// lookup, the same path non-video posts take.
pub fn locate(post: &PostRecord) -> MediaPlan {
    if post.is_video() {
        if let Some(video_url) = fallback_video_url(post.data()) {
            let audio_url = derive_audio_url(&video_url);
            return MediaPlan::Video {
                video_url,
                audio_url,
            };
        }
    }

    match image_urls(post.data()) {
        Some(urls) if !urls.is_empty() => MediaPlan::ImageSet(urls),
        _ => MediaPlan::None,
    }
}

fn fallback_video_url(data: &Value) -> Option<String> {
    let url = find_str(data, FALLBACK_KEY)?.replace(FALLBACK_MARKER, "");
    url.to_ascii_lowercase()
        .ends_with(VIDEO_EXTENSION)
        .then_some(url)
}

/// Guesses the companion audio stream by swapping every `DASH_<quality>.mp4`
/// segment for the audio one. Best effort: the result may not exist.
pub fn derive_audio_url(video_url: &str) -> Option<String> {
    static SEGMENT: OnceLock<Option<Regex>> = OnceLock::new();
    let segment = SEGMENT
        .get_or_init(|| Regex::new(r"DASH_.*?\.mp4").ok())
        .as_ref()?;
    segment
        .is_match(video_url)
        .then(|| segment.replace_all(video_url, AUDIO_SEGMENT).into_owned())
}

fn image_urls(data: &Value) -> Option<Vec<String>> {
    // Galleries with no usable entry fall back to the preview.
    if let Some(metadata) = data.get("media_metadata").and_then(Value::as_object) {
        let urls: Vec<String> = metadata
            .values()
            .filter_map(|entry| entry.pointer("/s/u").and_then(Value::as_str))
            .map(unescape_url)
            .collect();
        if !urls.is_empty() {
            return Some(urls);
        }
    }

    let images = data.pointer("/preview/images").and_then(Value::as_array)?;
    Some(
        images
            .iter()
            .filter_map(|image| image.pointer("/source/url").and_then(Value::as_str))
            .map(unescape_url)
            .collect(),
    )
}

/// Listing payloads HTML-escape ampersands in media URLs.
pub fn unescape_url(url: &str) -> String {
    url.replace("&amp;", "&")
}
