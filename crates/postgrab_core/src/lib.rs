//! Postgrab core: pure listing, post and media logic with no IO.
mod links;
mod listing;
mod media;
mod pacing;
mod post;
mod report;
mod tree;

pub use links::{is_valid_post_link, parse_link_list, LinkListError};
pub use listing::{
    Category, ListingPage, ListingRequest, ListingState, PageOutcome, PageStep, StopReason,
    TimeRange,
};
pub use media::{derive_audio_url, locate, unescape_url, MediaPlan};
pub use pacing::PacingConfig;
pub use post::{post_from_document, post_json_url, Permalink, PermalinkError, PostRecord};
pub use report::{BatchReport, PostResultKind};
pub use tree::{find_first, find_key, find_str};
