use std::fmt;
use std::path::PathBuf;

use postgrab_core::{PostResultKind, StopReason};

/// 1-based position of a post within the current batch.
pub type PostIndex = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Locating,
    Downloading,
    Muxing,
    Done,
}

/// Status messages emitted while a run progresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    PageFetched {
        page: u32,
        added: usize,
        total: usize,
    },
    PaginationStalled {
        stalls: u32,
        threshold: u32,
    },
    PaginationFinished {
        total: usize,
        reason: StopReason,
    },
    PostStarted {
        index: PostIndex,
        total: usize,
        permalink: String,
    },
    PostProgress {
        index: PostIndex,
        stage: Stage,
    },
    ImageSaved {
        index: PostIndex,
        image: usize,
        count: usize,
        path: PathBuf,
    },
    ImageFailed {
        index: PostIndex,
        image: usize,
        count: usize,
        reason: String,
    },
    PostCompleted {
        index: PostIndex,
        result: PostResultKind,
    },
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub redirect_count: usize,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
    Parse,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Parse => write!(f, "unparseable document"),
            FailureKind::Io => write!(f, "cannot write body"),
        }
    }
}
