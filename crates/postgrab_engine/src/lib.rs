//! Postgrab engine: fetching, pagination, media reconstruction and persistence.
mod config;
mod engine;
mod fetch;
mod filename;
mod images;
mod mux;
mod orchestrator;
mod paginate;
mod persist;
mod reconstruct;
mod types;

pub use config::{EngineConfig, DEFAULT_API_BASE};
pub use engine::Engine;
pub use fetch::{fetch_json, FetchSettings, Fetcher, ReqwestFetcher};
pub use filename::sanitize_filename;
pub use images::{ImageSetReport, ImageSetWriter};
pub use mux::{FfmpegMuxer, MuxError, MuxRequest, MuxSettings, Muxer};
pub use orchestrator::{PostError, PostOrchestrator, PostOutcome};
pub use paginate::Paginator;
pub use persist::{
    ensure_output_dir, numbered_path, persist_without_clobber, AtomicFileWriter, PersistError,
};
pub use reconstruct::{MediaReconstructor, ReconstructError, ReconstructOutcome};
pub use types::{
    EngineEvent, FailureKind, FetchError, FetchMetadata, FetchOutput, PostIndex, ProgressSink,
    Stage,
};
