#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, Once};

use postgrab_engine::{
    EngineEvent, FailureKind, FetchError, FetchMetadata, FetchOutput, Fetcher, MuxError,
    MuxRequest, Muxer, ProgressSink,
};
use serde_json::Value;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

#[derive(Default)]
pub struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// In-memory fetcher: unknown URLs answer 404.
#[derive(Default)]
pub struct ScriptedFetcher {
    responses: Mutex<HashMap<String, Result<Vec<u8>, FailureKind>>>,
    requested: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bytes(self, url: &str, bytes: &[u8]) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Ok(bytes.to_vec()));
        self
    }

    pub fn with_json(self, url: &str, document: Value) -> Self {
        let bytes = serde_json::to_vec(&document).unwrap();
        self.with_bytes(url, &bytes)
    }

    pub fn with_failure(self, url: &str, kind: FailureKind) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Err(kind));
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        self.requested.lock().unwrap().push(url.to_string());
        let response = self
            .responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or(Err(FailureKind::HttpStatus(404)));
        match response {
            Ok(bytes) => Ok(FetchOutput {
                metadata: FetchMetadata {
                    original_url: url.to_string(),
                    final_url: url.to_string(),
                    redirect_count: 0,
                    content_type: None,
                    byte_len: bytes.len() as u64,
                },
                bytes,
            }),
            Err(kind) => Err(FetchError::new(kind, url)),
        }
    }
}

/// Stands in for ffmpeg: the output is the video bytes, followed by `+audio`
/// bytes when an audio track was attached.
#[derive(Default)]
pub struct FakeMuxer {
    pub reject_audio: bool,
    calls: Mutex<Vec<MuxRequest>>,
}

impl FakeMuxer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting_audio() -> Self {
        Self {
            reject_audio: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<MuxRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Muxer for FakeMuxer {
    async fn mux(&self, request: &MuxRequest) -> Result<(), MuxError> {
        self.calls.lock().unwrap().push(request.clone());
        let mut content = std::fs::read(&request.video).map_err(|err| MuxError::Failed {
            status: None,
            stderr: err.to_string(),
        })?;
        if let Some(audio) = &request.audio {
            if self.reject_audio {
                return Err(MuxError::Failed {
                    status: Some(1),
                    stderr: "invalid audio stream".into(),
                });
            }
            content.push(b'+');
            content.extend(std::fs::read(audio).unwrap_or_default());
        }
        std::fs::write(&request.output, content).map_err(|err| MuxError::Failed {
            status: None,
            stderr: err.to_string(),
        })
    }
}

/// Names of the entries directly inside `dir`, sorted.
pub fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
