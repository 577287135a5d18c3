use std::path::Path;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use engine_logging::engine_debug;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tokio::io::AsyncWriteExt;

use crate::{FailureKind, FetchError, FetchMetadata, FetchOutput};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    /// The listing API throttles anonymous default agents hard.
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            redirect_limit: 5,
            max_bytes: 512 * 1024 * 1024,
            user_agent: concat!("postgrab/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Resolves a URL to its body. Any failure is reported as a single [`FetchError`].
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError>;

    /// Writes the body to `path` and returns its length in bytes.
    ///
    /// The default goes through [`Fetcher::fetch`]; implementations that can
    /// stream should do so, since video bodies may not fit in memory.
    async fn download_to(&self, url: &str, path: &Path) -> Result<u64, FetchError> {
        let output = self.fetch(url).await?;
        tokio::fs::write(path, &output.bytes)
            .await
            .map_err(|err| io_error(path, err))?;
        Ok(output.metadata.byte_len)
    }
}

/// Fetches `url` and parses the body as a JSON document.
pub async fn fetch_json(fetcher: &dyn Fetcher, url: &str) -> Result<Value, FetchError> {
    let output = fetcher.fetch(url).await?;
    serde_json::from_slice(&output.bytes)
        .map_err(|err| FetchError::new(FailureKind::Parse, format!("{url}: {err}")))
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self, redirect_counter: Arc<AtomicUsize>) -> Result<reqwest::Client, FetchError> {
        let redirect_limit = self.settings.redirect_limit;
        let policy = reqwest::redirect::Policy::custom(move |attempt| {
            let count = attempt.previous().len();
            redirect_counter.store(count, Ordering::Relaxed);
            if count >= redirect_limit {
                attempt.error("redirect limit exceeded")
            } else {
                attempt.follow()
            }
        });

        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .user_agent(self.settings.user_agent.clone())
            .redirect(policy)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
    }

    fn too_large(&self, actual: u64) -> FetchError {
        FetchError::new(
            FailureKind::TooLarge {
                max_bytes: self.settings.max_bytes,
                actual: Some(actual),
            },
            "response too large",
        )
    }

    /// Sends the request and rejects non-success statuses.
    async fn send(&self, url: &str) -> Result<(reqwest::Response, Arc<AtomicUsize>), FetchError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let redirect_counter = Arc::new(AtomicUsize::new(0));
        let client = self.build_client(redirect_counter.clone())?;

        engine_debug!("GET {}", parsed);
        let response = client.get(parsed).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                format!("{url}: {status}"),
            ));
        }
        Ok((response, redirect_counter))
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        let (response, redirect_counter) = self.send(url).await?;

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(self.too_large(content_len));
            }
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(self.too_large(next_len));
            }
            bytes.extend_from_slice(&chunk);
        }

        let metadata = FetchMetadata {
            original_url: url.to_string(),
            final_url,
            redirect_count: redirect_counter.load(Ordering::Relaxed),
            content_type,
            byte_len: bytes.len() as u64,
        };

        Ok(FetchOutput { bytes, metadata })
    }

    /// Streams the body straight into `path`; `max_bytes` does not apply here.
    async fn download_to(&self, url: &str, path: &Path) -> Result<u64, FetchError> {
        let (response, _) = self.send(url).await?;
        let mut file = tokio::fs::File::create(path)
            .await
            .map_err(|err| io_error(path, err))?;

        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            file.write_all(&chunk)
                .await
                .map_err(|err| io_error(path, err))?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(|err| io_error(path, err))?;
        engine_debug!("Streamed {} bytes from {}", written, url);
        Ok(written)
    }
}

fn io_error(path: &Path, err: std::io::Error) -> FetchError {
    FetchError::new(FailureKind::Io, format!("{}: {err}", path.display()))
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
