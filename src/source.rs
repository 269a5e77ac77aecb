//! Where the per-device CSVs come from: a base URL or a local directory.
//!
//! Each load is independent. The HTTP source retries transient failures
//! with backoff; client errors such as 404 fail the load immediately.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::time::sleep;
use url::Url;

use crate::config::Config;
use crate::logging::{log, obj, v_str, Domain, Level};
use crate::retry::{is_retryable_http_status, is_retryable_network_error, RetryConfig};

#[async_trait]
pub trait SeriesSource: Send + Sync {
    /// Fetch the raw CSV body for a relative resource path.
    async fn fetch(&self, rel_path: &str) -> Result<String>;

    fn describe(&self) -> String;
}

/// Pick the source implementation from the configured base: anything that
/// parses as an http(s) URL goes over the network, everything else is a
/// local directory.
pub fn from_config(cfg: &Config) -> Box<dyn SeriesSource> {
    match Url::parse(&cfg.data_base) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Box::new(HttpSource::new(
            cfg.data_base.clone(),
            RetryConfig::from_config(cfg),
        )),
        _ => Box::new(FileSource::new(PathBuf::from(&cfg.data_base))),
    }
}

// =============================================================================
// HTTP source
// =============================================================================

enum FetchError {
    Transient(String),
    Fatal(String),
}

pub struct HttpSource {
    client: reqwest::Client,
    base: String,
    retry: RetryConfig,
}

impl HttpSource {
    pub fn new(base: String, retry: RetryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base,
            retry,
        }
    }

    fn url_for(&self, rel_path: &str) -> String {
        format!("{}/{}", self.base.trim_end_matches('/'), rel_path)
    }

    async fn try_once(&self, url: &str) -> Result<String, FetchError> {
        match self.client.get(url).send().await {
            Ok(resp) => {
                let status = resp.status().as_u16();
                if resp.status().is_success() {
                    resp.text()
                        .await
                        .map_err(|e| FetchError::Transient(format!("body read failed: {}", e)))
                } else if is_retryable_http_status(status) {
                    Err(FetchError::Transient(format!("http status {}", status)))
                } else {
                    Err(FetchError::Fatal(format!("http status {}", status)))
                }
            }
            Err(e) if is_retryable_network_error(&e) => {
                Err(FetchError::Transient(format!("network error: {}", e)))
            }
            Err(e) => Err(FetchError::Fatal(format!("request failed: {}", e))),
        }
    }
}

#[async_trait]
impl SeriesSource for HttpSource {
    async fn fetch(&self, rel_path: &str) -> Result<String> {
        let url = self.url_for(rel_path);
        let mut attempt = 0u32;
        loop {
            match self.try_once(&url).await {
                Ok(body) => return Ok(body),
                Err(FetchError::Fatal(reason)) => {
                    return Err(anyhow!("{}: {}", url, reason));
                }
                Err(FetchError::Transient(reason)) => {
                    if attempt >= self.retry.max_retries {
                        return Err(anyhow!(
                            "{}: {} (gave up after {} attempts)",
                            url,
                            reason,
                            attempt + 1
                        ));
                    }
                    let delay = self.retry.delay_for_attempt(attempt);
                    log(
                        Level::Debug,
                        Domain::Data,
                        "fetch_retry",
                        obj(&[
                            ("url", v_str(&url)),
                            ("reason", v_str(&reason)),
                            ("attempt", serde_json::json!(attempt + 1)),
                            ("delay_ms", serde_json::json!(delay.as_millis() as u64)),
                        ]),
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    fn describe(&self) -> String {
        format!("http:{}", self.base)
    }
}

// =============================================================================
// Filesystem source
// =============================================================================

pub struct FileSource {
    base: PathBuf,
}

impl FileSource {
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }
}

#[async_trait]
impl SeriesSource for FileSource {
    async fn fetch(&self, rel_path: &str) -> Result<String> {
        let path = self.base.join(rel_path);
        tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("cannot read {}", path.display()))
    }

    fn describe(&self) -> String {
        format!("file:{}", self.base.display())
    }
}
