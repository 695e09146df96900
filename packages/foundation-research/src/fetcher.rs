//! Retried, timeout-bounded page retrieval.
//!
//! [`HttpFetcher`] performs single attempts over reqwest; [`Fetcher`] layers
//! the retry policy on top of any [`PageFetcher`], so the policy is testable
//! against `MockFetcher`.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ResearchConfig;
use crate::error::{FetchError, FetchResult, ResearchError, Result};
use crate::research_log::{LogStage, ResearchLog};
use crate::traits::{FetchedPage, PageFetcher};

/// Browser-like User-Agent; many sites reject obvious bots.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// reqwest-backed fetcher using browser-like headers.
pub struct HttpFetcher {
    client: reqwest::Client,
    probe_timeout: Duration,
}

impl HttpFetcher {
    pub fn new(config: &ResearchConfig) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("en-US,en;q=0.5"),
        );
        headers.insert(
            reqwest::header::CONNECTION,
            reqwest::header::HeaderValue::from_static("keep-alive"),
        );

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| ResearchError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            probe_timeout: config.probe_timeout,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get(&self, url: &str) -> FetchResult<FetchedPage> {
        let parsed = url::Url::parse(url).map_err(|_| FetchError::InvalidUrl {
            url: url.to_string(),
        })?;

        let response = self.client.get(parsed).send().await?;

        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let html = response.text().await?;

        Ok(FetchedPage {
            html,
            final_url,
            status: status.as_u16(),
        })
    }

    async fn exists(&self, url: &str) -> bool {
        let result = self
            .client
            .head(url)
            .timeout(self.probe_timeout)
            .send()
            .await;

        match result {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(url = %url, error = %e, "Existence probe failed");
                false
            }
        }
    }
}

/// Result of a retried fetch. Always produced; failures are data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub url: String,
    pub final_url: String,
    pub html: Option<String>,
    pub error: Option<String>,
    pub attempts: u32,
}

impl FetchOutcome {
    pub fn success(&self) -> bool {
        self.html.is_some()
    }

    /// Page body and final URL, when the fetch succeeded.
    pub fn into_page(self) -> Option<(String, String)> {
        let final_url = self.final_url;
        self.html.map(|html| (html, final_url))
    }
}

/// Retry policy over a [`PageFetcher`].
#[derive(Clone)]
pub struct Fetcher {
    inner: Arc<dyn PageFetcher>,
    retry_base_delay: Duration,
}

impl Fetcher {
    pub fn new(inner: Arc<dyn PageFetcher>, retry_base_delay: Duration) -> Self {
        Self {
            inner,
            retry_base_delay,
        }
    }

    /// Fetch `url`, retrying up to `max_retries` extra times with a linear
    /// delay of `attempt * retry_base_delay`.
    pub async fn fetch(&self, url: &str, max_retries: u32, log: &mut ResearchLog) -> FetchOutcome {
        let mut last_error: Option<String> = None;

        for attempt in 0..=max_retries {
            if attempt > 0 {
                log.record(LogStage::Fetch, format!("Retry attempt {} for {}", attempt, url));
                let delay = self.retry_base_delay * attempt;
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }

            match self.inner.get(url).await {
                Ok(page) => {
                    log.record_with(
                        LogStage::Fetch,
                        format!("Success: {}", url),
                        json!({ "status": page.status }),
                    );
                    return FetchOutcome {
                        url: url.to_string(),
                        final_url: page.final_url,
                        html: Some(page.html),
                        error: None,
                        attempts: attempt + 1,
                    };
                }
                Err(e) => {
                    warn!(url = %url, attempt = attempt, error = %e, "Fetch attempt failed");
                    log.record_with(
                        LogStage::Fetch,
                        format!("Failed attempt {}: {}", attempt, url),
                        json!({ "error": e.to_string() }),
                    );
                    last_error = Some(e.to_string());
                }
            }
        }

        FetchOutcome {
            url: url.to_string(),
            final_url: url.to_string(),
            html: None,
            error: last_error,
            attempts: max_retries + 1,
        }
    }

    pub async fn exists(&self, url: &str) -> bool {
        self.inner.exists(url).await
    }

    /// Probe `base + path` for each path in order, stopping after `limit` hits.
    pub async fn find_existing(&self, base: &str, paths: &[&str], limit: usize) -> Vec<String> {
        let base = base.trim_end_matches('/');
        let mut found = Vec::new();

        for path in paths {
            if found.len() >= limit {
                break;
            }
            let candidate = format!("{}{}", base, path);
            if self.exists(&candidate).await {
                found.push(candidate);
            }
        }

        found
    }
}
