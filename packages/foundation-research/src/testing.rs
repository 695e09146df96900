//! Mock page fetcher for testing.
//!
//! Provides a configurable implementation of [`PageFetcher`] with canned
//! pages, existence answers and injectable failures.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::error::{FetchError, FetchResult};
use crate::traits::{FetchedPage, PageFetcher};

/// Mock fetcher for testing.
///
/// URLs are compared without a trailing slash. A URL registered with a page
/// also answers `exists` with `true`.
///
/// # Example
///
/// ```rust
/// use foundation_research::testing::MockFetcher;
///
/// let mock = MockFetcher::new()
///     .with_page("https://acme.org", "<title>Acme</title>")
///     .with_existing("https://acme.org/foundation");
/// ```
#[derive(Default)]
pub struct MockFetcher {
    /// Canned HTML indexed by URL
    pages: Arc<RwLock<HashMap<String, String>>>,
    /// Final URL reported for a requested URL
    redirects: Arc<RwLock<HashMap<String, String>>>,
    /// URLs answering HEAD probes without a body
    existing: Arc<RwLock<HashSet<String>>>,
    /// Remaining forced failures per URL
    failures: Arc<RwLock<HashMap<String, u32>>>,
    get_calls: Arc<RwLock<Vec<String>>>,
    exists_calls: Arc<RwLock<Vec<String>>>,
}

fn key(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page returned by `get`.
    pub fn add_page(&self, url: &str, html: &str) {
        self.pages.write().unwrap().insert(key(url), html.to_string());
    }

    /// Register a URL that exists for probes.
    pub fn add_existing(&self, url: &str) {
        self.existing.write().unwrap().insert(key(url));
    }

    pub fn with_page(self, url: &str, html: &str) -> Self {
        self.add_page(url, html);
        self
    }

    pub fn with_existing(self, url: &str) -> Self {
        self.add_existing(url);
        self
    }

    /// Report `final_url` as the post-redirect URL for `url`.
    pub fn with_redirect(self, url: &str, final_url: &str) -> Self {
        self.redirects
            .write()
            .unwrap()
            .insert(key(url), final_url.to_string());
        self
    }

    /// Fail the first `times` GETs of `url` with a 503.
    pub fn failing_first(self, url: &str, times: u32) -> Self {
        self.failures.write().unwrap().insert(key(url), times);
        self
    }

    /// Number of GETs issued for `url`.
    pub fn get_call_count(&self, url: &str) -> usize {
        let wanted = key(url);
        self.get_calls
            .read()
            .unwrap()
            .iter()
            .filter(|u| **u == wanted)
            .count()
    }

    /// Every URL requested via `get`, in order.
    pub fn get_calls(&self) -> Vec<String> {
        self.get_calls.read().unwrap().clone()
    }

    /// Every URL probed via `exists`, in order.
    pub fn exists_calls(&self) -> Vec<String> {
        self.exists_calls.read().unwrap().clone()
    }
}

impl Clone for MockFetcher {
    fn clone(&self) -> Self {
        Self {
            pages: Arc::clone(&self.pages),
            redirects: Arc::clone(&self.redirects),
            existing: Arc::clone(&self.existing),
            failures: Arc::clone(&self.failures),
            get_calls: Arc::clone(&self.get_calls),
            exists_calls: Arc::clone(&self.exists_calls),
        }
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn get(&self, url: &str) -> FetchResult<FetchedPage> {
        let k = key(url);
        self.get_calls.write().unwrap().push(k.clone());

        {
            let mut failures = self.failures.write().unwrap();
            if let Some(remaining) = failures.get_mut(&k) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(FetchError::Status {
                        url: url.to_string(),
                        status: 503,
                    });
                }
            }
        }

        let pages = self.pages.read().unwrap();
        match pages.get(&k) {
            Some(html) => {
                let final_url = self
                    .redirects
                    .read()
                    .unwrap()
                    .get(&k)
                    .cloned()
                    .unwrap_or_else(|| url.to_string());
                Ok(FetchedPage {
                    html: html.clone(),
                    final_url,
                    status: 200,
                })
            }
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }

    async fn exists(&self, url: &str) -> bool {
        let k = key(url);
        self.exists_calls.write().unwrap().push(k.clone());
        self.existing.read().unwrap().contains(&k) || self.pages.read().unwrap().contains_key(&k)
    }
}
