use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ResearchError, Result};

/// Confidence constants assigned by each resolution strategy and by the
/// report-level aggregator.
///
/// Every value is an integer in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    /// Organization page title itself names a foundation
    pub self_check: u8,
    /// Link-scan candidate whose domain shares the organization's base token
    pub link_owned: u8,
    /// Associated link sharing a domain token with the organization
    pub link_related_token: u8,
    /// Associated link on a foundation-branded domain with a partial token match
    pub link_branded_partial: u8,
    /// Associated link with no domain relationship
    pub link_unrelated: u8,
    /// Conventional foundation path exists on the organization's site
    pub path_probe: u8,
    /// Foundation subdomain exists on the registrable domain
    pub subdomain_probe: u8,
    /// External link near sponsorship-context wording
    pub sponsor_context: u8,
    /// External link whose URL or text carries a foundation keyword
    pub sponsor_foundation_link: u8,
    /// Sponsor logo (foundation alt text) wrapped in an external link
    pub sponsor_logo: u8,
    /// Reverse lookup base, before per-page corroboration
    pub reverse_lookup_base: u8,
    /// Added per corroborating page in reverse lookup
    pub reverse_lookup_per_page: u8,
    /// Aggregator contribution when at least one event survived
    pub events_found: u8,
    /// Aggregator contribution when at least one contact survived
    pub contacts_found: u8,
    /// Aggregate score when nothing contributed
    pub default_overall: u8,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            self_check: 95,
            link_owned: 85,
            link_related_token: 90,
            link_branded_partial: 80,
            link_unrelated: 60,
            path_probe: 80,
            subdomain_probe: 85,
            sponsor_context: 75,
            sponsor_foundation_link: 60,
            sponsor_logo: 70,
            reverse_lookup_base: 75,
            reverse_lookup_per_page: 5,
            events_found: 70,
            contacts_found: 60,
            default_overall: 50,
        }
    }
}

/// Configuration for one research run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Timeout for a content GET.
    ///
    /// Default: 15 seconds.
    pub request_timeout: Duration,

    /// Timeout for an existence probe (HEAD).
    ///
    /// Default: 5 seconds.
    pub probe_timeout: Duration,

    /// Additional attempts after the first failed fetch of a primary page.
    ///
    /// Default: 2.
    pub max_retries: u32,

    /// Additional attempts for secondary pages (community, event listing,
    /// event detail).
    ///
    /// Default: 1.
    pub secondary_retries: u32,

    /// Linear backoff unit; attempt `n` waits `n * retry_base_delay`.
    pub retry_base_delay: Duration,

    /// Redirect hops followed before giving up.
    pub max_redirects: usize,

    /// Event-listing pages crawled per foundation.
    pub max_event_pages: usize,

    /// Community/about pages scanned by sponsor-scan.
    pub max_community_pages: usize,

    /// Event detail pages crawled for platform detection.
    pub max_event_detail_crawls: usize,

    /// Contacts kept after ranking.
    pub max_contacts: usize,

    /// Runner-up sponsored foundations kept in the report.
    pub max_other_sponsored: usize,

    /// Registry entries checked by reverse lookup when no region matched.
    pub reverse_lookup_fallback: usize,

    #[serde(default)]
    pub weights: ConfidenceWeights,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(15),
            probe_timeout: Duration::from_secs(5),
            max_retries: 2,
            secondary_retries: 1,
            retry_base_delay: Duration::from_millis(1000),
            max_redirects: 5,
            max_event_pages: 3,
            max_community_pages: 5,
            max_event_detail_crawls: 8,
            max_contacts: 15,
            max_other_sponsored: 5,
            reverse_lookup_fallback: 3,
            weights: ConfidenceWeights::default(),
        }
    }
}

impl ResearchConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables on top of the defaults.
    ///
    /// Reads a `.env` file when present. Every variable is optional.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let mut config = Self::default();

        if let Some(secs) = env_parse::<u64>("RESEARCH_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_parse::<u64>("RESEARCH_PROBE_TIMEOUT_SECS")? {
            config.probe_timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = env_parse("RESEARCH_MAX_RETRIES")? {
            config.max_retries = retries;
        }
        if let Some(ms) = env_parse::<u64>("RESEARCH_RETRY_DELAY_MS")? {
            config.retry_base_delay = Duration::from_millis(ms);
        }
        if let Some(pages) = env_parse("RESEARCH_MAX_EVENT_PAGES")? {
            config.max_event_pages = pages;
        }
        if let Some(pages) = env_parse("RESEARCH_MAX_COMMUNITY_PAGES")? {
            config.max_community_pages = pages;
        }
        if let Some(crawls) = env_parse("RESEARCH_MAX_EVENT_CRAWLS")? {
            config.max_event_detail_crawls = crawls;
        }
        if let Some(weight) = env_parse("RESEARCH_WEIGHT_LINK_OWNED")? {
            config.weights.link_owned = clamp_weight(weight);
        }
        if let Some(weight) = env_parse("RESEARCH_WEIGHT_SPONSOR_CONTEXT")? {
            config.weights.sponsor_context = clamp_weight(weight);
        }
        if let Some(weight) = env_parse("RESEARCH_WEIGHT_SPONSOR_LINK")? {
            config.weights.sponsor_foundation_link = clamp_weight(weight);
        }

        Ok(config)
    }

    /// Set the retry count for primary pages.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the linear backoff unit.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Replace the confidence table.
    pub fn with_weights(mut self, weights: ConfidenceWeights) -> Self {
        self.weights = weights;
        self
    }
}

fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ResearchError::Config(format!("{} must be a valid number", key))),
        Err(_) => Ok(None),
    }
}

fn clamp_weight(value: u32) -> u8 {
    value.min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_caps() {
        let config = ResearchConfig::default();
        assert_eq!(config.max_event_pages, 3);
        assert_eq!(config.max_community_pages, 5);
        assert_eq!(config.max_event_detail_crawls, 8);
        assert_eq!(config.max_contacts, 15);
        assert_eq!(config.probe_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_default_weights_within_bounds() {
        let w = ConfidenceWeights::default();
        for value in [
            w.self_check,
            w.link_owned,
            w.link_related_token,
            w.link_branded_partial,
            w.link_unrelated,
            w.path_probe,
            w.subdomain_probe,
            w.sponsor_context,
            w.sponsor_foundation_link,
            w.sponsor_logo,
            w.reverse_lookup_base,
            w.events_found,
            w.contacts_found,
            w.default_overall,
        ] {
            assert!(value <= 100);
        }
    }

    #[test]
    fn test_builder() {
        let config = ResearchConfig::new()
            .with_max_retries(0)
            .with_retry_delay(Duration::ZERO);
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.retry_base_delay, Duration::ZERO);
    }

    #[test]
    fn test_clamp_weight() {
        assert_eq!(clamp_weight(250), 100);
        assert_eq!(clamp_weight(42), 42);
    }
}
