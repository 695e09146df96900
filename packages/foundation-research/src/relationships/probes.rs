use async_trait::async_trait;
use serde_json::json;

use super::{FoundationCandidate, ResolutionContext};
use crate::error::Result;
use crate::research_log::{LogStage, ResearchLog};
use crate::text::{base_url_of, registrable_domain};
use crate::traits::ResolutionStrategy;
use crate::types::{Foundation, RelationshipType, ResolutionStage};
use crate::vocabulary::{FOUNDATION_PAGE_PATHS, FOUNDATION_SUBDOMAINS};

/// Existence-checks conventional foundation paths on the organization site.
pub struct PathProbe;

/// Existence-checks `foundation.`, `giving.` and `donate.` subdomains.
pub struct SubdomainProbe;

#[async_trait]
impl ResolutionStrategy for PathProbe {
    fn stage(&self) -> ResolutionStage {
        ResolutionStage::PathProbe
    }

    async fn attempt(
        &self,
        ctx: &ResolutionContext<'_>,
        log: &mut ResearchLog,
    ) -> Result<Option<FoundationCandidate>> {
        log.record(LogStage::Foundation, "Checking common foundation URL paths...");

        let base = base_url_of(ctx.page_url);
        let found = ctx.fetcher.find_existing(&base, FOUNDATION_PAGE_PATHS, 1).await;
        let Some(url) = found.into_iter().next() else {
            return Ok(None);
        };

        log.record_with(LogStage::Foundation, "Found foundation page", json!({ "url": url }));
        let foundation = Foundation::resolved(
            format!("{} Foundation", ctx.org.name),
            url,
            RelationshipType::Owned,
            ctx.config.weights.path_probe,
        );
        Ok(Some(FoundationCandidate::new(foundation, self.stage())))
    }
}

#[async_trait]
impl ResolutionStrategy for SubdomainProbe {
    fn stage(&self) -> ResolutionStage {
        ResolutionStage::SubdomainProbe
    }

    async fn attempt(
        &self,
        ctx: &ResolutionContext<'_>,
        log: &mut ResearchLog,
    ) -> Result<Option<FoundationCandidate>> {
        let base_domain = registrable_domain(&ctx.org.domain);

        for prefix in FOUNDATION_SUBDOMAINS {
            let url = format!("https://{}.{}", prefix, base_domain);
            if ctx.fetcher.exists(&url).await {
                log.record_with(
                    LogStage::Foundation,
                    "Found foundation subdomain",
                    json!({ "url": url }),
                );
                let foundation = Foundation::resolved(
                    format!("{} Foundation", ctx.org.name),
                    url,
                    RelationshipType::Owned,
                    ctx.config.weights.subdomain_probe,
                );
                return Ok(Some(FoundationCandidate::new(foundation, self.stage())));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResearchConfig;
    use crate::fetcher::Fetcher;
    use crate::testing::MockFetcher;
    use crate::types::Organization;
    use std::sync::Arc;
    use std::time::Duration;

    async fn run(strategy: &dyn ResolutionStrategy, mock: MockFetcher, url: &str) -> Option<FoundationCandidate> {
        let fetcher = Fetcher::new(Arc::new(mock), Duration::ZERO);
        let org = Organization::from_url(url);
        let config = ResearchConfig::default();
        let ctx = ResolutionContext {
            org: &org,
            page_url: url,
            html: "",
            fetcher: &fetcher,
            config: &config,
        };
        let mut log = ResearchLog::new();
        strategy.attempt(&ctx, &mut log).await.unwrap()
    }

    #[tokio::test]
    async fn test_path_probe_takes_first_existing_path() {
        let mock = MockFetcher::new()
            .with_existing("https://acme.org/donate")
            .with_existing("https://acme.org/support");

        let candidate = run(&PathProbe, mock, "https://acme.org").await.unwrap();

        assert_eq!(candidate.foundation.website.as_deref(), Some("https://acme.org/donate"));
        assert_eq!(candidate.foundation.name.as_deref(), Some("Acme Foundation"));
        assert_eq!(candidate.foundation.confidence, 80);
        assert_eq!(candidate.foundation.relationship_type, Some(RelationshipType::Owned));
    }

    #[tokio::test]
    async fn test_subdomain_probe_uses_registrable_domain() {
        let mock = MockFetcher::new().with_existing("https://giving.acme.org");

        let candidate = run(&SubdomainProbe, mock, "https://www.shop.acme.org").await.unwrap();

        assert_eq!(candidate.foundation.website.as_deref(), Some("https://giving.acme.org"));
        assert_eq!(candidate.foundation.confidence, 85);
    }

    #[tokio::test]
    async fn test_probes_find_nothing() {
        assert!(run(&PathProbe, MockFetcher::new(), "https://acme.org").await.is_none());
        assert!(run(&SubdomainProbe, MockFetcher::new(), "https://acme.org").await.is_none());
    }
}
