//! Foundation resolution: an ordered chain of strategies, first hit wins.
//!
//! | Stage            | Relationship          | Confidence          |
//! |------------------|-----------------------|---------------------|
//! | self-check       | owned                 | 95                  |
//! | link-scan        | owned / associated    | 85 / 90, 80, 60     |
//! | path-probe       | owned                 | 80                  |
//! | subdomain-probe  | owned                 | 85                  |
//! | sponsor-scan     | sponsored             | 75, 70, 60          |
//! | reverse-lookup   | sponsored             | 75 + 5 per page     |
//!
//! Every number above comes from [`ConfidenceWeights`](crate::config::ConfidenceWeights).

mod link_scan;
mod probes;
mod reverse_lookup;
mod self_check;
mod sponsor_scan;

pub use link_scan::LinkScan;
pub use probes::{PathProbe, SubdomainProbe};
pub use reverse_lookup::ReverseLookup;
pub use self_check::SelfCheck;
pub use sponsor_scan::SponsorScan;

use serde_json::json;

use crate::config::ResearchConfig;
use crate::fetcher::Fetcher;
use crate::research_log::{LogStage, ResearchLog};
use crate::traits::ResolutionStrategy;
use crate::types::{Foundation, Organization, ResolutionStage, SponsoredCandidate};

/// Everything a strategy may look at. Borrowed for one request.
pub struct ResolutionContext<'a> {
    pub org: &'a Organization,
    /// URL the organization page was served from (after redirects)
    pub page_url: &'a str,
    pub html: &'a str,
    pub fetcher: &'a Fetcher,
    pub config: &'a ResearchConfig,
}

/// A strategy's winning foundation.
#[derive(Debug, Clone)]
pub struct FoundationCandidate {
    pub foundation: Foundation,
    pub stage: ResolutionStage,
    /// Sponsor-scan runners-up, best first
    pub runners_up: Vec<SponsoredCandidate>,
}

impl FoundationCandidate {
    pub fn new(foundation: Foundation, stage: ResolutionStage) -> Self {
        Self {
            foundation,
            stage,
            runners_up: Vec::new(),
        }
    }

    pub fn with_runners_up(mut self, runners_up: Vec<SponsoredCandidate>) -> Self {
        self.runners_up = runners_up;
        self
    }
}

/// Outcome of running the chain.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub candidate: Option<FoundationCandidate>,
    /// Stages that ran, in order
    pub stages_attempted: Vec<ResolutionStage>,
}

pub struct RelationshipResolver {
    strategies: Vec<Box<dyn ResolutionStrategy>>,
}

impl Default for RelationshipResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl RelationshipResolver {
    /// The full chain, in resolution order.
    pub fn new() -> Self {
        Self::with_strategies(vec![
            Box::new(SelfCheck),
            Box::new(LinkScan),
            Box::new(PathProbe),
            Box::new(SubdomainProbe),
            Box::new(SponsorScan),
            Box::new(ReverseLookup),
        ])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn ResolutionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Run strategies in order until one yields a foundation website.
    ///
    /// A strategy error is logged and treated as "no candidate".
    pub async fn resolve(&self, ctx: &ResolutionContext<'_>, log: &mut ResearchLog) -> Resolution {
        let mut stages_attempted = Vec::new();

        for strategy in &self.strategies {
            let stage = strategy.stage();
            stages_attempted.push(stage);
            log.record(LogStage::Foundation, format!("Trying {}", stage.description()));

            match strategy.attempt(ctx, log).await {
                Ok(Some(candidate)) if candidate.foundation.is_resolved() => {
                    log.record_with(
                        LogStage::Foundation,
                        format!("Resolved foundation via {}", stage),
                        json!({
                            "name": candidate.foundation.name,
                            "website": candidate.foundation.website,
                            "type": candidate.foundation.relationship_type,
                            "confidence": candidate.foundation.confidence,
                        }),
                    );
                    return Resolution {
                        candidate: Some(candidate),
                        stages_attempted,
                    };
                }
                Ok(_) => {
                    log.record(LogStage::Foundation, format!("No candidate from {}", stage));
                }
                Err(e) => {
                    log.record_with(
                        LogStage::Error,
                        format!("Error in {}", stage),
                        json!({ "error": e.to_string() }),
                    );
                }
            }
        }

        log.record(LogStage::Foundation, "No foundation found by any strategy");
        Resolution {
            candidate: None,
            stages_attempted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ResearchError, Result};
    use crate::testing::MockFetcher;
    use crate::types::RelationshipType;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    struct Failing;

    #[async_trait]
    impl ResolutionStrategy for Failing {
        fn stage(&self) -> ResolutionStage {
            ResolutionStage::LinkScan
        }

        async fn attempt(
            &self,
            _ctx: &ResolutionContext<'_>,
            _log: &mut ResearchLog,
        ) -> Result<Option<FoundationCandidate>> {
            Err(ResearchError::Internal("selector exploded".into()))
        }
    }

    struct Fixed;

    #[async_trait]
    impl ResolutionStrategy for Fixed {
        fn stage(&self) -> ResolutionStage {
            ResolutionStage::PathProbe
        }

        async fn attempt(
            &self,
            _ctx: &ResolutionContext<'_>,
            _log: &mut ResearchLog,
        ) -> Result<Option<FoundationCandidate>> {
            Ok(Some(FoundationCandidate::new(
                Foundation::resolved("Acme Foundation", "https://acme.org/foundation", RelationshipType::Owned, 80),
                ResolutionStage::PathProbe,
            )))
        }
    }

    #[tokio::test]
    async fn test_failing_stage_does_not_abort_chain() {
        let fetcher = Fetcher::new(Arc::new(MockFetcher::new()), Duration::ZERO);
        let org = Organization::from_url("https://acme.org");
        let config = ResearchConfig::default();
        let ctx = ResolutionContext {
            org: &org,
            page_url: "https://acme.org",
            html: "<html></html>",
            fetcher: &fetcher,
            config: &config,
        };
        let mut log = ResearchLog::new();

        let resolver = RelationshipResolver::with_strategies(vec![Box::new(Failing), Box::new(Fixed)]);
        let resolution = resolver.resolve(&ctx, &mut log).await;

        let candidate = resolution.candidate.unwrap();
        assert_eq!(candidate.stage, ResolutionStage::PathProbe);
        assert_eq!(
            resolution.stages_attempted,
            vec![ResolutionStage::LinkScan, ResolutionStage::PathProbe]
        );
        assert!(log.entries().iter().any(|e| e.stage == LogStage::Error));
    }

    #[tokio::test]
    async fn test_empty_site_attempts_every_stage() {
        let mock = MockFetcher::new();
        let fetcher = Fetcher::new(Arc::new(mock), Duration::ZERO);
        let org = Organization::from_url("https://plainco.com");
        let config = ResearchConfig::default().with_max_retries(0);
        let html = "<html><head><title>Plainco</title></head><body><p>Widgets.</p></body></html>";
        let ctx = ResolutionContext {
            org: &org,
            page_url: "https://plainco.com",
            html,
            fetcher: &fetcher,
            config: &config,
        };
        let mut log = ResearchLog::new();

        let resolution = RelationshipResolver::new().resolve(&ctx, &mut log).await;

        assert!(resolution.candidate.is_none());
        assert_eq!(
            resolution.stages_attempted,
            vec![
                ResolutionStage::SelfCheck,
                ResolutionStage::LinkScan,
                ResolutionStage::PathProbe,
                ResolutionStage::SubdomainProbe,
                ResolutionStage::SponsorScan,
                ResolutionStage::ReverseLookup,
            ]
        );
    }
}
