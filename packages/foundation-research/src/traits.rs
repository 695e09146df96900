use async_trait::async_trait;

use crate::error::{FetchResult, Result};
use crate::relationships::{FoundationCandidate, ResolutionContext};
use crate::research_log::ResearchLog;
use crate::types::ResolutionStage;

// ============================================================================
// PAGE FETCHER: Network access (single attempt, no retry policy)
// ============================================================================

/// A page body plus the URL it was finally served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub html: String,
    /// URL after redirects
    pub final_url: String,
    pub status: u16,
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// One GET attempt. Statuses >= 400 are errors.
    async fn get(&self, url: &str) -> FetchResult<FetchedPage>;

    /// Cheap existence probe. Never reads a body and never fails outward.
    async fn exists(&self, url: &str) -> bool;
}

// ============================================================================
// RESOLUTION STRATEGY: One link of the foundation fallback chain
// ============================================================================

#[async_trait]
pub trait ResolutionStrategy: Send + Sync {
    /// Stage tag reported in meta and not-found payloads.
    fn stage(&self) -> ResolutionStage;

    /// Try to resolve a foundation. `Ok(None)` hands over to the next strategy;
    /// an `Err` is logged by the runner and treated the same way.
    async fn attempt(
        &self,
        ctx: &ResolutionContext<'_>,
        log: &mut ResearchLog,
    ) -> Result<Option<FoundationCandidate>>;
}
