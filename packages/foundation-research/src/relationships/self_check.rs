use async_trait::async_trait;
use scraper::Html;

use super::{FoundationCandidate, ResolutionContext};
use crate::dom::document_title;
use crate::error::Result;
use crate::research_log::{LogStage, ResearchLog};
use crate::text::title_segment;
use crate::traits::ResolutionStrategy;
use crate::types::{Foundation, RelationshipType, ResolutionStage};
use crate::vocabulary::{contains_any, FOUNDATION_KEYWORDS};

/// The organization page itself is the foundation when its title says so.
pub struct SelfCheck;

/// Foundation name from the page title, if the title carries a foundation keyword.
fn foundation_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let title = document_title(&document);
    if contains_any(&title.to_lowercase(), FOUNDATION_KEYWORDS) {
        Some(title_segment(&title))
    } else {
        None
    }
}

#[async_trait]
impl ResolutionStrategy for SelfCheck {
    fn stage(&self) -> ResolutionStage {
        ResolutionStage::SelfCheck
    }

    async fn attempt(
        &self,
        ctx: &ResolutionContext<'_>,
        log: &mut ResearchLog,
    ) -> Result<Option<FoundationCandidate>> {
        let Some(name) = foundation_title(ctx.html) else {
            return Ok(None);
        };

        let name = if name.is_empty() {
            format!("{} Foundation", ctx.org.name)
        } else {
            name
        };
        log.record(LogStage::Foundation, format!("Current page is a foundation: {}", name));

        let foundation = Foundation::resolved(
            name,
            ctx.page_url,
            RelationshipType::Owned,
            ctx.config.weights.self_check,
        );
        Ok(Some(FoundationCandidate::new(foundation, self.stage())))
    }
}
