use async_trait::async_trait;
use scraper::Html;
use serde_json::json;
use url::Url;

use super::{FoundationCandidate, ResolutionContext};
use crate::config::ConfidenceWeights;
use crate::dom::{element_text, selector};
use crate::error::Result;
use crate::research_log::{LogStage, ResearchLog};
use crate::text::{domain_of, resolve_href};
use crate::traits::ResolutionStrategy;
use crate::types::{Foundation, Organization, RelationshipType, ResolutionStage};
use crate::vocabulary::FOUNDATION_KEYWORDS;

/// Domain tokens too generic to indicate relatedness.
const GENERIC_TOKENS: &[&str] = &[
    "www", "com", "org", "net", "edu", "gov", "foundation", "the", "inc",
];

/// Picks the anchor with the most foundation keywords in its href or text.
pub struct LinkScan;

#[derive(Debug, Clone, PartialEq, Eq)]
struct ScoredLink {
    url: String,
    text: String,
    score: usize,
}

/// Highest-scoring foundation link; ties go to the earliest in the document.
fn best_foundation_link(html: &str, page_url: &Url) -> Option<ScoredLink> {
    let document = Html::parse_document(html);
    let anchors = selector("a[href]")?;

    let mut best: Option<ScoredLink> = None;
    for anchor in document.select(&anchors) {
        let href = anchor.value().attr("href").unwrap_or_default();
        let raw_text = element_text(&anchor);
        let text = raw_text.trim().to_lowercase();
        let href_lower = href.to_lowercase();

        let score = FOUNDATION_KEYWORDS
            .iter()
            .filter(|k| href_lower.contains(*k) || text.contains(*k))
            .count();
        if score == 0 {
            continue;
        }

        let Some(resolved) = resolve_href(page_url, href) else {
            continue;
        };

        if best.as_ref().map_or(true, |b| score > b.score) {
            best = Some(ScoredLink {
                url: resolved,
                text: raw_text.trim().to_string(),
                score,
            });
        }
    }
    best
}

fn domain_tokens(domain: &str) -> Vec<String> {
    domain
        .split(['.', '-'])
        .map(str::to_lowercase)
        .filter(|t| t.len() >= 3 && !GENERIC_TOKENS.contains(&t.as_str()))
        .collect()
}

/// Classify a link target against the organization.
pub(crate) fn classify_link(
    org: &Organization,
    target_url: &str,
    weights: &ConfidenceWeights,
) -> (RelationshipType, u8) {
    let target_domain = domain_of(target_url);
    let target_base = target_domain.split('.').next().unwrap_or_default();
    let org_base = org.base_token();

    let owned = (!org_base.is_empty() && target_domain.contains(&org_base))
        || (!target_base.is_empty() && org.domain.contains(target_base));
    if owned {
        return (RelationshipType::Owned, weights.link_owned);
    }

    let org_tokens = domain_tokens(&org.domain);
    let shares_token = domain_tokens(&target_domain)
        .iter()
        .any(|t| org_tokens.contains(t));
    if shares_token {
        return (RelationshipType::Associated, weights.link_related_token);
    }

    let prefix: String = org_base.chars().take(4).collect();
    if target_domain.contains("foundation") && !prefix.is_empty() && target_domain.contains(&prefix) {
        return (RelationshipType::Associated, weights.link_branded_partial);
    }

    (RelationshipType::Associated, weights.link_unrelated)
}

#[async_trait]
impl ResolutionStrategy for LinkScan {
    fn stage(&self) -> ResolutionStage {
        ResolutionStage::LinkScan
    }

    async fn attempt(
        &self,
        ctx: &ResolutionContext<'_>,
        log: &mut ResearchLog,
    ) -> Result<Option<FoundationCandidate>> {
        let page_url = Url::parse(ctx.page_url)?;
        let Some(link) = best_foundation_link(ctx.html, &page_url) else {
            return Ok(None);
        };

        let (relationship, confidence) = classify_link(ctx.org, &link.url, &ctx.config.weights);
        log.record_with(
            LogStage::Foundation,
            "Found foundation link",
            json!({
                "url": link.url,
                "score": link.score,
                "type": relationship,
                "confidence": confidence,
            }),
        );

        let name = if link.text.is_empty() {
            "Foundation".to_string()
        } else {
            link.text
        };
        let foundation = Foundation::resolved(name, link.url, relationship, confidence);
        Ok(Some(FoundationCandidate::new(foundation, self.stage())))
    }
}
