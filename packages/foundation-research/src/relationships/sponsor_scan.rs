use async_trait::async_trait;
use scraper::Html;
use serde_json::json;
use std::collections::HashSet;

use super::{FoundationCandidate, ResolutionContext};
use crate::config::ConfidenceWeights;
use crate::dom::{closest, element_text, grandparent_text, parent_text, selector};
use crate::error::Result;
use crate::research_log::{LogStage, ResearchLog};
use crate::text::{base_url_of, domain_of, is_absolute_http};
use crate::traits::ResolutionStrategy;
use crate::types::{
    Foundation, RelationshipType, ResolutionStage, SponsorContext, SponsoredCandidate,
};
use crate::vocabulary::{
    contains_any, COMMUNITY_PAGE_PATHS, FOUNDATION_KEYWORDS, SOCIAL_DOMAINS,
    SPONSORSHIP_CONTEXT_KEYWORDS,
};

/// Looks for foundations the organization sponsors, on its home page and
/// community/about pages.
pub struct SponsorScan;

/// Per-request scan state: target domains already claimed.
struct SponsorScanner<'a> {
    org_domain: &'a str,
    weights: &'a ConfidenceWeights,
    seen: HashSet<String>,
}

impl<'a> SponsorScanner<'a> {
    fn new(org_domain: &'a str, weights: &'a ConfidenceWeights) -> Self {
        Self {
            org_domain,
            weights,
            seen: HashSet::new(),
        }
    }

    /// External, non-social target not claimed yet.
    fn claimable(&self, href: &str) -> Option<String> {
        if !is_absolute_http(href) {
            return None;
        }
        let lower = href.to_lowercase();
        if contains_any(&lower, SOCIAL_DOMAINS) {
            return None;
        }
        let domain = domain_of(href);
        if domain == self.org_domain || self.seen.contains(&domain) {
            return None;
        }
        Some(domain)
    }

    fn scan_page(&mut self, html: &str, page_url: &str) -> Vec<SponsoredCandidate> {
        let document = Html::parse_document(html);
        let mut found = Vec::new();

        if let Some(anchors) = selector("a[href]") {
            for anchor in document.select(&anchors) {
                let href = anchor.value().attr("href").unwrap_or_default();
                let Some(domain) = self.claimable(href) else {
                    continue;
                };

                let text = element_text(&anchor).trim().to_string();
                let context = format!("{} {}", parent_text(&anchor), grandparent_text(&anchor))
                    .to_lowercase();

                let sponsor_mention = contains_any(&context, SPONSORSHIP_CONTEXT_KEYWORDS);
                let foundation_link = contains_any(&href.to_lowercase(), FOUNDATION_KEYWORDS)
                    || contains_any(&text.to_lowercase(), FOUNDATION_KEYWORDS);

                let (context, confidence) = if sponsor_mention {
                    (SponsorContext::SponsorMention, self.weights.sponsor_context)
                } else if foundation_link {
                    (SponsorContext::FoundationLink, self.weights.sponsor_foundation_link)
                } else {
                    continue;
                };

                self.seen.insert(domain.clone());
                found.push(SponsoredCandidate {
                    name: if text.is_empty() { domain } else { text },
                    website: href.to_string(),
                    context,
                    source_page: page_url.to_string(),
                    confidence,
                });
            }
        }

        if let Some(images) = selector("img[alt]") {
            for image in document.select(&images) {
                let alt = image.value().attr("alt").unwrap_or_default().trim();
                if !contains_any(&alt.to_lowercase(), FOUNDATION_KEYWORDS) {
                    continue;
                }
                let Some(href) = closest(&image, "a").and_then(|a| a.value().attr("href")) else {
                    continue;
                };
                let Some(domain) = self.claimable(href) else {
                    continue;
                };

                self.seen.insert(domain);
                found.push(SponsoredCandidate {
                    name: alt.to_string(),
                    website: href.to_string(),
                    context: SponsorContext::SponsorLogo,
                    source_page: page_url.to_string(),
                    confidence: self.weights.sponsor_logo,
                });
            }
        }

        found
    }
}

#[async_trait]
impl ResolutionStrategy for SponsorScan {
    fn stage(&self) -> ResolutionStage {
        ResolutionStage::SponsorScan
    }

    async fn attempt(
        &self,
        ctx: &ResolutionContext<'_>,
        log: &mut ResearchLog,
    ) -> Result<Option<FoundationCandidate>> {
        log.record(LogStage::Sponsored, "Searching for sponsored foundations...");

        let mut scanner = SponsorScanner::new(&ctx.org.domain, &ctx.config.weights);
        let mut candidates = scanner.scan_page(ctx.html, ctx.page_url);

        let base = base_url_of(ctx.page_url);
        let community_pages = ctx
            .fetcher
            .find_existing(&base, COMMUNITY_PAGE_PATHS, ctx.config.max_community_pages)
            .await;
        log.record(
            LogStage::Sponsored,
            format!("Found {} community pages to search", community_pages.len()),
        );

        for page_url in &community_pages {
            let outcome = ctx
                .fetcher
                .fetch(page_url, ctx.config.secondary_retries, log)
                .await;
            if let Some(html) = outcome.html {
                candidates.extend(scanner.scan_page(&html, page_url));
            }
        }

        for candidate in &candidates {
            log.record_with(
                LogStage::Sponsored,
                "Found potential sponsored foundation",
                json!({
                    "name": candidate.name,
                    "context": candidate.context,
                    "confidence": candidate.confidence,
                }),
            );
        }

        // Stable: equal confidences keep discovery order
        candidates.sort_by(|a, b| b.confidence.cmp(&a.confidence));
        log.record(
            LogStage::Sponsored,
            format!("Total sponsored foundations found: {}", candidates.len()),
        );

        let mut ranked = candidates.into_iter();
        let Some(primary) = ranked.next() else {
            return Ok(None);
        };
        let runners_up: Vec<SponsoredCandidate> =
            ranked.take(ctx.config.max_other_sponsored).collect();

        let foundation = Foundation::resolved(
            primary.name,
            primary.website,
            RelationshipType::Sponsored,
            primary.confidence,
        );
        Ok(Some(
            FoundationCandidate::new(foundation, self.stage()).with_runners_up(runners_up),
        ))
    }
}
