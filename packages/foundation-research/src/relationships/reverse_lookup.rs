use async_trait::async_trait;
use scraper::Html;
use serde_json::json;

use super::{FoundationCandidate, ResolutionContext};
use crate::dom::{document_text, document_title, element_text, selector};
use crate::error::Result;
use crate::research_log::{LogStage, ResearchLog};
use crate::text::{domain_of, normalize_text, title_segment};
use crate::traits::ResolutionStrategy;
use crate::types::{Foundation, Organization, RelationshipType, ResolutionStage};
use crate::vocabulary::{
    KnownFoundation, DONOR_PAGE_PATHS, GENERIC_TITLE_WORDS, KNOWN_FOUNDATIONS, PLACES,
};

/// Shortest name variant worth searching for.
const MIN_VARIANT_LEN: usize = 4;

/// Elements likely to carry a postal address.
const ADDRESS_SELECTORS: &[&str] = &[
    "address",
    "footer",
    r#"[class*="address"]"#,
    r#"[class*="location"]"#,
    r#"[class*="contact"]"#,
];

/// Searches the sponsor and donor pages of known regional foundations for the
/// organization's name.
pub struct ReverseLookup;

/// What the organization page says about where it is and what it is called.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct OrgProfile {
    regions: Vec<&'static str>,
    name_variants: Vec<String>,
}

/// Lowercased title text with "home", "welcome to" and similar filler removed.
fn strip_generic_words(title: &str) -> String {
    normalize_text(title)
        .split_whitespace()
        .filter(|word| !GENERIC_TITLE_WORDS.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Long enough and not made only of generic title words.
fn is_distinctive(variant: &str) -> bool {
    variant.chars().count() >= MIN_VARIANT_LEN
        && variant
            .split_whitespace()
            .any(|word| !GENERIC_TITLE_WORDS.contains(&word))
}

fn profile_org(org: &Organization, html: &str) -> OrgProfile {
    let document = Html::parse_document(html);

    let mut haystack = normalize_text(&document_text(&document));
    for selector_str in ADDRESS_SELECTORS {
        if let Some(s) = selector(selector_str) {
            for element in document.select(&s) {
                haystack.push(' ');
                haystack.push_str(&normalize_text(&element_text(&element)));
            }
        }
    }
    // Pad so ", mn " style entries match at the ends
    let haystack = format!(" {} ", haystack);

    let mut regions: Vec<&'static str> = Vec::new();
    for place in PLACES {
        if haystack.contains(place.name) && !regions.contains(&place.region) {
            regions.push(place.region);
        }
    }

    let segment = strip_generic_words(&title_segment(&document_title(&document)));
    let first_two = segment.split_whitespace().take(2).collect::<Vec<_>>().join(" ");
    let mut name_variants: Vec<String> = Vec::new();
    for variant in [org.name.as_str(), segment.as_str(), first_two.as_str(), org.base_token().as_str()] {
        let variant = normalize_text(variant);
        if is_distinctive(&variant) && !name_variants.contains(&variant) {
            name_variants.push(variant);
        }
    }

    OrgProfile {
        regions,
        name_variants,
    }
}

/// Registry entries serving any of the regions, or the first `fallback`
/// entries when no region matched.
fn relevant_foundations(regions: &[&str], fallback: usize) -> Vec<&'static KnownFoundation> {
    let matched: Vec<&'static KnownFoundation> = KNOWN_FOUNDATIONS
        .iter()
        .filter(|f| f.regions.iter().any(|r| regions.contains(r)))
        .collect();
    if matched.is_empty() {
        KNOWN_FOUNDATIONS.iter().take(fallback).collect()
    } else {
        matched
    }
}

fn mentions_org(html: &str, variants: &[String]) -> bool {
    let document = Html::parse_document(html);
    let text = normalize_text(&document_text(&document));
    variants.iter().any(|v| text.contains(v.as_str()))
}

#[async_trait]
impl ResolutionStrategy for ReverseLookup {
    fn stage(&self) -> ResolutionStage {
        ResolutionStage::ReverseLookup
    }

    async fn attempt(
        &self,
        ctx: &ResolutionContext<'_>,
        log: &mut ResearchLog,
    ) -> Result<Option<FoundationCandidate>> {
        let profile = profile_org(ctx.org, ctx.html);
        log.record_with(
            LogStage::ReverseLookup,
            "Searching regional foundations for sponsor listings",
            json!({ "regions": profile.regions, "name_variants": profile.name_variants }),
        );
        if profile.name_variants.is_empty() {
            return Ok(None);
        }

        let weights = &ctx.config.weights;
        let mut best: Option<(u8, &KnownFoundation, Vec<String>)> = None;

        for known in relevant_foundations(&profile.regions, ctx.config.reverse_lookup_fallback) {
            if domain_of(known.website) == ctx.org.domain {
                continue;
            }

            let mut pages = ctx
                .fetcher
                .find_existing(known.website, DONOR_PAGE_PATHS, DONOR_PAGE_PATHS.len())
                .await;
            pages.push(known.website.to_string());

            let mut matched_pages = Vec::new();
            for page in pages {
                let outcome = ctx.fetcher.fetch(&page, ctx.config.secondary_retries, log).await;
                let Some(html) = outcome.html else {
                    continue;
                };
                if mentions_org(&html, &profile.name_variants) {
                    matched_pages.push(page);
                }
            }

            if matched_pages.is_empty() {
                continue;
            }

            let bonus = (weights.reverse_lookup_per_page as usize).saturating_mul(matched_pages.len());
            let confidence = (weights.reverse_lookup_base as usize + bonus).min(100) as u8;
            log.record_with(
                LogStage::ReverseLookup,
                format!("{} lists the organization", known.name),
                json!({ "pages": matched_pages, "confidence": confidence }),
            );

            if best.as_ref().map_or(true, |(c, _, _)| confidence > *c) {
                best = Some((confidence, known, matched_pages));
            }
        }

        let Some((confidence, known, pages)) = best else {
            return Ok(None);
        };

        let foundation = Foundation::resolved(
            known.name,
            known.website,
            RelationshipType::Sponsored,
            confidence,
        )
        .with_corroborating_pages(pages);
        Ok(Some(FoundationCandidate::new(foundation, self.stage())))
    }
}
