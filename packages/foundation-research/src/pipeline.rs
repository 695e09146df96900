//! End-to-end research of one organization.

use chrono::{NaiveDate, Utc};
use scraper::Html;
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use url::Url;

use crate::confidence::ConfidenceScorer;
use crate::config::ResearchConfig;
use crate::contacts::ContactExtractor;
use crate::detector::PlatformDetector;
use crate::dom::{document_title, meta_content};
use crate::error::{ResearchError, ResearchFailure};
use crate::events::EventExtractor;
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::relationships::{RelationshipResolver, ResolutionContext};
use crate::research_log::{LogStage, ResearchLog};
use crate::text::{base_url_of, title_segment, truncate_chars};
use crate::traits::PageFetcher;
use crate::types::{
    Contact, Event, ExtractionSuccess, Foundation, NotFound, Organization, RegistrationTool,
    Report, ReportMeta, ResearchOutcome, UNKNOWN_PLATFORM,
};
use crate::vocabulary::EVENT_PAGE_PATHS;

const MAX_MISSION_CHARS: usize = 500;

/// Title segment and meta description of a foundation page.
fn foundation_details(html: &str) -> (Option<String>, Option<String>) {
    let document = Html::parse_document(html);
    let name = Some(title_segment(&document_title(&document))).filter(|n| !n.is_empty());
    let mission = meta_content(&document, r#"meta[name="description"]"#)
        .or_else(|| meta_content(&document, r#"meta[property="og:description"]"#))
        .map(|m| truncate_chars(&m, MAX_MISSION_CHARS));
    (name, mission)
}

/// Runs the full research pipeline for one organization URL at a time.
///
/// Holds no per-request state, so one `Researcher` can serve concurrent
/// requests for different organizations.
pub struct Researcher {
    config: ResearchConfig,
    fetcher: Fetcher,
    resolver: RelationshipResolver,
    today: Option<NaiveDate>,
}

impl Researcher {
    /// Researcher backed by the reqwest fetcher.
    pub fn new(config: ResearchConfig) -> crate::error::Result<Self> {
        let http = HttpFetcher::new(&config)?;
        Ok(Self::with_fetcher(config, Arc::new(http)))
    }

    pub fn with_fetcher(config: ResearchConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        let fetcher = Fetcher::new(fetcher, config.retry_base_delay);
        Self {
            config,
            fetcher,
            resolver: RelationshipResolver::new(),
            today: None,
        }
    }

    /// Fix the date used to decide whether events are upcoming.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Research an organization. `url` must already be normalized.
    ///
    /// Not finding a foundation is a successful [`ResearchOutcome::NotFound`];
    /// only an unreachable organization page or malformed input is an error.
    pub async fn research(&self, url: &str) -> Result<ResearchOutcome, ResearchFailure> {
        let mut log = ResearchLog::new();
        log.record(LogStage::Start, format!("=== Starting Research for: {} ===", url));

        let parsed = Url::parse(url).ok().filter(|u| u.host_str().is_some());
        if parsed.is_none() {
            return Err(ResearchFailure::new(
                ResearchError::InvalidUrl(url.to_string()),
                log.into_entries(),
            ));
        }

        let org = Organization::from_url(url);
        let home = self.fetcher.fetch(url, self.config.max_retries, &mut log).await;
        let (home_html, home_url) = match (home.html, home.error) {
            (Some(html), _) => (html, home.final_url),
            (None, error) => {
                let details = error.unwrap_or_else(|| "unknown error".to_string());
                log.record_with(
                    LogStage::Error,
                    "Failed to fetch organization page",
                    json!({ "error": details }),
                );
                return Err(ResearchFailure::new(
                    ResearchError::InitialFetch {
                        url: url.to_string(),
                        details,
                    },
                    log.into_entries(),
                ));
            }
        };

        let ctx = ResolutionContext {
            org: &org,
            page_url: &home_url,
            html: &home_html,
            fetcher: &self.fetcher,
            config: &self.config,
        };
        let resolution = self.resolver.resolve(&ctx, &mut log).await;

        let Some(candidate) = resolution.candidate else {
            info!(url = %url, "No foundation found");
            return Ok(ResearchOutcome::NotFound(NotFound::new(
                &org,
                resolution.stages_attempted,
                log.into_entries(),
            )));
        };

        let mut foundation = candidate.foundation;
        let stage = candidate.stage;
        let website = foundation.website.clone().unwrap_or_default();

        let (events, contacts) = self.harvest(&mut foundation, &website, &mut log).await;

        let registration_tools: Vec<RegistrationTool> =
            events.iter().map(RegistrationTool::from).collect();
        let confidence_score = ConfidenceScorer::new(&self.config.weights).overall(
            foundation.confidence,
            events.len(),
            contacts.len(),
        );

        log.record_with(
            LogStage::Complete,
            "=== Research Complete ===",
            json!({
                "foundation": foundation.name,
                "type": foundation.relationship_type,
                "events": events.len(),
                "contacts": contacts.len(),
                "confidence": confidence_score,
            }),
        );
        info!(
            url = %url,
            foundation = ?foundation.name,
            stage = %stage,
            events = events.len(),
            contacts = contacts.len(),
            confidence = confidence_score,
            "Research complete"
        );

        let meta = ReportMeta {
            source_url: org.source_url.clone(),
            organization_name: org.name.clone(),
            foundation_url: foundation.website.clone(),
            resolution_stage: stage,
            scraped_at: Utc::now(),
            events_found: events.len(),
            contacts_found: contacts.len(),
            extraction_success: ExtractionSuccess {
                foundation: foundation.is_resolved(),
                events: !events.is_empty(),
                tools: registration_tools
                    .iter()
                    .any(|t| t.registration_platform != UNKNOWN_PLATFORM),
                contacts: !contacts.is_empty(),
            },
        };

        let other_sponsored_foundations =
            Some(candidate.runners_up).filter(|r| !r.is_empty());

        Ok(ResearchOutcome::Report(Box::new(Report {
            foundation,
            events,
            registration_tools,
            team_contacts: contacts,
            other_sponsored_foundations,
            confidence_score,
            meta,
            debug_log: log.into_entries(),
        })))
    }

    /// Fetch the foundation site and pull events, registration tools and
    /// contacts from it. A failed fetch yields no events and no contacts.
    async fn harvest(
        &self,
        foundation: &mut Foundation,
        website: &str,
        log: &mut ResearchLog,
    ) -> (Vec<Event>, Vec<Contact>) {
        log.record(LogStage::Details, format!("Fetching foundation details: {}", website));
        let outcome = self.fetcher.fetch(website, self.config.max_retries, log).await;
        let Some((html, final_url)) = outcome.into_page() else {
            log.record(
                LogStage::Details,
                "Foundation page unavailable; reporting without events or contacts",
            );
            return (Vec::new(), Vec::new());
        };

        let (name, mission) = foundation_details(&html);
        if let Some(name) = name {
            foundation.name = Some(name);
        }
        foundation.mission = mission;

        log.record(LogStage::Events, "Extracting events from foundation...");
        let today = self.today.unwrap_or_else(|| Utc::now().date_naive());
        let mut extractor = EventExtractor::new(today);
        let mut events = extractor.extract(&html, &final_url, log);

        let event_pages = self
            .fetcher
            .find_existing(&base_url_of(website), EVENT_PAGE_PATHS, self.config.max_event_pages)
            .await;
        for page in &event_pages {
            let listing = self.fetcher.fetch(page, self.config.secondary_retries, log).await;
            if let Some((page_html, page_url)) = listing.into_page() {
                events.extend(extractor.extract(&page_html, &page_url, log));
            }
        }
        log.record(LogStage::Events, format!("Total unique events: {}", events.len()));

        log.record(LogStage::Tools, "Crawling event pages for registration tools...");
        PlatformDetector::new(&self.fetcher, self.config.secondary_retries)
            .enrich(&mut events, self.config.max_event_detail_crawls, log)
            .await;

        log.record(LogStage::Contacts, "Extracting team contacts...");
        let contacts = ContactExtractor::new(self.config.max_contacts).extract(&html, log);

        (events, contacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foundation_details_prefers_description() {
        let html = r#"<html><head><title>Acme Foundation - Home</title>
            <meta property="og:description" content="OG text">
            <meta name="description" content="Helping kids read."></head></html>"#;
        let (name, mission) = foundation_details(html);
        assert_eq!(name.as_deref(), Some("Acme Foundation"));
        assert_eq!(mission.as_deref(), Some("Helping kids read."));
    }

    #[test]
    fn test_foundation_details_truncates_mission() {
        let long = "a".repeat(800);
        let html = format!(r#"<meta property="og:description" content="{}">"#, long);
        let (name, mission) = foundation_details(&html);
        assert_eq!(name, None);
        assert_eq!(mission.map(|m| m.chars().count()), Some(500));
    }
}
