//! Registration platform detection.
//!
//! Classifies URLs and pages against [`REGISTRATION_PLATFORMS`] and fills the
//! registration fields of extracted events.

use scraper::Html;
use serde_json::json;

use crate::dom::{element_text, selector};
use crate::fetcher::Fetcher;
use crate::research_log::{LogStage, ResearchLog};
use crate::text::is_absolute_http;
use crate::types::{Event, UNKNOWN_PLATFORM};
use crate::vocabulary::{contains_any, REGISTRATION_INTENT_KEYWORDS, REGISTRATION_PLATFORMS};

/// Element/attribute pairs checked by [`detect_from_page`], in precedence order.
const EMBED_SOURCES: &[(&str, &str)] = &[
    ("iframe[src]", "src"),
    ("form[action]", "action"),
    ("script[src]", "src"),
    ("a[href]", "href"),
];

/// First platform whose pattern occurs in the URL.
pub fn detect_from_url(url: &str) -> Option<&'static str> {
    let lower = url.to_lowercase();
    REGISTRATION_PLATFORMS
        .iter()
        .find(|p| p.patterns.iter().any(|pattern| lower.contains(pattern)))
        .map(|p| p.name)
}

fn detect_in_document(document: &Html, page_url: &str) -> Option<&'static str> {
    if let Some(platform) = detect_from_url(page_url) {
        return Some(platform);
    }

    for (selector_str, attr) in EMBED_SOURCES {
        let Some(s) = selector(selector_str) else {
            continue;
        };
        let found = document
            .select(&s)
            .filter_map(|el| el.value().attr(attr))
            .find_map(detect_from_url);
        if found.is_some() {
            return found;
        }
    }

    None
}

/// Platform for a whole page: page URL, then iframe, form action, script and
/// anchor targets. The first source with any match decides.
pub fn detect_from_page(html: &str, page_url: &str) -> Option<&'static str> {
    let document = Html::parse_document(html);
    detect_in_document(&document, page_url)
}

/// What an event detail page says about registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPageDetails {
    pub url: String,
    pub platform: Option<&'static str>,
    pub registration_link: Option<String>,
    pub sponsorship_link: Option<String>,
}

/// Scan a fetched event page for its platform and registration links.
pub fn scan_event_page(html: &str, page_url: &str) -> EventPageDetails {
    let document = Html::parse_document(html);
    let mut details = EventPageDetails {
        url: page_url.to_string(),
        platform: detect_in_document(&document, page_url),
        registration_link: None,
        sponsorship_link: None,
    };

    let Some(anchors) = selector("a[href]") else {
        return details;
    };

    for anchor in document.select(&anchors) {
        let href = anchor.value().attr("href").unwrap_or_default();
        if !is_absolute_http(href) {
            continue;
        }
        let text = element_text(&anchor).to_lowercase();

        if details.registration_link.is_none()
            && (contains_any(&text, REGISTRATION_INTENT_KEYWORDS)
                || contains_any(&href.to_lowercase(), REGISTRATION_INTENT_KEYWORDS))
        {
            details.registration_link = Some(href.to_string());
        }

        if details.sponsorship_link.is_none() && text.contains("sponsor") {
            details.sponsorship_link = Some(href.to_string());
        }
    }

    if details.platform.is_none() {
        details.platform = details.registration_link.as_deref().and_then(detect_from_url);
    }

    details
}

/// Crawls event detail pages and assigns registration data to events.
pub struct PlatformDetector<'a> {
    fetcher: &'a Fetcher,
    retries: u32,
}

impl<'a> PlatformDetector<'a> {
    pub fn new(fetcher: &'a Fetcher, retries: u32) -> Self {
        Self { fetcher, retries }
    }

    /// Fetch an event page and scan it. `None` when the fetch failed.
    pub async fn crawl_event_page(&self, url: &str, log: &mut ResearchLog) -> Option<EventPageDetails> {
        log.record(LogStage::Crawl, format!("Crawling event page: {}", url));

        let outcome = self.fetcher.fetch(url, self.retries, log).await;
        let html = outcome.html?;
        let details = scan_event_page(&html, url);

        log.record_with(
            LogStage::Crawl,
            "Event page result",
            json!({
                "platform": details.platform,
                "has_registration_link": details.registration_link.is_some(),
            }),
        );
        Some(details)
    }

    /// Fill platform, registration and sponsorship fields.
    ///
    /// The first `max_crawls` events that have a link get a detail crawl; the
    /// rest are classified from their link alone.
    pub async fn enrich(&self, events: &mut [Event], max_crawls: usize, log: &mut ResearchLog) {
        let mut crawls = 0;

        for event in events.iter_mut() {
            let Some(link) = event.link.clone() else {
                event.registration_platform = UNKNOWN_PLATFORM.to_string();
                continue;
            };

            let details = if crawls < max_crawls {
                crawls += 1;
                self.crawl_event_page(&link, log).await
            } else {
                None
            };

            match details {
                Some(details) => {
                    event.registration_platform = details
                        .platform
                        .unwrap_or(UNKNOWN_PLATFORM)
                        .to_string();
                    event.registration_link = details.registration_link.or(Some(link));
                    event.sponsorship_link = details.sponsorship_link;
                }
                None => {
                    event.registration_platform = detect_from_url(&link)
                        .unwrap_or(UNKNOWN_PLATFORM)
                        .to_string();
                    event.registration_link = Some(link);
                }
            }
        }

        log.record(
            LogStage::Tools,
            format!("Crawled {} event pages for registration tools", crawls),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFetcher;
    use crate::types::EventCategory;
    use std::sync::Arc;
    use std::time::Duration;

    fn event(name: &str, link: Option<&str>) -> Event {
        Event {
            name: name.to_string(),
            category: EventCategory::General,
            date: None,
            is_future: None,
            location: None,
            link: link.map(str::to_string),
            registration_platform: UNKNOWN_PLATFORM.to_string(),
            registration_link: None,
            sponsorship_link: None,
        }
    }

    #[test]
    fn test_detect_from_url_table_order() {
        assert_eq!(detect_from_url("https://www.Eventbrite.com/e/123"), Some("Eventbrite"));
        assert_eq!(detect_from_url("https://e.givesmart.com/events/abc"), Some("GiveSmart"));
        assert_eq!(detect_from_url("https://gofundme.com/charity/x"), Some("GoFundMe Charity"));
        assert_eq!(detect_from_url("https://acme.org/register"), None);
    }

    #[test]
    fn test_iframe_beats_anchor() {
        let html = r#"
            <a href="https://www.eventbrite.com/e/gala">Tickets</a>
            <iframe src="https://secure.qgiv.com/event/gala"></iframe>
        "#;
        assert_eq!(detect_from_page(html, "https://acme.org/gala"), Some("Qgiv"));
    }

    #[test]
    fn test_page_url_beats_embeds() {
        let html = r#"<iframe src="https://secure.qgiv.com/event/gala"></iframe>"#;
        assert_eq!(
            detect_from_page(html, "https://acme.givesmart.com/gala"),
            Some("GiveSmart")
        );
    }

    #[test]
    fn test_form_and_script_precedence() {
        let html = r#"
            <script src="https://cdn.bloomerang.com/widget.js"></script>
            <form action="https://handbid.com/bid"></form>
        "#;
        assert_eq!(detect_from_page(html, "https://acme.org"), Some("Handbid"));
    }

    #[test]
    fn test_scan_event_page_links() {
        let html = r#"
            <a href="/register">Register</a>
            <a href="https://acme.regfox.com/gala">Buy tickets</a>
            <a href="https://acme.org/sponsor-packet.pdf">Become a sponsor</a>
        "#;
        let details = scan_event_page(html, "https://acme.org/gala");

        assert_eq!(details.registration_link.as_deref(), Some("https://acme.regfox.com/gala"));
        assert_eq!(details.sponsorship_link.as_deref(), Some("https://acme.org/sponsor-packet.pdf"));
        assert_eq!(details.platform, Some("RegFox"));
    }

    #[test]
    fn test_registration_link_platform_never_overrides_embed() {
        let html = r#"
            <a href="https://www.eventbrite.com/e/42">Register now</a>
            <iframe src="https://acme.givesmart.com/gala"></iframe>
        "#;
        let details = scan_event_page(html, "https://acme.org/gala");

        assert_eq!(details.registration_link.as_deref(), Some("https://www.eventbrite.com/e/42"));
        assert_eq!(details.platform, Some("GiveSmart"));
    }

    #[tokio::test]
    async fn test_enrich_uses_crawl_then_falls_back() {
        let mock = MockFetcher::new().with_page(
            "https://acme.org/events/gala",
            r#"<iframe src="https://acme.onecause.com/gala"></iframe>
               <a href="https://acme.onecause.com/gala/register">Register now</a>"#,
        );
        let fetcher = Fetcher::new(Arc::new(mock), Duration::ZERO);
        let detector = PlatformDetector::new(&fetcher, 0);
        let mut events = vec![
            event("Gala", Some("https://acme.org/events/gala")),
            event("Walk", Some("https://www.eventbrite.com/e/walk")),
            event("Picnic", None),
        ];

        detector.enrich(&mut events, 8, &mut ResearchLog::new()).await;

        assert_eq!(events[0].registration_platform, "OneCause");
        assert_eq!(
            events[0].registration_link.as_deref(),
            Some("https://acme.onecause.com/gala/register")
        );
        // Crawl failed: platform from the link itself
        assert_eq!(events[1].registration_platform, "Eventbrite");
        assert_eq!(events[1].registration_link.as_deref(), Some("https://www.eventbrite.com/e/walk"));
        assert_eq!(events[2].registration_platform, UNKNOWN_PLATFORM);
        assert!(events[2].registration_link.is_none());
    }

    #[tokio::test]
    async fn test_enrich_respects_crawl_cap() {
        let mock = MockFetcher::new();
        let fetcher = Fetcher::new(Arc::new(mock.clone()), Duration::ZERO);
        let detector = PlatformDetector::new(&fetcher, 0);
        let mut events: Vec<Event> = (0..10)
            .map(|i| event(&format!("Event {}", i), Some(&format!("https://acme.org/e/{}", i))))
            .collect();

        detector.enrich(&mut events, 8, &mut ResearchLog::new()).await;

        assert_eq!(mock.get_calls().len(), 8);
        assert!(events.iter().all(|e| e.registration_link.is_some()));
    }
}
