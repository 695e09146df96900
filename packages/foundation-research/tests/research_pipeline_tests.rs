//! Integration tests for the research pipeline.
//!
//! Drives `Researcher::research` end to end against `MockFetcher`:
//! - each resolution strategy can win
//! - events, registration tools and contacts flow into the report
//! - not-found and failure outcomes carry their stage lists and logs

use chrono::NaiveDate;
use foundation_research::testing::MockFetcher;
use foundation_research::{
    ConfidenceWeights, EventCategory, LogStage, RelationshipType, ResearchConfig,
    ResearchOutcome, Researcher, ResolutionStage, SponsorContext,
};
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// Test Helpers
// =============================================================================

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
}

fn researcher(mock: &MockFetcher) -> Researcher {
    let config = ResearchConfig::default().with_retry_delay(Duration::ZERO);
    Researcher::with_fetcher(config, Arc::new(mock.clone())).with_today(today())
}

const ACME_HOME: &str = r#"
<html>
  <head><title>Acme Health | Care close to home</title></head>
  <body>
    <nav><a href="/about">About</a> <a href="/foundation">Acme Health Foundation</a></nav>
  </body>
</html>
"#;

const ACME_FOUNDATION: &str = r#"
<html>
  <head>
    <title>Acme Health Foundation | Giving</title>
    <meta name="description" content="Funding community health across the region.">
  </head>
  <body>
    <div class="event-item">
      <h3>Annual Gala</h3>
      <p>October 12, 2024</p>
      <a href="/events/gala">Details</a>
    </div>
    <div class="event-item">
      <h3>Golf Classic</h3>
      <p>March 3, 2020</p>
    </div>
    <div class="staff">
      <div class="person">
        <h4>Jane Rivera</h4>
        <p>Director of Development</p>
        <p>jrivera@acmehealth.org</p>
      </div>
    </div>
  </body>
</html>
"#;

const ACME_EVENTS: &str = r#"
<html>
  <body>
    <article>
      <h2>  annual   GALA </h2>
      <p>Oct 12</p>
    </article>
    <article>
      <h2>Fun Run 5K</h2>
      <p>May 4</p>
      <a href="https://www.eventbrite.com/e/fun-run">Register</a>
    </article>
  </body>
</html>
"#;

const ACME_GALA_DETAIL: &str = r#"
<html>
  <body>
    <a href="https://www.eventbrite.com/e/123">Buy tickets</a>
    <iframe src="https://acme.givesmart.com/gala"></iframe>
    <a href="https://acmehealth.org/gala/sponsors">Sponsor the gala</a>
  </body>
</html>
"#;

fn acme_site() -> MockFetcher {
    MockFetcher::new()
        .with_page("https://acmehealth.org", ACME_HOME)
        .with_page("https://acmehealth.org/foundation", ACME_FOUNDATION)
        .with_page("https://acmehealth.org/events", ACME_EVENTS)
        .with_page("https://acmehealth.org/events/gala", ACME_GALA_DETAIL)
}

// =============================================================================
// Resolution Tests
// =============================================================================

#[tokio::test]
async fn test_self_check_resolves_foundation_home_page() {
    let mock = MockFetcher::new().with_page(
        "https://riverfoundation.org",
        "<html><head><title>River Community Foundation - Home</title></head><body></body></html>",
    );

    let outcome = researcher(&mock).research("https://riverfoundation.org").await.unwrap();
    let report = outcome.report().expect("expected a report");

    assert_eq!(report.meta.resolution_stage, ResolutionStage::SelfCheck);
    assert_eq!(report.foundation.relationship_type, Some(RelationshipType::Owned));
    assert_eq!(report.foundation.confidence, 95);
    assert_eq!(report.foundation.website.as_deref(), Some("https://riverfoundation.org"));
    assert_eq!(report.foundation.name.as_deref(), Some("River Community Foundation"));
}

#[tokio::test]
async fn test_link_scan_report_end_to_end() {
    let mock = acme_site();

    let outcome = researcher(&mock).research("https://acmehealth.org").await.unwrap();
    let report = outcome.report().expect("expected a report");

    // Foundation
    assert_eq!(report.meta.resolution_stage, ResolutionStage::LinkScan);
    assert_eq!(report.foundation.relationship_type, Some(RelationshipType::Owned));
    assert_eq!(report.foundation.confidence, 85);
    assert_eq!(report.foundation.name.as_deref(), Some("Acme Health Foundation"));
    assert_eq!(
        report.foundation.mission.as_deref(),
        Some("Funding community health across the region.")
    );

    // Events: past "Golf Classic" dropped, duplicate gala collapsed
    let names: Vec<&str> = report.events.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Annual Gala", "Fun Run 5K"]);
    assert_eq!(report.events[0].category, EventCategory::Gala);
    assert_eq!(report.events[1].category, EventCategory::WalkRun);
    assert!(report.events.iter().all(|e| e.is_future == Some(true)));

    // Registration tools: iframe beats anchor on the gala page
    let gala = &report.registration_tools[0];
    assert_eq!(gala.registration_platform, "GiveSmart");
    assert_eq!(gala.registration_link.as_deref(), Some("https://www.eventbrite.com/e/123"));
    assert_eq!(
        gala.sponsorship_link.as_deref(),
        Some("https://acmehealth.org/gala/sponsors")
    );
    let run = &report.registration_tools[1];
    assert_eq!(run.registration_platform, "Eventbrite");
    assert_eq!(run.registration_link.as_deref(), Some("https://www.eventbrite.com/e/fun-run"));

    // Contacts
    assert_eq!(report.team_contacts.len(), 1);
    assert_eq!(report.team_contacts[0].name, "Jane Rivera");
    assert_eq!(report.team_contacts[0].title, "Director Of Development");
    assert_eq!(report.team_contacts[0].confidence, 60);

    // (85 + 70 + 60) / 3
    assert_eq!(report.confidence_score, 72);
    assert_eq!(report.meta.events_found, 2);
    assert_eq!(report.meta.contacts_found, 1);
    assert!(report.meta.extraction_success.tools);
    assert!(report.other_sponsored_foundations.is_none());
}

#[tokio::test]
async fn test_path_probe_with_one_event_scores_75() {
    let mock = MockFetcher::new()
        .with_page(
            "https://plainco.com",
            "<html><head><title>Plainco</title></head><body><p>Widgets and more.</p></body></html>",
        )
        .with_page(
            "https://plainco.com/foundation",
            r#"<html><head><title>Plainco Cares</title></head><body>
               <article><h2>Spring Gala</h2><p>June 5</p></article>
               </body></html>"#,
        );

    let outcome = researcher(&mock).research("https://plainco.com").await.unwrap();
    let report = outcome.report().expect("expected a report");

    assert_eq!(report.meta.resolution_stage, ResolutionStage::PathProbe);
    assert_eq!(report.foundation.confidence, 80);
    assert_eq!(report.events.len(), 1);
    assert_eq!(report.events[0].registration_platform, "UNKNOWN");
    assert!(report.team_contacts.is_empty());
    assert_eq!(report.confidence_score, 75);
    assert!(!report.meta.extraction_success.tools);
}

#[tokio::test]
async fn test_configured_weights_flow_into_scores() {
    let mock = MockFetcher::new()
        .with_page("https://plainco.com", "<html><head><title>Plainco</title></head></html>")
        .with_page(
            "https://plainco.com/foundation",
            "<article><h2>Spring Gala</h2><p>June 5</p></article>",
        );
    let weights = ConfidenceWeights {
        path_probe: 90,
        ..ConfidenceWeights::default()
    };
    let config = ResearchConfig::default()
        .with_retry_delay(Duration::ZERO)
        .with_weights(weights);
    let researcher = Researcher::with_fetcher(config, Arc::new(mock)).with_today(today());

    let outcome = researcher.research("https://plainco.com").await.unwrap();
    let report = outcome.report().expect("expected a report");

    assert_eq!(report.foundation.confidence, 90);
    // (90 + 70) / 2
    assert_eq!(report.confidence_score, 80);
}

#[tokio::test]
async fn test_sponsor_scan_reports_runners_up() {
    let mock = MockFetcher::new()
        .with_page(
            "https://bolthardware.com",
            r#"<html><head><title>Bolt Hardware</title></head><body>
               <p>We are a proud sponsor of <a href="https://riverkids.org">River Kids</a></p>
               <p>Community partner: <a href="https://parkfriends.org">Park Friends</a></p>
               </body></html>"#,
        )
        .with_page(
            "https://riverkids.org",
            "<html><head><title>River Kids - Home</title></head><body></body></html>",
        );

    let outcome = researcher(&mock).research("https://bolthardware.com").await.unwrap();
    let report = outcome.report().expect("expected a report");

    assert_eq!(report.meta.resolution_stage, ResolutionStage::SponsorScan);
    assert_eq!(report.foundation.relationship_type, Some(RelationshipType::Sponsored));
    assert_eq!(report.foundation.website.as_deref(), Some("https://riverkids.org"));
    assert_eq!(report.foundation.name.as_deref(), Some("River Kids"));
    assert_eq!(report.confidence_score, 75);

    let others = report.other_sponsored_foundations.as_ref().unwrap();
    assert_eq!(others.len(), 1);
    assert_eq!(others[0].website, "https://parkfriends.org");
    assert_eq!(others[0].context, SponsorContext::SponsorMention);
}

#[tokio::test]
async fn test_unreachable_foundation_still_reports() {
    let mock = MockFetcher::new().with_page(
        "https://acmehealth.org",
        r#"<html><head><title>Acme Health</title></head>
           <body><a href="https://acmehealthfoundation.org">Our foundation</a></body></html>"#,
    );

    let outcome = researcher(&mock).research("https://acmehealth.org").await.unwrap();
    let report = outcome.report().expect("expected a report");

    assert_eq!(report.foundation.website.as_deref(), Some("https://acmehealthfoundation.org"));
    assert!(report.events.is_empty());
    assert!(report.team_contacts.is_empty());
    assert_eq!(report.confidence_score, 85);
}

// =============================================================================
// Harvest Tests
// =============================================================================

#[tokio::test]
async fn test_event_listing_pages_capped_at_three() {
    let listings = [
        ("/events", "Spring Gala"),
        ("/event", "Golf Classic"),
        ("/calendar", "Charity Auction"),
        ("/upcoming-events", "Fun Run"),
        ("/event-calendar", "Winter Ball"),
    ];
    let mock = MockFetcher::new().with_page(
        "https://riverfoundation.org",
        "<html><head><title>River Foundation</title></head><body></body></html>",
    );
    for (path, name) in listings {
        mock.add_page(
            &format!("https://riverfoundation.org{}", path),
            &format!("<article><h2>{}</h2><p>June 5</p></article>", name),
        );
    }

    let outcome = researcher(&mock).research("https://riverfoundation.org").await.unwrap();
    let report = outcome.report().expect("expected a report");

    let names: Vec<&str> = report.events.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Spring Gala", "Golf Classic", "Charity Auction"]);
    assert_eq!(mock.get_call_count("https://riverfoundation.org/calendar"), 1);
    assert_eq!(mock.get_call_count("https://riverfoundation.org/upcoming-events"), 0);
    assert_eq!(mock.get_call_count("https://riverfoundation.org/event-calendar"), 0);
}

#[tokio::test]
async fn test_event_links_resolve_against_redirected_url() {
    let mock = MockFetcher::new()
        .with_page("https://acmehealth.org", ACME_HOME)
        .with_page(
            "https://acmehealth.org/foundation",
            r#"<div class="event-item"><h3>Annual Gala</h3><p>October 12, 2024</p>
               <a href="gala">Details</a></div>"#,
        )
        .with_redirect(
            "https://acmehealth.org/foundation",
            "https://giving.acmehealth.org/foundation/",
        );

    let outcome = researcher(&mock).research("https://acmehealth.org").await.unwrap();
    let report = outcome.report().expect("expected a report");

    assert_eq!(report.events.len(), 1);
    assert_eq!(
        report.events[0].link.as_deref(),
        Some("https://giving.acmehealth.org/foundation/gala")
    );
    // Detail crawl fails, so the link itself is the registration link
    assert_eq!(
        report.events[0].registration_link.as_deref(),
        Some("https://giving.acmehealth.org/foundation/gala")
    );
}

// =============================================================================
// Not Found / Failure Tests
// =============================================================================

#[tokio::test]
async fn test_not_found_lists_every_stage() {
    let mock = MockFetcher::new().with_page(
        "https://plainco.com",
        "<html><head><title>Plainco</title></head><body><p>Widgets.</p></body></html>",
    );

    let outcome = researcher(&mock).research("https://plainco.com").await.unwrap();

    let ResearchOutcome::NotFound(not_found) = outcome else {
        panic!("expected not found");
    };
    assert_eq!(not_found.error, "FOUNDATION_NOT_FOUND");
    assert_eq!(not_found.confidence_score, 0);
    assert_eq!(not_found.organization_name, "Plainco");
    assert_eq!(
        not_found.stages_attempted,
        vec![
            ResolutionStage::SelfCheck,
            ResolutionStage::LinkScan,
            ResolutionStage::PathProbe,
            ResolutionStage::SubdomainProbe,
            ResolutionStage::SponsorScan,
            ResolutionStage::ReverseLookup,
        ]
    );
    assert_eq!(not_found.search_steps_completed.len(), 6);
    assert!(!not_found.debug_log.is_empty());
}

#[tokio::test]
async fn test_initial_fetch_failure_is_fatal() {
    let mock = MockFetcher::new();

    let failure = researcher(&mock)
        .research("https://down.example")
        .await
        .unwrap_err();

    assert_eq!(failure.status_code(), 502);
    // One attempt plus two retries
    assert_eq!(mock.get_call_count("https://down.example"), 3);
    assert!(failure.debug_log.iter().any(|e| e.stage == LogStage::Error));
}

#[tokio::test]
async fn test_malformed_url_rejected() {
    let failure = researcher(&MockFetcher::new())
        .research("not a url")
        .await
        .unwrap_err();
    assert_eq!(failure.status_code(), 400);
}

#[tokio::test]
async fn test_concurrent_requests_keep_separate_logs() {
    let mock = acme_site().with_page(
        "https://plainco.com",
        "<html><head><title>Plainco</title></head><body></body></html>",
    );
    let researcher = researcher(&mock);

    let (acme, plain) = tokio::join!(
        researcher.research("https://acmehealth.org"),
        researcher.research("https://plainco.com"),
    );

    let acme = acme.unwrap();
    let plain = plain.unwrap();
    assert!(acme.is_found());
    assert!(!plain.is_found());

    let ResearchOutcome::NotFound(plain) = plain else {
        panic!("expected not found");
    };
    assert!(plain
        .debug_log
        .iter()
        .all(|e| !e.message.contains("acmehealth.org")));
}
