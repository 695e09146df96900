//! Foundation Research
//!
//! Given an organization's website, find the charitable foundation it owns,
//! is associated with or sponsors, then harvest that foundation's upcoming
//! fundraising events, the registration platform behind each event, and the
//! staff who run events and development.
//!
//! # Pipeline
//!
//! 1. Fetch the organization home page (the only fatal step).
//! 2. Resolve a foundation through an ordered chain of strategies:
//!    self-check, link-scan, path-probe, subdomain-probe, sponsor-scan and
//!    reverse-lookup. The first candidate wins.
//! 3. Fetch the foundation site; extract events from it and from up to three
//!    event-listing pages.
//! 4. Crawl event detail pages to detect registration platforms.
//! 5. Extract staff contacts and score the whole report.
//!
//! Every stage tolerates failure: a broken page or a missing element means
//! less output, never an aborted request.
//!
//! # Usage
//!
//! ```rust,ignore
//! use foundation_research::{ResearchConfig, Researcher};
//!
//! let researcher = Researcher::new(ResearchConfig::from_env()?)?;
//! match researcher.research("https://www.acmehealth.org").await {
//!     Ok(outcome) => println!("{}", serde_json::to_string_pretty(&outcome)?),
//!     Err(failure) => eprintln!("{} ({})", failure, failure.status_code()),
//! }
//! ```
//!
//! # Modules
//!
//! - [`traits`] - `PageFetcher` and `ResolutionStrategy` seams
//! - [`fetcher`] - reqwest fetcher and retry policy
//! - [`relationships`] - foundation resolution strategies
//! - [`events`], [`detector`], [`contacts`] - content extractors
//! - [`confidence`] - report-level score
//! - [`pipeline`] - the end-to-end `Researcher`
//! - [`testing`] - `MockFetcher` for tests

pub mod confidence;
pub mod config;
pub mod contacts;
pub mod detector;
pub mod dom;
pub mod error;
pub mod events;
pub mod fetcher;
pub mod pipeline;
pub mod relationships;
pub mod research_log;
pub mod testing;
pub mod text;
pub mod traits;
pub mod types;
pub mod vocabulary;

// Re-export core types at crate root
pub use config::{ConfidenceWeights, ResearchConfig};
pub use error::{FetchError, ResearchError, ResearchFailure, Result};
pub use fetcher::{FetchOutcome, Fetcher, HttpFetcher};
pub use pipeline::Researcher;
pub use relationships::{RelationshipResolver, Resolution, ResolutionContext};
pub use research_log::{DebugLogEntry, LogStage, ResearchLog};
pub use text::normalize_input_url;
pub use traits::{FetchedPage, PageFetcher, ResolutionStrategy};
pub use types::{
    Contact, Event, EventCategory, Foundation, NotFound, Organization, RegistrationTool,
    RelationshipType, Report, ReportMeta, ResearchOutcome, ResolutionStage, SponsorContext,
    SponsoredCandidate,
};
