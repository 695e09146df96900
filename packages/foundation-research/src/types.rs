use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::research_log::DebugLogEntry;
use crate::text::{domain_of, org_name_from_url};

/// The organization being researched. Immutable for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub source_url: String,
    /// Hostname without a leading `www.`
    pub domain: String,
    /// Capitalized first domain label
    pub name: String,
}

impl Organization {
    pub fn from_url(url: &str) -> Self {
        Self {
            source_url: url.to_string(),
            domain: domain_of(url),
            name: org_name_from_url(url),
        }
    }

    /// First label of the domain, lowercased (`acme` for `acme.org`).
    pub fn base_token(&self) -> String {
        self.domain
            .split('.')
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }
}

/// How the organization relates to the resolved foundation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    Owned,
    Associated,
    Sponsored,
    Unknown,
}

/// Resolution strategies, in chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStage {
    SelfCheck,
    LinkScan,
    PathProbe,
    SubdomainProbe,
    SponsorScan,
    ReverseLookup,
}

impl ResolutionStage {
    /// Human readable description used in not-found payloads.
    pub fn description(&self) -> &'static str {
        match self {
            ResolutionStage::SelfCheck => "Checked whether the main page is itself a foundation",
            ResolutionStage::LinkScan => "Checked main page for foundation links",
            ResolutionStage::PathProbe => "Checked common foundation URL paths",
            ResolutionStage::SubdomainProbe => "Checked foundation subdomains",
            ResolutionStage::SponsorScan => "Searched community/sponsorship pages",
            ResolutionStage::ReverseLookup => "Searched regional foundations' sponsor pages",
        }
    }
}

impl fmt::Display for ResolutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            ResolutionStage::SelfCheck => "self_check",
            ResolutionStage::LinkScan => "link_scan",
            ResolutionStage::PathProbe => "path_probe",
            ResolutionStage::SubdomainProbe => "subdomain_probe",
            ResolutionStage::SponsorScan => "sponsor_scan",
            ResolutionStage::ReverseLookup => "reverse_lookup",
        };
        f.write_str(tag)
    }
}

/// Why a sponsor-scan candidate was picked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SponsorContext {
    SponsorMention,
    FoundationLink,
    SponsorLogo,
}

/// A foundation found by sponsor-scan that did not win.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SponsoredCandidate {
    pub name: String,
    pub website: String,
    pub context: SponsorContext,
    pub source_page: String,
    pub confidence: u8,
}

/// The charitable entity linked to the organization.
///
/// `relationship_type` is `Some` exactly when `website` is `Some`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Foundation {
    pub name: Option<String>,
    pub website: Option<String>,
    pub mission: Option<String>,
    pub relationship_type: Option<RelationshipType>,
    pub confidence: u8,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub corroborating_pages: Vec<String>,
}

impl Foundation {
    pub fn resolved(
        name: impl Into<String>,
        website: impl Into<String>,
        relationship: RelationshipType,
        confidence: u8,
    ) -> Self {
        Self {
            name: Some(name.into()),
            website: Some(website.into()),
            mission: None,
            relationship_type: Some(relationship),
            confidence: confidence.min(100),
            corroborating_pages: Vec::new(),
        }
    }

    pub fn with_corroborating_pages(mut self, pages: Vec<String>) -> Self {
        self.corroborating_pages = pages;
        self
    }

    pub fn is_resolved(&self) -> bool {
        self.website.is_some()
    }
}

/// Event categories, assigned by the keyword ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventCategory {
    #[serde(rename = "Gala")]
    Gala,
    #[serde(rename = "Golf Tournament")]
    GolfTournament,
    #[serde(rename = "Auction")]
    Auction,
    #[serde(rename = "Walk/Run")]
    WalkRun,
    #[serde(rename = "Dinner/Luncheon")]
    DinnerLuncheon,
    #[serde(rename = "Concert")]
    Concert,
    #[serde(rename = "Festival")]
    Festival,
    #[serde(rename = "Ball")]
    Ball,
    #[serde(rename = "General Event")]
    General,
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventCategory::Gala => "Gala",
            EventCategory::GolfTournament => "Golf Tournament",
            EventCategory::Auction => "Auction",
            EventCategory::WalkRun => "Walk/Run",
            EventCategory::DinnerLuncheon => "Dinner/Luncheon",
            EventCategory::Concert => "Concert",
            EventCategory::Festival => "Festival",
            EventCategory::Ball => "Ball",
            EventCategory::General => "General Event",
        };
        f.write_str(label)
    }
}

/// Platform name used when no registration platform was detected.
pub const UNKNOWN_PLATFORM: &str = "UNKNOWN";

/// A fundraising event listed by the foundation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub category: EventCategory,
    pub date: Option<String>,
    /// `None` when the date is missing or unparsable.
    pub is_future: Option<bool>,
    pub location: Option<String>,
    pub link: Option<String>,
    pub registration_platform: String,
    pub registration_link: Option<String>,
    pub sponsorship_link: Option<String>,
}

/// Per-event registration summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationTool {
    pub event_name: String,
    pub registration_platform: String,
    pub registration_link: Option<String>,
    pub sponsorship_link: Option<String>,
}

impl From<&Event> for RegistrationTool {
    fn from(event: &Event) -> Self {
        Self {
            event_name: event.name.clone(),
            registration_platform: event.registration_platform.clone(),
            registration_link: event.registration_link.clone(),
            sponsorship_link: event.sponsorship_link.clone(),
        }
    }
}

/// A staff member relevant to events or development.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub title: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
    pub confidence: u8,
}

/// Which parts of the report produced data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionSuccess {
    pub foundation: bool,
    pub events: bool,
    pub tools: bool,
    pub contacts: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMeta {
    pub source_url: String,
    pub organization_name: String,
    pub foundation_url: Option<String>,
    pub resolution_stage: ResolutionStage,
    pub scraped_at: DateTime<Utc>,
    pub events_found: usize,
    pub contacts_found: usize,
    pub extraction_success: ExtractionSuccess,
}

/// Successful research result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub foundation: Foundation,
    pub events: Vec<Event>,
    pub registration_tools: Vec<RegistrationTool>,
    pub team_contacts: Vec<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_sponsored_foundations: Option<Vec<SponsoredCandidate>>,
    pub confidence_score: u8,
    pub meta: ReportMeta,
    pub debug_log: Vec<DebugLogEntry>,
}

/// No foundation could be resolved. A valid outcome, not a failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotFound {
    pub error: String,
    pub message: String,
    pub searched_url: String,
    pub organization_name: String,
    pub confidence_score: u8,
    pub stages_attempted: Vec<ResolutionStage>,
    pub search_steps_completed: Vec<String>,
    pub debug_log: Vec<DebugLogEntry>,
}

impl NotFound {
    pub fn new(
        org: &Organization,
        stages_attempted: Vec<ResolutionStage>,
        debug_log: Vec<DebugLogEntry>,
    ) -> Self {
        Self {
            error: "FOUNDATION_NOT_FOUND".to_string(),
            message: "Could not identify a foundation owned by, associated with, or sponsored by this organization.".to_string(),
            searched_url: org.source_url.clone(),
            organization_name: org.name.clone(),
            confidence_score: 0,
            search_steps_completed: stages_attempted
                .iter()
                .map(|s| s.description().to_string())
                .collect(),
            stages_attempted,
            debug_log,
        }
    }
}

/// Either a report or a structured not-found payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResearchOutcome {
    Report(Box<Report>),
    NotFound(NotFound),
}

impl ResearchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, ResearchOutcome::Report(_))
    }

    pub fn report(&self) -> Option<&Report> {
        match self {
            ResearchOutcome::Report(report) => Some(report),
            ResearchOutcome::NotFound(_) => None,
        }
    }
}
