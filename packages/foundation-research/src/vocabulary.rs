//! Static keyword, pattern and path tables.
//!
//! Resolution and extraction policy lives here so it can be tuned and tested
//! without touching the scanning code.

use crate::types::EventCategory;

/// Words marking a page, link or domain as foundation-like.
pub const FOUNDATION_KEYWORDS: &[&str] = &[
    "foundation",
    "philanthropy",
    "giving",
    "donate",
    "donation",
    "charitable",
    "nonprofit",
    "non-profit",
    "support us",
    "make a gift",
    "ways to give",
    "give now",
    "donor",
    "fundraising",
    "development",
];

/// Wording that turns a nearby outbound link into a sponsorship signal.
pub const SPONSORSHIP_CONTEXT_KEYWORDS: &[&str] = &[
    "proud sponsor",
    "proudly sponsor",
    "we sponsor",
    "sponsor of",
    "community partner",
    "community involvement",
    "giving back",
    "corporate responsibility",
    "social responsibility",
    "csr",
    "we support",
    "proudly support",
    "proud to support",
    "supporter of",
    "partner with",
    "partnered with",
    "in partnership",
    "partnership with",
    "committed to",
    "supporting",
    "contributor",
    "donation to",
    "charitable partner",
    "nonprofit partner",
    "community support",
    "sponsored event",
    "event sponsor",
    "title sponsor",
    "presenting sponsor",
];

/// Outbound domains never treated as a sponsored foundation.
pub const SOCIAL_DOMAINS: &[&str] = &[
    "facebook.",
    "twitter.",
    "linkedin.",
    "instagram.",
    "youtube.",
    "google.",
];

/// Words that qualify a DOM region as event-shaped.
pub const EVENT_KEYWORDS: &[&str] = &[
    "event",
    "gala",
    "golf",
    "auction",
    "dinner",
    "luncheon",
    "fundraiser",
    "benefit",
    "walk",
    "run",
    "ball",
    "celebration",
    "awards",
    "ceremony",
    "concert",
    "festival",
    "tournament",
    "annual",
];

/// Event names too generic to be an event.
pub const EVENT_STOPWORD_NAMES: &[&str] = &["events", "calendar", "event"];

/// Category ladder, evaluated top to bottom; first keyword hit wins.
pub const CATEGORY_LADDER: &[(EventCategory, &[&str])] = &[
    (EventCategory::Gala, &["gala"]),
    (EventCategory::GolfTournament, &["golf"]),
    (EventCategory::Auction, &["auction"]),
    (EventCategory::WalkRun, &["walk", "run", "5k"]),
    (EventCategory::DinnerLuncheon, &["dinner", "luncheon"]),
    (EventCategory::Concert, &["concert"]),
    (EventCategory::Festival, &["festival"]),
    (EventCategory::Ball, &["ball"]),
];

/// Selectors for event-shaped regions.
pub const EVENT_REGION_SELECTORS: &[&str] = &[
    r#"[class*="event"]"#,
    r#"[id*="event"]"#,
    r#"[class*="calendar"]"#,
    r#"[id*="calendar"]"#,
    "article",
    r#"[class*="card"]"#,
    r#"[class*="listing"]"#,
    r#"[class*="upcoming"]"#,
    r#"[class*="program"]"#,
    r#"[class*="gala"]"#,
    "li",
];

/// A known registration or fundraising platform.
#[derive(Debug, Clone, Copy)]
pub struct PlatformSignature {
    pub name: &'static str,
    pub patterns: &'static [&'static str],
}

/// Registration platforms in match order.
pub const REGISTRATION_PLATFORMS: &[PlatformSignature] = &[
    PlatformSignature { name: "Eventbrite", patterns: &["eventbrite.com", "eventbrite."] },
    PlatformSignature { name: "GiveSmart", patterns: &["givesmart.com", "e.givesmart", "givesmart"] },
    PlatformSignature { name: "OneCause", patterns: &["onecause.com", "e.onecause", "onecause"] },
    PlatformSignature { name: "Classy", patterns: &["classy.org", "secure.classy", "classy"] },
    PlatformSignature { name: "Greater Giving", patterns: &["greatergiving.com", "greatergiving"] },
    PlatformSignature { name: "Blackbaud", patterns: &["blackbaud.com", "blackbaud"] },
    PlatformSignature { name: "Network for Good", patterns: &["networkforgood.com", "networkforgood"] },
    PlatformSignature { name: "Qgiv", patterns: &["qgiv.com", "secure.qgiv"] },
    PlatformSignature { name: "Handbid", patterns: &["handbid.com", "handbid"] },
    PlatformSignature { name: "BidPal", patterns: &["bidpal.com", "bidpal"] },
    PlatformSignature { name: "Bloomerang", patterns: &["bloomerang.com", "bloomerang"] },
    PlatformSignature { name: "DonorPerfect", patterns: &["donorperfect.com", "donorperfect"] },
    PlatformSignature { name: "Fundly", patterns: &["fundly.com"] },
    PlatformSignature { name: "GoFundMe Charity", patterns: &["gofundme.com/charity"] },
    PlatformSignature { name: "JustGiving", patterns: &["justgiving.com"] },
    PlatformSignature { name: "Rallybound", patterns: &["rallybound.com"] },
    PlatformSignature { name: "RegFox", patterns: &["regfox.com"] },
    PlatformSignature { name: "Splash", patterns: &["splashthat.com"] },
    PlatformSignature { name: "Wild Apricot", patterns: &["wildapricot.org", "wildapricot"] },
    PlatformSignature { name: "Active.com", patterns: &["active.com", "activenetwork"] },
];

/// Anchor text or href fragments signalling a registration link.
pub const REGISTRATION_INTENT_KEYWORDS: &[&str] = &[
    "register",
    "ticket",
    "sign up",
    "rsvp",
    "buy ticket",
    "get ticket",
    "attend",
    "join us",
];

/// Job titles relevant to event and development work.
pub const TEAM_TITLES: &[&str] = &[
    "head of events",
    "events coordinator",
    "event coordinator",
    "events manager",
    "director of development",
    "development director",
    "chief development officer",
    "database manager",
    "director of philanthropy",
    "philanthropy director",
    "major gifts officer",
    "major gifts",
    "foundation director",
    "foundation president",
    "executive director",
    "vp of development",
    "vice president of development",
    "gift officer",
    "annual giving",
    "planned giving",
    "donor relations",
    "special events",
    "event manager",
    "event director",
    "gala chair",
];

/// Containers that hold staff listings.
pub const STAFF_CONTAINER_SELECTORS: &[&str] = &[
    r#"[class*="staff"]"#,
    r#"[class*="team"]"#,
    r#"[class*="leadership"]"#,
    r#"[class*="people"]"#,
    r#"[class*="directory"]"#,
    r#"[class*="contact"]"#,
    r#"[id*="staff"]"#,
    r#"[id*="team"]"#,
    r#"[id*="leadership"]"#,
];

/// Text that marks a value as template filler rather than real content.
pub const PLACEHOLDER_PATTERNS: &[&str] = &[
    "lorem ipsum",
    "john doe",
    "jane doe",
    "example@",
    "test@",
    "your name",
    "name here",
    "email here",
    "phone here",
    "coming soon",
    "tbd",
    "to be announced",
    "placeholder",
];

/// Conventional foundation paths on an organization's own site.
pub const FOUNDATION_PAGE_PATHS: &[&str] = &[
    "/foundation",
    "/giving",
    "/donate",
    "/philanthropy",
    "/support",
    "/ways-to-give",
    "/support-us",
    "/make-a-gift",
    "/get-involved",
];

/// Subdomain prefixes a foundation is commonly hosted under.
pub const FOUNDATION_SUBDOMAINS: &[&str] = &["foundation", "giving", "donate"];

/// Event listing paths on a foundation site.
pub const EVENT_PAGE_PATHS: &[&str] = &[
    "/events",
    "/event",
    "/calendar",
    "/upcoming-events",
    "/event-calendar",
    "/fundraising-events",
    "/special-events",
    "/community-events",
    "/galas",
];

/// Pages where organizations describe community involvement and sponsorships.
pub const COMMUNITY_PAGE_PATHS: &[&str] = &[
    "/community",
    "/community-involvement",
    "/about-us",
    "/about",
    "/corporate-responsibility",
    "/csr",
    "/social-responsibility",
    "/giving-back",
    "/our-community",
    "/partnerships",
    "/partners",
    "/sponsorships",
    "/sponsor",
    "/charitable-giving",
    "/outreach",
    "/involvement",
    "/commitments",
    "/values",
    "/who-we-are",
    "/news",
    "/press",
    "/media",
    "/blog",
];

/// Pages on a foundation's site that list its sponsors and donors.
pub const DONOR_PAGE_PATHS: &[&str] = &[
    "/sponsors",
    "/our-sponsors",
    "/donors",
    "/our-donors",
    "/partners",
    "/corporate-partners",
    "/supporters",
    "/annual-report",
];

/// Title words that say nothing about who the organization is.
pub const GENERIC_TITLE_WORDS: &[&str] = &[
    "home",
    "homepage",
    "welcome",
    "to",
    "the",
    "official",
    "site",
    "website",
    "web",
    "page",
    "main",
    "index",
    "of",
    "and",
    "our",
    "us",
    "about",
];

/// Place name found in page text and the region tag it maps to.
#[derive(Debug, Clone, Copy)]
pub struct Place {
    pub name: &'static str,
    pub region: &'static str,
}

/// Place vocabulary used to guess an organization's service area.
pub const PLACES: &[Place] = &[
    Place { name: "minneapolis", region: "minnesota" },
    Place { name: "st. paul", region: "minnesota" },
    Place { name: "saint paul", region: "minnesota" },
    Place { name: "twin cities", region: "minnesota" },
    Place { name: "minnesota", region: "minnesota" },
    Place { name: ", mn ", region: "minnesota" },
    Place { name: "chicago", region: "illinois" },
    Place { name: "illinois", region: "illinois" },
    Place { name: ", il ", region: "illinois" },
    Place { name: "san francisco", region: "bay-area" },
    Place { name: "oakland", region: "bay-area" },
    Place { name: "bay area", region: "bay-area" },
    Place { name: "los angeles", region: "southern-california" },
    Place { name: "new york", region: "new-york" },
    Place { name: "brooklyn", region: "new-york" },
    Place { name: "manhattan", region: "new-york" },
    Place { name: "boston", region: "massachusetts" },
    Place { name: "massachusetts", region: "massachusetts" },
    Place { name: "cleveland", region: "ohio" },
    Place { name: "columbus", region: "ohio" },
    Place { name: "ohio", region: "ohio" },
    Place { name: "seattle", region: "washington" },
    Place { name: "tacoma", region: "washington" },
];

/// A foundation known to publish sponsor or donor lists.
#[derive(Debug, Clone, Copy)]
pub struct KnownFoundation {
    pub name: &'static str,
    pub website: &'static str,
    pub regions: &'static [&'static str],
}

/// Registry consulted by reverse lookup, in fallback order.
pub const KNOWN_FOUNDATIONS: &[KnownFoundation] = &[
    KnownFoundation {
        name: "The Minneapolis Foundation",
        website: "https://www.minneapolisfoundation.org",
        regions: &["minnesota"],
    },
    KnownFoundation {
        name: "Saint Paul & Minnesota Foundation",
        website: "https://www.spmcf.org",
        regions: &["minnesota"],
    },
    KnownFoundation {
        name: "The Chicago Community Trust",
        website: "https://www.cct.org",
        regions: &["illinois"],
    },
    KnownFoundation {
        name: "The San Francisco Foundation",
        website: "https://sff.org",
        regions: &["bay-area"],
    },
    KnownFoundation {
        name: "California Community Foundation",
        website: "https://www.calfund.org",
        regions: &["southern-california"],
    },
    KnownFoundation {
        name: "The New York Community Trust",
        website: "https://www.nycommunitytrust.org",
        regions: &["new-york"],
    },
    KnownFoundation {
        name: "The Boston Foundation",
        website: "https://www.tbf.org",
        regions: &["massachusetts"],
    },
    KnownFoundation {
        name: "The Cleveland Foundation",
        website: "https://www.clevelandfoundation.org",
        regions: &["ohio"],
    },
    KnownFoundation {
        name: "Seattle Foundation",
        website: "https://www.seattlefoundation.org",
        regions: &["washington"],
    },
];

/// True if any keyword from `table` occurs in `haystack` (already lowercased).
pub fn contains_any(haystack: &str, table: &[&str]) -> bool {
    table.iter().any(|k| haystack.contains(k))
}
