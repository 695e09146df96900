//! Event extraction from foundation pages.
//!
//! One [`EventExtractor`] lives for a whole request so names seen on the
//! foundation page also block duplicates on the event-listing pages.

use chrono::{Datelike, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html};
use serde_json::json;
use std::collections::HashSet;
use url::Url;

use crate::dom::{element_text, selector};
use crate::research_log::{LogStage, ResearchLog};
use crate::text::{collapse_whitespace, is_placeholder_text, normalize_text, resolve_href, truncate_chars};
use crate::types::{Event, EventCategory, UNKNOWN_PLATFORM};
use crate::vocabulary::{
    contains_any, CATEGORY_LADDER, EVENT_KEYWORDS, EVENT_REGION_SELECTORS, EVENT_STOPWORD_NAMES,
};

const NAME_SELECTOR: &str =
    r#"h1, h2, h3, h4, h5, .title, [class*="title"], [class*="name"], [class*="heading"]"#;
const LOCATION_SELECTOR: &str =
    r#"[class*="location"], [class*="venue"], [class*="place"], address"#;

const MIN_NAME_CHARS: usize = 3;
const MAX_NAME_CHARS: usize = 200;
const STORED_NAME_CHARS: usize = 150;
const MAX_LOCATION_CHARS: usize = 150;

lazy_static! {
    static ref DATE_REGEX: Regex = Regex::new(
        r"(?i)(?P<month>jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(?P<day>\d{1,2})(?:st|nd|rd|th)?(?:,?\s+(?P<year>\d{4}))?|(?P<num_month>\d{1,2})/(?P<num_day>\d{1,2})/(?P<num_year>\d{2,4})"
    )
    .unwrap();
}

fn month_number(prefix: &str) -> Option<u32> {
    let month = match prefix.to_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// First date-looking substring of `text`.
pub fn find_date(text: &str) -> Option<String> {
    DATE_REGEX.find(text).map(|m| m.as_str().to_string())
}

/// Whether a raw date string lies today or later.
///
/// A date without a year that has already passed this year is taken to mean
/// next year. Returns `None` when the string cannot be read as a calendar date.
pub fn is_future_date(raw: &str, today: NaiveDate) -> Option<bool> {
    let caps = DATE_REGEX.captures(raw)?;

    let (month, day, year) = if let Some(month) = caps.name("month") {
        let month = month_number(month.as_str())?;
        let day: u32 = caps.name("day")?.as_str().parse().ok()?;
        let year = match caps.name("year") {
            Some(y) => Some(y.as_str().parse::<i32>().ok()?),
            None => None,
        };
        (month, day, year)
    } else {
        let month: u32 = caps.name("num_month")?.as_str().parse().ok()?;
        let day: u32 = caps.name("num_day")?.as_str().parse().ok()?;
        let year: i32 = caps.name("num_year")?.as_str().parse().ok()?;
        let year = if year < 100 { 2000 + year } else { year };
        (month, day, Some(year))
    };

    let date = NaiveDate::from_ymd_opt(year.unwrap_or(today.year()), month, day)?;
    let date = if year.is_none() && date < today {
        NaiveDate::from_ymd_opt(today.year() + 1, month, day)?
    } else {
        date
    };

    Some(date >= today)
}

/// Category from the region text; first ladder entry with a keyword hit wins.
pub fn categorize(text_lower: &str) -> EventCategory {
    CATEGORY_LADDER
        .iter()
        .find(|(_, keywords)| contains_any(text_lower, keywords))
        .map(|(category, _)| *category)
        .unwrap_or(EventCategory::General)
}

pub struct EventExtractor {
    today: NaiveDate,
    seen: HashSet<String>,
}

impl EventExtractor {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            seen: HashSet::new(),
        }
    }

    /// Extract events from one page. Names already seen in this request are
    /// skipped.
    pub fn extract(&mut self, html: &str, page_url: &str, log: &mut ResearchLog) -> Vec<Event> {
        let Ok(base) = Url::parse(page_url) else {
            log.record(LogStage::Events, format!("Unparsable page URL: {}", page_url));
            return Vec::new();
        };

        let document = Html::parse_document(html);
        let name_sel = selector(NAME_SELECTOR);
        let anchor_sel = selector("a");
        let location_sel = selector(LOCATION_SELECTOR);

        let mut events = Vec::new();
        for region_selector in EVENT_REGION_SELECTORS {
            let Some(region_sel) = selector(region_selector) else {
                continue;
            };

            for region in document.select(&region_sel) {
                let text = element_text(&region);
                let text_lower = text.to_lowercase();
                if !contains_any(&text_lower, EVENT_KEYWORDS) && !DATE_REGEX.is_match(&text) {
                    continue;
                }

                let Some(name) = self.claim_name(&region, name_sel.as_ref(), anchor_sel.as_ref()) else {
                    continue;
                };

                let date = find_date(&text);
                let is_future = date.as_deref().and_then(|d| is_future_date(d, self.today));
                if is_future == Some(false) {
                    log.record_with(
                        LogStage::Events,
                        format!("Skipping past event: {}", name),
                        json!({ "date": date }),
                    );
                    continue;
                }

                events.push(Event {
                    name: truncate_chars(&name, STORED_NAME_CHARS),
                    category: categorize(&text_lower),
                    date,
                    is_future,
                    location: location_sel.as_ref().and_then(|s| first_location(&region, s)),
                    link: anchor_sel.as_ref().and_then(|s| first_link(&region, s, &base)),
                    registration_platform: UNKNOWN_PLATFORM.to_string(),
                    registration_link: None,
                    sponsorship_link: None,
                });
            }
        }

        log.record(
            LogStage::Events,
            format!("Extracted {} events from {}", events.len(), page_url),
        );
        events
    }

    /// Pick the region's name and mark it seen. `None` when it is unusable
    /// or a duplicate.
    fn claim_name(
        &mut self,
        region: &ElementRef<'_>,
        name_sel: Option<&scraper::Selector>,
        anchor_sel: Option<&scraper::Selector>,
    ) -> Option<String> {
        let first_text = |sel: Option<&scraper::Selector>| {
            sel.and_then(|s| region.select(s).next())
                .map(|el| element_text(&el).trim().to_string())
                .filter(|t| !t.is_empty())
        };
        let name = first_text(name_sel).or_else(|| first_text(anchor_sel))?;

        let length = name.chars().count();
        if !(MIN_NAME_CHARS..=MAX_NAME_CHARS).contains(&length) {
            return None;
        }

        let key = normalize_text(&name);
        if self.seen.contains(&key)
            || EVENT_STOPWORD_NAMES.contains(&key.as_str())
            || is_placeholder_text(&name)
        {
            return None;
        }
        self.seen.insert(key);

        Some(collapse_whitespace(&name))
    }
}

fn first_location(region: &ElementRef<'_>, location_sel: &scraper::Selector) -> Option<String> {
    region
        .select(location_sel)
        .map(|el| element_text(&el).trim().to_string())
        .find(|text| {
            let length = text.chars().count();
            length > MIN_NAME_CHARS && length < MAX_LOCATION_CHARS && !is_placeholder_text(text)
        })
        .map(|text| collapse_whitespace(&text))
}

fn first_link(region: &ElementRef<'_>, anchor_sel: &scraper::Selector, base: &Url) -> Option<String> {
    let href = region.select(anchor_sel).next()?.value().attr("href")?;
    resolve_href(base, href)
}
