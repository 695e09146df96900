//! Staff contact extraction.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::collections::HashSet;

use crate::dom::{element_text, selector};
use crate::research_log::{LogStage, ResearchLog};
use crate::text::{
    collapse_whitespace, is_placeholder_text, is_valid_email, is_valid_linkedin_url,
    is_valid_phone, normalize_text, title_case, truncate_chars,
};
use crate::types::Contact;
use crate::vocabulary::{STAFF_CONTAINER_SELECTORS, TEAM_TITLES};

const NAME_SELECTOR: &str = r#"h2, h3, h4, h5, .name, [class*="name"], strong, b"#;
const LINKEDIN_SELECTOR: &str = r#"a[href*="linkedin"]"#;

const MIN_NAME_CHARS: usize = 3;
const MAX_NAME_CHARS: usize = 100;
const MAX_LINE_NAME_CHARS: usize = 50;

const BASE_CONFIDENCE: u8 = 30;
const EMAIL_BONUS: u8 = 30;
const PHONE_BONUS: u8 = 20;
const LINKEDIN_BONUS: u8 = 20;

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap();
    static ref PHONE_REGEX: Regex =
        Regex::new(r"(?:\+1[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap();
}

/// Score a contact by which channels survived validation.
pub fn contact_confidence(has_email: bool, has_phone: bool, has_linkedin: bool) -> u8 {
    let mut score = BASE_CONFIDENCE;
    if has_email {
        score += EMAIL_BONUS;
    }
    if has_phone {
        score += PHONE_BONUS;
    }
    if has_linkedin {
        score += LINKEDIN_BONUS;
    }
    score.min(100)
}

pub struct ContactExtractor {
    max_contacts: usize,
}

impl ContactExtractor {
    pub fn new(max_contacts: usize) -> Self {
        Self { max_contacts }
    }

    /// Extract, rank and cap staff contacts from a foundation page.
    pub fn extract(&self, html: &str, log: &mut ResearchLog) -> Vec<Contact> {
        let document = Html::parse_document(html);
        let descendants = selector("*");
        let name_sel = selector(NAME_SELECTOR);
        let linkedin_sel = selector(LINKEDIN_SELECTOR);

        let mut seen = HashSet::new();
        let mut contacts = Vec::new();

        for container_selector in STAFF_CONTAINER_SELECTORS {
            let (Some(container_sel), Some(all)) = (selector(container_selector), descendants.as_ref()) else {
                continue;
            };

            for container in document.select(&container_sel) {
                for element in container.select(all) {
                    if let Some(contact) =
                        read_contact(&element, name_sel.as_ref(), linkedin_sel.as_ref(), &mut seen)
                    {
                        contacts.push(contact);
                    }
                }
            }
        }

        contacts.sort_by(|a, b| b.confidence.cmp(&a.confidence));
        log.record(LogStage::Contacts, format!("Extracted {} contacts", contacts.len()));
        contacts.truncate(self.max_contacts);
        contacts
    }
}

fn candidate_name(element: &ElementRef<'_>, name_sel: Option<&scraper::Selector>) -> Option<String> {
    let from_markup = name_sel
        .and_then(|s| element.select(s).next())
        .map(|el| element_text(&el).trim().to_string())
        .filter(|n| !n.is_empty());
    if from_markup.is_some() {
        return from_markup;
    }

    let text = element_text(element);
    let first_line = text.trim().lines().map(str::trim).find(|l| !l.is_empty())?;
    if first_line.chars().count() < MAX_LINE_NAME_CHARS {
        Some(first_line.to_string())
    } else {
        None
    }
}

fn read_contact(
    element: &ElementRef<'_>,
    name_sel: Option<&scraper::Selector>,
    linkedin_sel: Option<&scraper::Selector>,
    seen: &mut HashSet<String>,
) -> Option<Contact> {
    let text = element_text(element);
    let lower = text.to_lowercase();
    let matched_title = TEAM_TITLES.iter().find(|t| lower.contains(*t))?;

    let name = candidate_name(element, name_sel)?;
    let length = name.chars().count();
    if !(MIN_NAME_CHARS..=MAX_NAME_CHARS).contains(&length) || is_placeholder_text(&name) {
        return None;
    }

    let key = normalize_text(&name);
    // A "name" that is the title itself is not a person
    if key.contains(matched_title) || !seen.insert(key) {
        return None;
    }

    let email = EMAIL_REGEX
        .find_iter(&text)
        .map(|m| m.as_str())
        .find(|e| is_valid_email(e))
        .map(str::to_string);
    let phone = PHONE_REGEX
        .find_iter(&text)
        .map(|m| m.as_str())
        .find(|p| is_valid_phone(p))
        .map(str::to_string);
    let linkedin_url = linkedin_sel.and_then(|s| {
        element
            .select(s)
            .filter_map(|a| a.value().attr("href"))
            .find(|href| is_valid_linkedin_url(href))
            .map(str::to_string)
    });

    let confidence = contact_confidence(email.is_some(), phone.is_some(), linkedin_url.is_some());
    Some(Contact {
        name: truncate_chars(&collapse_whitespace(&name), MAX_NAME_CHARS),
        title: title_case(matched_title),
        email,
        phone,
        linkedin_url,
        confidence,
    })
}
