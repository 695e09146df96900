//! Text, URL and field-validation helpers shared by every stage.

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::vocabulary::PLACEHOLDER_PATTERNS;

lazy_static! {
    static ref WHITESPACE_REGEX: Regex = Regex::new(r"\s+").unwrap();

    // Anchored form of the contact email pattern
    static ref EMAIL_EXACT_REGEX: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();

    static ref UNSAFE_URL_CHARS: Regex = Regex::new(r#"[<>"']"#).unwrap();
}

/// Collapse whitespace, trim and lowercase. Used as the dedup key for events
/// and contacts.
pub fn normalize_text(text: &str) -> String {
    WHITESPACE_REGEX
        .replace_all(text, " ")
        .trim()
        .to_lowercase()
}

/// Collapse whitespace and trim, preserving case.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_REGEX.replace_all(text, " ").trim().to_string()
}

/// True for empty, one-character or template filler text.
pub fn is_placeholder_text(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    if lower.chars().count() < 2 {
        return true;
    }
    PLACEHOLDER_PATTERNS.iter().any(|p| lower.contains(p))
}

/// Truncate to at most `max` characters on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Capitalize the first letter of every space-separated word.
pub fn title_case(phrase: &str) -> String {
    phrase
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Hostname without a leading `www.`; falls back to the input when unparsable.
pub fn domain_of(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or_default();
            host.strip_prefix("www.").unwrap_or(host).to_lowercase()
        }
        Err(_) => url.to_string(),
    }
}

/// `scheme://host` of a URL; falls back to the input when unparsable.
pub fn base_url_of(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => format!(
            "{}://{}",
            parsed.scheme(),
            parsed.host_str().unwrap_or_default()
        ),
        Err(_) => url.trim_end_matches('/').to_string(),
    }
}

/// Last two labels of the domain (`acme.org` for `events.acme.org`).
pub fn registrable_domain(domain: &str) -> String {
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() <= 2 {
        return domain.to_string();
    }
    labels[labels.len() - 2..].join(".")
}

/// Display name derived from the first domain label, capitalized.
pub fn org_name_from_url(url: &str) -> String {
    let domain = domain_of(url);
    let token = domain.split('.').next().unwrap_or_default();
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// First segment of a page title before `|`, `-` or `:`.
pub fn title_segment(title: &str) -> String {
    title
        .split('|')
        .next()
        .and_then(|s| s.split('-').next())
        .and_then(|s| s.split(':').next())
        .map(collapse_whitespace)
        .unwrap_or_default()
}

/// Resolve an href against a page URL, keeping only http(s) targets.
///
/// Absolute http(s) hrefs are returned as written; relative ones are joined
/// onto `base` with the fragment dropped. `javascript:`, `mailto:`, `tel:`
/// and fragment-only hrefs resolve to `None`.
pub fn resolve_href(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
    {
        return None;
    }
    if is_absolute_http(href) {
        return Url::parse(href).ok().map(|_| href.to_string());
    }
    let mut resolved = base.join(href).ok()?;
    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }
    resolved.set_fragment(None);
    Some(resolved.to_string())
}

/// True for absolute http(s) hrefs.
pub fn is_absolute_http(href: &str) -> bool {
    href.starts_with("http://") || href.starts_with("https://")
}

/// Validate an email address and reject template addresses.
pub fn is_valid_email(email: &str) -> bool {
    if !EMAIL_EXACT_REGEX.is_match(email) {
        return false;
    }
    let lower = email.to_lowercase();
    !PLACEHOLDER_PATTERNS.iter().any(|p| lower.contains(p))
}

/// US numbers: 10 digits, or 11 with a country code.
pub fn is_valid_phone(phone: &str) -> bool {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    (10..=11).contains(&digits)
}

/// LinkedIn personal profile URL (`linkedin.com/in/...`).
pub fn is_valid_linkedin_url(url: &str) -> bool {
    if !url.contains("linkedin.com/in/") {
        return false;
    }
    match Url::parse(url) {
        Ok(parsed) => parsed
            .host_str()
            .map(|host| host.contains("linkedin.com"))
            .unwrap_or(false),
        Err(_) => false,
    }
}

/// Normalize user input into a fetchable URL: trim, drop `<>"'`, default to
/// `https://`, strip one trailing slash.
pub fn normalize_input_url(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let cleaned = UNSAFE_URL_CHARS.replace_all(trimmed, "").to_string();
    let with_scheme = if cleaned.starts_with("http://") || cleaned.starts_with("https://") {
        cleaned
    } else {
        format!("https://{}", cleaned)
    };
    let normalized = with_scheme
        .strip_suffix('/')
        .map(str::to_string)
        .unwrap_or(with_scheme);

    let parsed = Url::parse(&normalized).ok()?;
    parsed.host_str()?;
    Some(normalized)
}
