//! Pure extraction heuristics over fetched text.
//!
//! Nothing in this module touches the network. Two families of helpers live
//! here:
//!
//! - [`resolve_posted_date`]: turn free-text phrases like "3 days ago" into
//!   absolute timestamps
//! - [`extract_contact_info`]: pull emails, phone numbers, and LinkedIn
//!   profiles out of posting text
//!
//! Both take their inputs as plain strings so scrapers can feed them whatever
//! fragment of a listing they parsed out.

use crate::models::ContactInfo;
use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static DAYS_AGO: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s+days?\s+ago").unwrap());
static HOURS_AGO: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s+hours?\s+ago").unwrap());

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());

/// Phone patterns ordered by specificity; the first pattern that matches
/// anywhere in the text wins.
static PHONE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // Indian mobile, contiguous: optional +91, then 10 digits starting 6-9
        Regex::new(r"(?:\+91[-\s]?)?[6-9]\d{9}").unwrap(),
        // Indian mobile with a separator after the fifth digit
        Regex::new(r"(?:\+91[-\s]?)?[6-9]\d{4}[-\s]?\d{5}").unwrap(),
    ]
});

static LINKEDIN_PROFILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"linkedin\.com/in/[\w-]+").unwrap());

/// Resolve a free-text date phrase to an absolute timestamp.
///
/// Rules are evaluated in order, first match wins:
///
/// | input                    | result          |
/// |--------------------------|-----------------|
/// | empty / whitespace       | `None`          |
/// | "`N` day(s) ago"         | `now - N days`  |
/// | "`N` hour(s) ago"        | `now - N hours` |
/// | contains "yesterday"     | `now - 1 day`   |
/// | contains "today"         | `now`           |
/// | anything else            | `now`           |
///
/// The "anything else → now" fallback deliberately treats an unrecognized
/// format as "assume current" rather than failing the record; a missing date
/// is the distinct `None` case.
pub fn resolve_posted_date(raw: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let phrase = raw.trim().to_lowercase();
    if phrase.is_empty() {
        return None;
    }

    if let Some(caps) = DAYS_AGO.captures(&phrase) {
        if let Ok(days) = caps[1].parse::<i64>() {
            return Some(now - Duration::days(days));
        }
    }

    if let Some(caps) = HOURS_AGO.captures(&phrase) {
        if let Ok(hours) = caps[1].parse::<i64>() {
            return Some(now - Duration::hours(hours));
        }
    }

    if phrase.contains("yesterday") {
        return Some(now - Duration::days(1));
    }

    if phrase.contains("today") {
        return Some(now);
    }

    Some(now)
}

/// Extract contact information from free text.
///
/// Applies the email, phone, and LinkedIn patterns independently, taking the
/// first match of each. Returns `None` when none of the three matched, so an
/// absent contact never materializes as an empty struct.
pub fn extract_contact_info(text: &str) -> Option<ContactInfo> {
    if text.is_empty() {
        return None;
    }

    let mut contact = ContactInfo::default();

    if let Some(m) = EMAIL.find(text) {
        contact.email = Some(m.as_str().to_string());
    }

    for pattern in PHONE_PATTERNS.iter() {
        if let Some(m) = pattern.find(text) {
            contact.phone = Some(m.as_str().trim().to_string());
            break;
        }
    }

    if let Some(m) = LINKEDIN_PROFILE.find(text) {
        contact.linkedin_profile = Some(format!("https://{}", m.as_str()));
    }

    if contact.is_empty() {
        None
    } else {
        Some(contact)
    }
}
