// src/extract/contact.rs
// =============================================================================
// Pattern-based contact extraction for a single page.
//
// The ContentExtractor owns a fixed table of compiled regexes, built once in
// new() and never changed afterwards:
//   email, phone, zip (via the address scanner), one pattern per social platform
//
// What gets scanned:
// - emails, phones, addresses: the page's visible text
// - emails also: mailto: link targets
// - social links: the serialized markup, so href="..." attributes count too
//
// Every field is a set per page, so repeats on one page collapse to one entry.
// =============================================================================

use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use super::address::{Address, AddressScanner};
use super::html::{Anchor, ParsedPage};
use crate::config::ReferenceLists;
use crate::error::CrawlError;

/// Anything this long is markup that leaked into a match, not an address.
const MAX_EMAIL_LEN: usize = 100;

/// Platform name -> profile URLs found for it.
pub type SocialLinks = BTreeMap<String, BTreeSet<String>>;

/// Signals found on one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageSignals {
    pub emails: BTreeSet<String>,
    pub phones: BTreeSet<String>,
    pub addresses: Vec<Address>,
    pub social_media: SocialLinks,
}

pub struct ContentExtractor {
    email: Regex,
    phone: Regex,
    social: Vec<(&'static str, Regex)>,
    addresses: AddressScanner,
    asset_extensions: &'static [&'static str],
}

impl ContentExtractor {
    pub fn new(lists: &ReferenceLists) -> Result<Self, CrawlError> {
        let social = [
            ("twitter", r"(?:https?://)?(?:www\.)?\b(?:twitter|x)\.com/[A-Za-z0-9_]+"),
            ("linkedin", r"(?:https?://)?(?:www\.)?linkedin\.com/(?:in|company|school)/[A-Za-z0-9_%-]+"),
            ("facebook", r"(?:https?://)?(?:www\.)?facebook\.com/[A-Za-z0-9_.-]+"),
            ("instagram", r"(?:https?://)?(?:www\.)?instagram\.com/[A-Za-z0-9_.]+"),
            ("youtube", r"(?:https?://)?(?:www\.)?youtube\.com/(?:@|c/|channel/|user/)?[A-Za-z0-9_-]+"),
        ]
        .into_iter()
        .map(|(platform, pattern)| -> Result<_, CrawlError> { Ok((platform, Regex::new(pattern)?)) })
        .collect::<Result<Vec<_>, CrawlError>>()?;

        Ok(Self {
            email: Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")?,
            phone: Regex::new(r"(?:\+1[-.\s]?)?(?:\(\d{3}\)|\b\d{3})[-.\s]?\d{3}[-.\s]?\d{4}\b")?,
            social,
            addresses: AddressScanner::new(lists)?,
            asset_extensions: lists.asset_extensions,
        })
    }

    // Runs every matcher over one parsed page
    //
    // Returns: PageSignals with per-page deduplicated results
    pub fn extract(&self, page: &ParsedPage) -> PageSignals {
        let text = page.visible_text();

        let mut emails = self.emails(&text);
        emails.extend(self.mailto_emails(&page.anchors()));

        let signals = PageSignals {
            emails,
            phones: self.phones(&text),
            addresses: self.addresses.scan(&text),
            social_media: self.social_links(&page.markup()),
        };

        debug!(
            emails = signals.emails.len(),
            phones = signals.phones.len(),
            addresses = signals.addresses.len(),
            social = signals.social_media.len(),
            "extracted page signals"
        );

        signals
    }

    pub fn emails(&self, text: &str) -> BTreeSet<String> {
        self.email
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|email| self.is_plausible_email(email))
            .map(str::to_string)
            .collect()
    }

    // Pulls addresses out of links like
    //   <a href="mailto:jane@example.com?subject=Hi">
    fn mailto_emails(&self, anchors: &[Anchor]) -> BTreeSet<String> {
        anchors
            .iter()
            .filter_map(|anchor| {
                let href = anchor.href.trim();
                let prefix = href.get(..7)?;
                if !prefix.eq_ignore_ascii_case("mailto:") {
                    return None;
                }
                let target = href[7..].split('?').next()?.trim();
                Some(target.to_string())
            })
            .filter(|email| self.email.is_match(email) && self.is_plausible_email(email))
            .collect()
    }

    fn is_plausible_email(&self, email: &str) -> bool {
        if email.len() >= MAX_EMAIL_LEN {
            return false;
        }
        let lowered = email.to_ascii_lowercase();
        !self
            .asset_extensions
            .iter()
            .any(|ext| lowered.ends_with(&format!(".{ext}")))
    }

    pub fn phones(&self, text: &str) -> BTreeSet<String> {
        self.phone
            .find_iter(text)
            .map(|m| m.as_str().trim())
            .filter(|phone| !contains_year(phone))
            .map(str::to_string)
            .collect()
    }

    /// Scans raw markup; platforms without a match are left out of the map.
    pub fn social_links(&self, markup: &str) -> SocialLinks {
        let mut links = SocialLinks::new();

        for (platform, pattern) in &self.social {
            let found: BTreeSet<String> = pattern
                .find_iter(markup)
                .map(|m| m.as_str().trim_end_matches('.').to_string())
                .collect();

            if !found.is_empty() {
                links.insert(platform.to_string(), found);
            }
        }

        links
    }
}

/// Years a "phone number" may not contain; such matches are usually dates.
const YEAR_RANGE: std::ops::RangeInclusive<u16> = 1900..=2029;

// True if any run of digits in `phone` has a 4-digit window inside
// YEAR_RANGE. Windows never span a separator.
//
// Example:
//   "415-555-1999" -> true  ("1999")
//   "4155551999"   -> true  ("1999" at the end)
//   "415-555-2671" -> false
fn contains_year(phone: &str) -> bool {
    phone
        .split(|c: char| !c.is_ascii_digit())
        .flat_map(|run| run.as_bytes().windows(4))
        .filter_map(|window| std::str::from_utf8(window).ok()?.parse::<u16>().ok())
        .any(|n| YEAR_RANGE.contains(&n))
}
