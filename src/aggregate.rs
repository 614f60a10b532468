// src/aggregate.rs
// =============================================================================
// Folds per-page results into one crawl-wide result.
//
// Rules:
// - emails, phones: union across pages (sets, so no duplicates)
// - addresses: first occurrence of each street wins, at most 10 in total
// - social links: merged per platform
// - every page also gets a one-line summary (counts only)
//
// The output types derive Serialize so the result can be written out as JSON
// verbatim. SummaryRow is the flattened, one-row-per-crawl view.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

use crate::crawl::{NormalizedUrl, PageRecord};
use crate::extract::{Address, SocialLinks};

/// Most addresses reported for a whole crawl.
pub const MAX_ADDRESSES: usize = 10;

/// Counts for one visited page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    pub url: String,
    pub depth: usize,
    pub emails_found: usize,
    pub phones_found: usize,
    pub addresses_found: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateResult {
    pub start_url: String,
    pub pages_scraped: usize,
    pub max_depth_reached: usize,
    pub timestamp: DateTime<Utc>,
    pub all_emails: BTreeSet<String>,
    pub all_phones: BTreeSet<String>,
    pub all_addresses: Vec<Address>,
    pub all_social_media: SocialLinks,
    pub pages_details: Vec<PageSummary>,
    pub visited_urls: Vec<NormalizedUrl>,
}

impl AggregateResult {
    /// True if the crawl found at least one contact signal of any kind.
    pub fn has_signals(&self) -> bool {
        !self.all_emails.is_empty()
            || !self.all_phones.is_empty()
            || !self.all_addresses.is_empty()
            || !self.all_social_media.is_empty()
    }

    pub fn summary_row(&self) -> SummaryRow {
        SummaryRow {
            start_url: self.start_url.clone(),
            pages_scraped: self.pages_scraped,
            max_depth_reached: self.max_depth_reached,
            timestamp: self.timestamp,
            emails: join(self.all_emails.iter()),
            phones: join(self.all_phones.iter()),
            addresses: join(self.all_addresses.iter().map(|a| &a.street)),
            social_profiles: self.all_social_media.values().map(BTreeSet::len).sum(),
        }
    }

    /// One row per visited page, in visiting order.
    pub fn page_rows(&self) -> &[PageSummary] {
        &self.pages_details
    }
}

fn join<'a>(values: impl Iterator<Item = &'a String>) -> String {
    values.map(String::as_str).collect::<Vec<_>>().join("; ")
}

/// A whole crawl flattened to one row, for tabular output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub start_url: String,
    pub pages_scraped: usize,
    pub max_depth_reached: usize,
    pub timestamp: DateTime<Utc>,
    pub emails: String,
    pub phones: String,
    pub addresses: String,
    pub social_profiles: usize,
}

/// What a crawl hands back: either a result or `{"error": "..."}`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CrawlReport {
    Completed(AggregateResult),
    Failed { error: String },
}

impl CrawlReport {
    pub fn failed(error: impl ToString) -> Self {
        CrawlReport::Failed {
            error: error.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct Aggregator {
    start_url: String,
    emails: BTreeSet<String>,
    phones: BTreeSet<String>,
    addresses: Vec<Address>,
    streets: HashSet<String>,
    social: SocialLinks,
    pages: Vec<PageSummary>,
}

impl Aggregator {
    pub fn new(start_url: impl Into<String>) -> Self {
        Self {
            start_url: start_url.into(),
            emails: BTreeSet::new(),
            phones: BTreeSet::new(),
            addresses: Vec::new(),
            streets: HashSet::new(),
            social: SocialLinks::new(),
            pages: Vec::new(),
        }
    }

    /// Adds one page. Pages must arrive in visiting order.
    pub fn push(&mut self, record: PageRecord) {
        self.pages.push(PageSummary {
            url: record.url,
            depth: record.depth,
            emails_found: record.emails.len(),
            phones_found: record.phones.len(),
            addresses_found: record.addresses.len(),
        });

        self.emails.extend(record.emails);
        self.phones.extend(record.phones);

        for address in record.addresses {
            if self.addresses.len() >= MAX_ADDRESSES {
                break;
            }
            if self.streets.insert(address.street.clone()) {
                self.addresses.push(address);
            }
        }

        for (platform, links) in record.social_media {
            self.social.entry(platform).or_default().extend(links);
        }
    }

    pub fn finish(self, visited_urls: Vec<NormalizedUrl>) -> AggregateResult {
        let max_depth_reached = self.pages.iter().map(|p| p.depth).max().unwrap_or(0);

        AggregateResult {
            start_url: self.start_url,
            pages_scraped: self.pages.len(),
            max_depth_reached,
            timestamp: Utc::now(),
            all_emails: self.emails,
            all_phones: self.phones,
            all_addresses: self.addresses,
            all_social_media: self.social,
            pages_details: self.pages,
            visited_urls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::normalize;

    fn record(url: &str, depth: usize) -> PageRecord {
        PageRecord::empty(url, depth)
    }

    fn address(street: &str) -> Address {
        Address {
            street: street.to_string(),
            state: None,
            zip: None,
        }
    }

    #[test]
    fn test_union_of_emails_and_phones() {
        let mut first = record("https://example.com", 0);
        first.emails.insert("a@example.com".to_string());
        first.phones.insert("(415) 555-2671".to_string());

        let mut second = record("https://example.com/contact", 1);
        second.emails.insert("a@example.com".to_string());
        second.emails.insert("b@example.com".to_string());

        let mut aggregator = Aggregator::new("https://example.com");
        aggregator.push(first);
        aggregator.push(second);
        let result = aggregator.finish(Vec::new());

        assert_eq!(result.all_emails.len(), 2);
        assert_eq!(result.all_phones.len(), 1);
        assert_eq!(result.pages_scraped, 2);
        assert_eq!(result.max_depth_reached, 1);
        assert_eq!(result.pages_details[1].emails_found, 2);
    }

    #[test]
    fn test_addresses_unique_by_street_and_capped() {
        let mut aggregator = Aggregator::new("https://example.com");

        let mut first = record("https://example.com", 0);
        first.addresses.push(Address {
            street: "1 Main St".to_string(),
            state: Some("CA".to_string()),
            zip: None,
        });
        aggregator.push(first);

        for page in 0..4 {
            let mut next = record(&format!("https://example.com/{page}"), 1);
            next.addresses.push(address("1 Main St"));
            for n in 0..4 {
                next.addresses.push(address(&format!("{page}{n} Oak Ave")));
            }
            aggregator.push(next);
        }

        let result = aggregator.finish(Vec::new());
        let streets: HashSet<_> = result.all_addresses.iter().map(|a| a.street.as_str()).collect();

        assert_eq!(result.all_addresses.len(), MAX_ADDRESSES);
        assert_eq!(streets.len(), MAX_ADDRESSES);
        // First occurrence of "1 Main St" (the one with a state) is kept
        assert_eq!(result.all_addresses[0].state.as_deref(), Some("CA"));
    }

    #[test]
    fn test_social_links_merge_per_platform() {
        let mut first = record("https://example.com", 0);
        first
            .social_media
            .insert("twitter".to_string(), BTreeSet::from(["https://twitter.com/acme".to_string()]));
        let mut second = record("https://example.com/about", 1);
        second.social_media.insert(
            "twitter".to_string(),
            BTreeSet::from(["https://twitter.com/acme".to_string(), "https://x.com/acme_help".to_string()]),
        );

        let mut aggregator = Aggregator::new("https://example.com");
        aggregator.push(first);
        aggregator.push(second);
        let result = aggregator.finish(Vec::new());

        assert_eq!(result.all_social_media["twitter"].len(), 2);
        assert_eq!(result.summary_row().social_profiles, 2);
    }

    #[test]
    fn test_empty_crawl() {
        let result = Aggregator::new("https://example.com").finish(Vec::new());
        assert_eq!(result.pages_scraped, 0);
        assert_eq!(result.max_depth_reached, 0);
        assert!(!result.has_signals());
    }

    #[test]
    fn test_error_report_shape() {
        let json = serde_json::to_value(CrawlReport::failed("Invalid URL format")).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "Invalid URL format" }));
    }

    #[test]
    fn test_completed_report_serializes_result_fields() {
        let mut aggregator = Aggregator::new("https://example.com");
        aggregator.push(record("https://example.com", 0));
        let result = aggregator.finish(vec![normalize("https://example.com/")]);

        let json = serde_json::to_value(CrawlReport::Completed(result)).unwrap();
        assert_eq!(json["start_url"], "https://example.com");
        assert_eq!(json["pages_scraped"], 1);
        assert_eq!(json["visited_urls"], serde_json::json!(["https://example.com"]));
        assert_eq!(json["pages_details"][0]["emails_found"], 0);
    }
}
