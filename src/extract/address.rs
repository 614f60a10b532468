// src/extract/address.rs
// =============================================================================
// Street-address detection.
//
// Addresses are assembled from three independent scans over the page text:
// - state: the first US state (full name or 2-letter code) in list order
// - streets: "<number> <words> <suffix>", e.g. "1200 Harbor Blvd"
// - zips: 5-digit or ZIP+4 codes
//
// The scans are combined by position: the i-th street gets the i-th zip,
// and every street gets the one state. This is a heuristic; it has no idea
// which zip actually belongs to which street.
// =============================================================================

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::ReferenceLists;
use crate::error::CrawlError;

/// At most this many street matches are kept per page.
pub const MAX_STREETS_PER_PAGE: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub state: Option<String>,
    pub zip: Option<String>,
}

pub struct AddressScanner {
    // (canonical entry, whole-word matcher), names first then codes
    states: Vec<(&'static str, Regex)>,
    street: Regex,
    zip: Regex,
}

impl AddressScanner {
    pub fn new(lists: &ReferenceLists) -> Result<Self, CrawlError> {
        let states = lists
            .state_names
            .iter()
            .chain(lists.state_codes.iter())
            .map(|entry| -> Result<_, CrawlError> {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(entry));
                Ok((*entry, Regex::new(&pattern)?))
            })
            .collect::<Result<Vec<_>, CrawlError>>()?;

        let suffixes = lists
            .street_suffixes
            .iter()
            .map(|suffix| regex::escape(suffix))
            .collect::<Vec<_>>()
            .join("|");

        // Words must start with a letter, so "10001 and 22 Oak Ave" can't swallow
        // the next street number. Lazy run: the match stops at the first suffix.
        // Case-sensitive: suffixes are written "Way", "Place", so prose like
        // "in our place" is not an address.
        let street = Regex::new(&format!(
            r"\b\d{{1,6}}\s+(?:[A-Za-z][A-Za-z0-9.'-]*\s+){{1,5}}?(?:{suffixes})\b"
        ))?;

        Ok(Self {
            states,
            street,
            zip: zip_regex()?,
        })
    }

    /// The first reference-list entry that appears anywhere in `text`.
    pub fn find_state(&self, text: &str) -> Option<&'static str> {
        self.states
            .iter()
            .find(|(_, pattern)| pattern.is_match(text))
            .map(|(entry, _)| *entry)
    }

    pub fn find_zips(&self, text: &str) -> Vec<String> {
        self.zip.find_iter(text).map(|m| m.as_str().to_string()).collect()
    }

    // Builds the address list for one page
    //
    // Example:
    //   text = "HQ: 123 Main Street, Springfield, IL 62704"
    //   result = [Address { street: "123 Main Street", state: Some("IL"), zip: Some("62704") }]
    pub fn scan(&self, text: &str) -> Vec<Address> {
        let state = self.find_state(text);
        let zips = self.find_zips(text);

        self.street
            .find_iter(text)
            .take(MAX_STREETS_PER_PAGE)
            .enumerate()
            .map(|(i, street)| Address {
                street: street.as_str().trim().to_string(),
                state: state.map(str::to_string),
                zip: zips.get(i).cloned(),
            })
            .collect()
    }
}

pub(crate) fn zip_regex() -> Result<Regex, regex::Error> {
    Regex::new(r"\b\d{5}(?:-\d{4})?\b")
}
