// src/crawl/discover.rs
// =============================================================================
// Picks which links on a page are worth following next.
//
// How it works:
// 1. Stop right away if the page is already at the depth limit
// 2. Resolve every <a href> against the page URL
// 3. Keep only well-formed, same-site HTML pages we haven't visited
// 4. Flag "priority" links: the text or href mentions contact, about, team...
// 5. Sort priority links first, then alphabetically by URL
// 6. Keep only as many as the page budget still allows
//
// The sort is the whole priority mechanism. The frontier itself stays a
// plain FIFO queue; sorting each page's links before they are queued is
// what pushes contact pages to the front.
// =============================================================================

use std::collections::HashMap;
use url::Url;

use super::frontier::{FrontierEntry, VisitedSet};
use super::normalize::{is_crawlable, is_well_formed, normalize, resolve, NormalizedUrl};
use crate::config::ReferenceLists;
use crate::extract::Anchor;

// A link that passed the filters
#[derive(Debug)]
struct Candidate {
    key: NormalizedUrl,
    url: String,
    priority: bool,
}

#[derive(Debug, Clone)]
pub struct SubpageDiscoverer {
    /// Host of the seed URL; links are compared against this, not the current page
    base_domain: String,
    max_depth: usize,
    max_pages: usize,
    priority_keywords: &'static [&'static str],
    excluded_extensions: &'static [&'static str],
}

impl SubpageDiscoverer {
    pub fn new(base_domain: impl Into<String>, max_depth: usize, max_pages: usize, lists: &ReferenceLists) -> Self {
        Self {
            base_domain: base_domain.into(),
            max_depth,
            max_pages,
            priority_keywords: lists.priority_keywords,
            excluded_extensions: lists.excluded_extensions,
        }
    }

    // Produces the next-hop links for one page
    //
    // Parameters:
    //   anchors: every <a href> on the page
    //   page_url: the URL the page was fetched from (base for relative links)
    //   depth: the page's own depth
    //   visited: URLs already claimed in this crawl
    //
    // Returns: (url, depth + 1) entries, best first, at most
    //          max_pages - |visited| of them
    pub fn discover(
        &self,
        anchors: &[Anchor],
        page_url: &str,
        depth: usize,
        visited: &VisitedSet,
    ) -> Vec<FrontierEntry> {
        if depth >= self.max_depth {
            return Vec::new();
        }

        let base = match Url::parse(page_url) {
            Ok(url) => url,
            Err(_) => return Vec::new(),
        };

        let mut candidates: Vec<Candidate> = Vec::new();
        let mut positions: HashMap<NormalizedUrl, usize> = HashMap::new();

        for anchor in anchors {
            // "#section" would resolve to the page itself
            if anchor.href.trim().starts_with('#') {
                continue;
            }

            let absolute = match resolve(&base, &anchor.href) {
                Some(url) => url,
                None => continue,
            };

            if !is_well_formed(&absolute)
                || !is_crawlable(&absolute, &self.base_domain, self.excluded_extensions)
            {
                continue;
            }

            let key = normalize(&absolute);
            if visited.contains(&key) {
                continue;
            }

            let priority = self.is_priority(anchor);

            // Several anchors can point at the same page; it is a priority
            // link if any of them is
            match positions.get(&key) {
                Some(&position) => candidates[position].priority |= priority,
                None => {
                    positions.insert(key.clone(), candidates.len());
                    candidates.push(Candidate {
                        key,
                        url: absolute,
                        priority,
                    });
                }
            }
        }

        // Priority first (true > false), then URL ascending
        candidates.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.key.cmp(&b.key)));

        let remaining_budget = self.max_pages.saturating_sub(visited.len());
        candidates.truncate(remaining_budget);

        candidates
            .into_iter()
            .map(|candidate| FrontierEntry::new(candidate.url, depth + 1))
            .collect()
    }

    /// Case-insensitive keyword match against the link text or the raw href.
    pub fn is_priority(&self, anchor: &Anchor) -> bool {
        let text = anchor.text.to_lowercase();
        let href = anchor.href.to_lowercase();

        self.priority_keywords
            .iter()
            .any(|keyword| text.contains(keyword) || href.contains(keyword))
    }
}
