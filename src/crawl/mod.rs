// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Breadth-first crawling starting from a seed URL
// - Same-domain restriction (doesn't crawl external sites)
// - Depth limit and page budget
// - Contact-looking links (contact, about, team...) crawled first
// - Polite crawling with a delay between requests
// - Can be stopped early with a CancellationToken
//
// Submodules:
// - normalize: URL identity and validity checks
// - frontier: the FIFO queue and the visited set
// - discover: picks and orders the next links to follow
// - controller: the crawl loop itself
// =============================================================================

mod controller;
mod discover;
mod frontier;
mod normalize;

pub use controller::{Crawler, PageRecord, ProgressFn};
pub use normalize::NormalizedUrl;

#[cfg(test)]
pub use normalize::normalize;
