// src/fetch/mod.rs
// =============================================================================
// Page retrieval.
//
// The crawler talks to a PageFetcher; HttpFetcher is the production one.
// =============================================================================

mod http;

pub use http::{FetchResponse, HttpFetcher, PageFetcher};
