// src/error.rs
// =============================================================================
// Typed errors for the crawl engine.
//
// Almost nothing in a crawl is allowed to fail: broken pages and odd links are
// absorbed as empty results. The few things that CAN stop a job before it
// starts live here.
//
// The binary (main.rs) still uses anyhow::Result; these convert into it
// automatically through the ? operator.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlError {
    /// The seed URL has no scheme or no host, so no crawl is attempted.
    ///
    /// The message text is part of the output contract: it is what ends up
    /// in the `{"error": ...}` report.
    #[error("Invalid URL format")]
    InvalidSeed,

    /// One of the reference lists produced a pattern the regex engine rejected
    #[error("failed to compile pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The HTTP client could not be built (bad TLS setup, bad header value, ...)
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_seed_message() {
        assert_eq!(CrawlError::InvalidSeed.to_string(), "Invalid URL format");
    }
}
