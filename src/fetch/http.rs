// src/fetch/http.rs
// =============================================================================
// This module downloads pages over HTTP.
//
// Key functionality:
// - One shared reqwest Client (connection pooling, custom User-Agent)
// - Per-request timeout taken from the crawl job
// - Any failure (network, timeout, non-2xx) becomes an empty response;
//   the crawler never sees an error from here
//
// Rust concepts:
// - Traits: PageFetcher lets the crawler work with any page source
// - BoxFuture: lets a trait method return an async result
// - Enums: To describe why a fetch failed (for the logs)
// =============================================================================

use futures::future::{BoxFuture, FutureExt};
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::FetchSettings;
use crate::error::CrawlError;

/// What a fetch produced.
///
/// `content` is None and `status` is 0 whenever the page could not be
/// retrieved for any reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub content: Option<String>,
    pub status: u16,
}

impl FetchResponse {
    pub fn success(content: String, status: u16) -> Self {
        Self {
            content: Some(content),
            status,
        }
    }

    pub fn failed() -> Self {
        Self {
            content: None,
            status: 0,
        }
    }
}

/// Anything that can turn a URL into page content.
///
/// Implementations must not fail: every problem is reported as
/// [`FetchResponse::failed`]. A fetch that hasn't finished within `timeout`
/// is a failure too.
pub trait PageFetcher: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str, timeout: Duration) -> BoxFuture<'a, FetchResponse>;
}

/// The real fetcher, backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(settings: &FetchSettings) -> Result<Self, CrawlError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(settings.max_redirects))
            .build()?;

        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a str, timeout: Duration) -> BoxFuture<'a, FetchResponse> {
        async move {
            match fetch_page(&self.client, url, timeout).await {
                Ok((status, body)) => {
                    debug!(url, status, bytes = body.len(), "fetched page");
                    FetchResponse::success(body, status)
                }
                Err(failure) => {
                    warn!(url, %failure, "failed to fetch page");
                    FetchResponse::failed()
                }
            }
        }
        .boxed()
    }
}

// Why a page could not be fetched
//
// Only used for logging; callers just see FetchResponse::failed()
#[derive(Debug, Clone, PartialEq, Eq)]
enum FetchFailure {
    /// Server answered with something other than 2xx
    Status(u16),
    /// No response within the timeout
    Timeout,
    /// Redirect loop or too many hops
    TooManyRedirects,
    /// Could not connect (DNS, refused, unreachable)
    Connect,
    /// Anything else (TLS, body decoding, ...)
    Other(String),
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchFailure::Status(code) => write!(f, "HTTP {}", code),
            FetchFailure::Timeout => write!(f, "request timed out"),
            FetchFailure::TooManyRedirects => write!(f, "too many redirects"),
            FetchFailure::Connect => write!(f, "connection failed"),
            FetchFailure::Other(message) => write!(f, "{}", message),
        }
    }
}

// Fetches a web page and returns its status and HTML content
async fn fetch_page(client: &Client, url: &str, timeout: Duration) -> Result<(u16, String), FetchFailure> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(categorize_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchFailure::Status(status.as_u16()));
    }

    let body = response.text().await.map_err(categorize_error)?;
    Ok((status.as_u16(), body))
}

// Categorizes different error types from reqwest
fn categorize_error(error: reqwest::Error) -> FetchFailure {
    if error.is_timeout() {
        FetchFailure::Timeout
    } else if error.is_redirect() {
        FetchFailure::TooManyRedirects
    } else if error.is_connect() {
        FetchFailure::Connect
    } else {
        FetchFailure::Other(error.to_string())
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a trait for fetching?
//    - The crawler only needs "give me the content of this URL"
//    - Tests plug in an in-memory fetcher, no network needed
//    - A headless-browser fetcher could be added without touching the crawler
//
// 2. What is BoxFuture?
//    - async fn isn't allowed in a trait we want to use as &dyn PageFetcher
//    - Instead the method returns a boxed future: Pin<Box<dyn Future + Send>>
//    - .boxed() (from FutureExt) does the boxing for us
//
// 3. Why map_err(categorize_error)?
//    - reqwest::Error carries a lot of detail we don't need
//    - We boil it down to a small enum that is easy to log
// -----------------------------------------------------------------------------
