// src/crawl/controller.rs
// =============================================================================
// This module drives a crawl with a breadth-first approach.
//
// How it works:
// 1. Start with the seed URL (depth 0) in a FIFO queue
// 2. Take the next URL off the queue and claim it in the visited set
//    (already claimed? drop it, it costs nothing)
// 3. Fetch the page
// 4. Extract contact signals, and if the depth limit allows, discover
//    same-site links and queue the ones the page budget still has room for
// 5. Hand the page record to the aggregator, wait the polite delay, repeat
// 6. Stop when the queue is empty, the budget is spent, or someone cancels
//
// Failure policy:
// - A seed URL without scheme/host stops the job before any fetch
// - A page that can't be fetched becomes an empty record. It still counts
//   against the budget and is never retried
//
// Rust concepts:
// - Generics: Crawler<F> works with any PageFetcher
// - CancellationToken: cooperative "please stop" signal from tokio-util
// - tokio::select!: wait for whichever finishes first (delay or cancel)
// =============================================================================

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::discover::SubpageDiscoverer;
use super::frontier::{Frontier, FrontierEntry, VisitedSet};
use super::normalize::{host_of, is_well_formed, normalize};
use crate::aggregate::{AggregateResult, Aggregator, CrawlReport};
use crate::config::{CrawlJob, ReferenceLists};
use crate::error::CrawlError;
use crate::extract::{Address, ContentExtractor, ParsedPage, SocialLinks};
use crate::fetch::PageFetcher;

/// Progress never reports more than this until the crawl is actually done.
const MAX_RUNNING_PERCENT: usize = 95;

/// Observer for crawl progress: (percent 0..=100, status message).
pub type ProgressFn = dyn Fn(u8, &str) + Send + Sync;

/// Everything learned from one visited page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRecord {
    pub url: String,
    pub depth: usize,
    pub timestamp: DateTime<Utc>,
    pub emails: BTreeSet<String>,
    pub phones: BTreeSet<String>,
    pub addresses: Vec<Address>,
    pub social_media: SocialLinks,
    pub subpages: Vec<FrontierEntry>,
}

impl PageRecord {
    /// Record for a page that couldn't be fetched: visited, but no signals.
    pub fn empty(url: impl Into<String>, depth: usize) -> Self {
        Self {
            url: url.into(),
            depth,
            timestamp: Utc::now(),
            emails: BTreeSet::new(),
            phones: BTreeSet::new(),
            addresses: Vec::new(),
            social_media: SocialLinks::new(),
            subpages: Vec::new(),
        }
    }
}

/// Shared between jobs: the fetcher and the compiled matchers.
/// Per-job state is created inside `crawl()`, so one Crawler can run
/// several jobs at once.
pub struct Crawler<F> {
    fetcher: F,
    extractor: ContentExtractor,
    lists: ReferenceLists,
}

impl<F: PageFetcher> Crawler<F> {
    pub fn new(fetcher: F, lists: ReferenceLists) -> Result<Self, CrawlError> {
        Ok(Self {
            fetcher,
            extractor: ContentExtractor::new(&lists)?,
            lists,
        })
    }

    /// Runs a crawl and folds any error into the `{"error": ...}` report shape.
    pub async fn run(&self, job: &CrawlJob, progress: Option<&ProgressFn>, cancel: &CancellationToken) -> CrawlReport {
        match self.crawl(job, progress, cancel).await {
            Ok(result) => CrawlReport::Completed(result),
            Err(e) => CrawlReport::failed(e),
        }
    }

    // Crawls a website starting from job.seed_url
    //
    // Parameters:
    //   job: seed, page budget, depth limit, delay and timeout
    //   progress: optional observer, called once per claimed page and once at the end
    //   cancel: checked once per loop iteration; also cuts the delay short
    //
    // Returns: the aggregated result, or CrawlError::InvalidSeed
    pub async fn crawl(
        &self,
        job: &CrawlJob,
        progress: Option<&ProgressFn>,
        cancel: &CancellationToken,
    ) -> Result<AggregateResult, CrawlError> {
        if !is_well_formed(&job.seed_url) {
            warn!(seed = %job.seed_url, "rejecting malformed seed URL");
            return Err(CrawlError::InvalidSeed);
        }
        let base_domain = host_of(&job.seed_url).ok_or(CrawlError::InvalidSeed)?;

        info!(
            seed = %job.seed_url,
            max_pages = job.max_pages,
            max_depth = job.max_depth,
            "starting crawl"
        );

        let visited = VisitedSet::new();
        let discoverer = SubpageDiscoverer::new(base_domain, job.max_depth, job.max_pages, &self.lists);
        let mut aggregator = Aggregator::new(job.seed_url.clone());

        let mut frontier = Frontier::new();
        frontier.push(FrontierEntry::new(job.seed_url.clone(), 0));

        while visited.len() < job.max_pages {
            if cancel.is_cancelled() {
                info!(pages = visited.len(), "crawl cancelled");
                break;
            }

            let entry = match frontier.pop() {
                Some(entry) => entry,
                None => break,
            };

            // Claim at dequeue time, exactly once
            if !visited.try_claim(&normalize(&entry.url)) {
                debug!(url = %entry.url, "already visited, skipping");
                continue;
            }

            let percent = (visited.len() * 100 / job.max_pages).min(MAX_RUNNING_PERCENT);
            report(progress, percent as u8, &format!("Scraping {} (depth {})", entry.url, entry.depth));

            let response = self.fetcher.fetch(&entry.url, job.timeout).await;
            debug!(url = %entry.url, status = response.status, "fetch returned");
            let record = match response.content {
                Some(content) => self.process_page(&content, &entry, &discoverer, &visited),
                None => PageRecord::empty(entry.url.clone(), entry.depth),
            };

            for subpage in &record.subpages {
                if frontier.len() + visited.len() >= job.max_pages {
                    break;
                }
                frontier.push(subpage.clone());
            }

            aggregator.push(record);

            // Polite crawling: wait after every page, fetched or not
            if !job.delay.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(job.delay) => {}
                }
            }
        }

        report(progress, 100, &format!("Finished crawling {}", job.seed_url));

        let result = aggregator.finish(visited.snapshot());
        info!(
            pages = result.pages_scraped,
            emails = result.all_emails.len(),
            phones = result.all_phones.len(),
            addresses = result.all_addresses.len(),
            "crawl finished"
        );

        Ok(result)
    }

    // Parses one page, extracts signals and finds next-hop links.
    // Kept synchronous: the parsed tree never has to live across an .await
    fn process_page(
        &self,
        content: &str,
        entry: &FrontierEntry,
        discoverer: &SubpageDiscoverer,
        visited: &VisitedSet,
    ) -> PageRecord {
        let page = ParsedPage::parse(content);
        let signals = self.extractor.extract(&page);
        let subpages = discoverer.discover(&page.anchors(), &entry.url, entry.depth, visited);

        debug!(url = %entry.url, depth = entry.depth, subpages = subpages.len(), "processed page");

        PageRecord {
            url: entry.url.clone(),
            depth: entry.depth,
            timestamp: Utc::now(),
            emails: signals.emails,
            phones: signals.phones,
            addresses: signals.addresses,
            social_media: signals.social_media,
            subpages,
        }
    }
}

fn report(progress: Option<&ProgressFn>, percent: u8, message: &str) {
    if let Some(progress) = progress {
        progress(percent, message);
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why claim when dequeuing and not when discovering?
//    - A link can be discovered many times before it is fetched
//    - If discovery claimed it, each claim would use up budget for a page
//      that might never be fetched
//    - Claiming when it leaves the queue means one claim per real fetch
//
// 2. What is CancellationToken?
//    - A cheap, clonable flag shared between tasks
//    - One side calls .cancel(), the other checks .is_cancelled()
//      or awaits .cancelled()
//
// 3. What does tokio::select! do?
//    - Runs several futures and continues with whichever finishes first
//    - Here: the polite delay, unless a cancel arrives sooner
//
// 4. Why Option<&ProgressFn>?
//    - Callers that don't care about progress pass None
//    - dyn Fn lets any closure be used as the callback
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchResponse;
    use futures::future::{BoxFuture, FutureExt};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    // In-memory site: URL -> HTML. Unknown URLs fail like a 404 would.
    #[derive(Default)]
    struct StaticFetcher {
        pages: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
        cancel_on_fetch: Option<CancellationToken>,
    }

    impl StaticFetcher {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages.iter().map(|(u, h)| (u.to_string(), h.to_string())).collect(),
                ..Default::default()
            }
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl PageFetcher for StaticFetcher {
        fn fetch<'a>(&'a self, url: &'a str, _timeout: Duration) -> BoxFuture<'a, FetchResponse> {
            self.requests.lock().unwrap().push(url.to_string());
            if let Some(token) = &self.cancel_on_fetch {
                token.cancel();
            }
            let response = match self.pages.get(url) {
                Some(html) => FetchResponse::success(html.clone(), 200),
                None => FetchResponse::failed(),
            };
            async move { response }.boxed()
        }
    }

    fn job(max_pages: usize, max_depth: usize) -> CrawlJob {
        CrawlJob::new("https://example.com")
            .with_max_pages(max_pages)
            .with_max_depth(max_depth)
            .with_delay(Duration::ZERO)
    }

    fn crawler(fetcher: StaticFetcher) -> Crawler<StaticFetcher> {
        Crawler::new(fetcher, ReferenceLists::standard()).unwrap()
    }

    fn links(paths: &[&str]) -> String {
        paths
            .iter()
            .map(|p| format!(r#"<a href="{p}">{p}</a>"#))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test]
    async fn test_single_page_without_links() {
        let crawler = crawler(StaticFetcher::new(&[(
            "https://example.com",
            r#"<p>jane@example.com</p><a href="https://other.com/contact">Partner</a>"#,
        )]));

        let result = crawler.crawl(&job(5, 2), None, &CancellationToken::new()).await.unwrap();

        assert_eq!(result.pages_scraped, 1);
        assert_eq!(result.all_emails, BTreeSet::from(["jane@example.com".to_string()]));
        assert_eq!(crawler.fetcher.requests(), vec!["https://example.com"]);
    }

    #[tokio::test]
    async fn test_invalid_seed_never_fetches() {
        let crawler = crawler(StaticFetcher::new(&[]));
        let bad_job = CrawlJob::new("example.com/no-scheme").with_delay(Duration::ZERO);

        let err = crawler.crawl(&bad_job, None, &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, CrawlError::InvalidSeed));

        let report = crawler.run(&bad_job, None, &CancellationToken::new()).await;
        assert_eq!(
            serde_json::to_value(report).unwrap(),
            serde_json::json!({ "error": "Invalid URL format" })
        );
        assert!(crawler.fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_page_budget_is_respected() {
        let hub = links(&["/p0", "/p1", "/p2", "/p3", "/p4", "/p5"]);
        let crawler = crawler(StaticFetcher::new(&[
            ("https://example.com", hub.as_str()),
            ("https://example.com/p0", hub.as_str()),
            ("https://example.com/p1", hub.as_str()),
            ("https://example.com/p2", hub.as_str()),
        ]));

        let result = crawler.crawl(&job(3, 5), None, &CancellationToken::new()).await.unwrap();

        assert_eq!(result.pages_scraped, 3);
        assert_eq!(result.visited_urls.len(), 3);
        assert_eq!(crawler.fetcher.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_depth_limit() {
        let crawler = crawler(StaticFetcher::new(&[
            ("https://example.com", links(&["/a"]).as_str()),
            ("https://example.com/a", links(&["/b"]).as_str()),
            ("https://example.com/b", links(&["/c"]).as_str()),
        ]));

        let result = crawler.crawl(&job(10, 1), None, &CancellationToken::new()).await.unwrap();

        assert_eq!(result.pages_scraped, 2);
        assert_eq!(result.max_depth_reached, 1);
        assert!(result.pages_details.iter().all(|p| p.depth <= 1));
    }

    #[tokio::test]
    async fn test_failed_fetch_counts_as_visited() {
        let crawler = crawler(StaticFetcher::new(&[
            ("https://example.com", links(&["/missing", "/contact"]).as_str()),
            ("https://example.com/contact", "<p>(415) 555-2671</p>"),
        ]));

        let result = crawler.crawl(&job(10, 2), None, &CancellationToken::new()).await.unwrap();

        assert_eq!(result.pages_scraped, 3);
        let missing = result
            .pages_details
            .iter()
            .find(|p| p.url == "https://example.com/missing")
            .unwrap();
        assert_eq!(missing.phones_found, 0);
        assert_eq!(result.all_phones.len(), 1);
        // Never retried
        let requests = crawler.fetcher.requests();
        assert_eq!(requests.iter().filter(|u| u.ends_with("/missing")).count(), 1);
    }

    #[tokio::test]
    async fn test_contact_pages_are_crawled_first() {
        let crawler = crawler(StaticFetcher::new(&[
            (
                "https://example.com",
                r#"<a href="/blog">Blog</a><a href="/news">News</a><a href="/reach-us">Contact Us</a>"#,
            ),
            ("https://example.com/reach-us", "<p>hello@example.com</p>"),
        ]));

        let result = crawler.crawl(&job(2, 2), None, &CancellationToken::new()).await.unwrap();

        assert_eq!(crawler.fetcher.requests(), vec!["https://example.com", "https://example.com/reach-us"]);
        assert!(result.all_emails.contains("hello@example.com"));
    }

    #[tokio::test]
    async fn test_url_variants_are_visited_once() {
        let crawler = crawler(StaticFetcher::new(&[
            ("https://example.com", links(&["/About", "/about/", "/about#team", "https://EXAMPLE.com/about"]).as_str()),
            ("https://example.com/About", "<p>about</p>"),
        ]));

        let result = crawler.crawl(&job(10, 2), None, &CancellationToken::new()).await.unwrap();

        assert_eq!(result.pages_scraped, 2);
        let visited: Vec<_> = result.visited_urls.iter().map(|u| u.as_str()).collect();
        assert_eq!(visited, vec!["https://example.com", "https://example.com/about"]);
    }

    #[tokio::test]
    async fn test_progress_reports() {
        let seen: Arc<Mutex<Vec<(u8, String)>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let progress = move |percent: u8, message: &str| sink.lock().unwrap().push((percent, message.to_string()));

        let crawler = crawler(StaticFetcher::new(&[
            ("https://example.com", links(&["/a"]).as_str()),
            ("https://example.com/a", ""),
        ]));
        crawler.crawl(&job(2, 2), Some(&progress as &ProgressFn), &CancellationToken::new()).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].0, 50);
        assert!(seen[0].1.contains("https://example.com"));
        // Two of two pages claimed is still reported as 95 until the end
        assert_eq!(seen[1].0, 95);
        assert!(seen[1].1.contains("https://example.com/a"));
        assert_eq!(seen[2].0, 100);
    }

    #[tokio::test]
    async fn test_cancellation_stops_the_loop() {
        let cancel = CancellationToken::new();
        let hub = links(&["/a", "/b", "/c"]);
        let mut fetcher = StaticFetcher::new(&[("https://example.com", hub.as_str())]);
        fetcher.cancel_on_fetch = Some(cancel.clone());
        let crawler = crawler(fetcher);

        // A long delay would hang the test if cancellation didn't cut it short
        let slow_job = job(10, 2).with_delay(Duration::from_secs(60));
        let result = crawler.crawl(&slow_job, None, &cancel).await.unwrap();

        assert_eq!(result.pages_scraped, 1);
    }

    #[tokio::test]
    async fn test_sequential_crawls_start_fresh() {
        let crawler = crawler(StaticFetcher::new(&[
            ("https://example.com", links(&["/a"]).as_str()),
            ("https://example.com/a", ""),
        ]));

        let first = crawler.crawl(&job(5, 2), None, &CancellationToken::new()).await.unwrap();
        let second = crawler.crawl(&job(5, 2), None, &CancellationToken::new()).await.unwrap();

        assert_eq!(first.pages_scraped, 2);
        assert_eq!(second.pages_scraped, 2);
    }

    #[tokio::test]
    async fn test_concurrent_jobs_keep_separate_state() {
        let crawler = crawler(StaticFetcher::new(&[
            ("https://a.com", links(&["/1", "/2", "/3"]).as_str()),
            ("https://a.com/1", ""),
            ("https://a.com/2", ""),
            ("https://b.com", links(&["/x", "/y", "/z"]).as_str()),
            ("https://b.com/x", ""),
            ("https://b.com/y", ""),
        ]));
        // A small delay makes the two loops take turns
        let job_a = CrawlJob::new("https://a.com").with_max_pages(3).with_delay(Duration::from_millis(5));
        let job_b = CrawlJob::new("https://b.com").with_max_pages(3).with_delay(Duration::from_millis(5));
        let cancel = CancellationToken::new();

        let (a, b) = tokio::join!(crawler.crawl(&job_a, None, &cancel), crawler.crawl(&job_b, None, &cancel));
        let (a, b) = (a.unwrap(), b.unwrap());

        for (result, host) in [(&a, "https://a.com"), (&b, "https://b.com")] {
            assert_eq!(result.pages_scraped, 3);
            assert_eq!(result.visited_urls.len(), 3);
            assert_eq!(result.visited_urls[0].as_str(), host);
            assert!(result.visited_urls.iter().all(|u| u.as_str().starts_with(host)));
        }
    }

    #[tokio::test]
    async fn test_aggregates_across_pages() {
        let crawler = crawler(StaticFetcher::new(&[
            (
                "https://example.com",
                r#"<p>sales@example.com</p><a href="/about">About</a>
                   <a href="https://twitter.com/acme">Twitter</a>"#,
            ),
            (
                "https://example.com/about",
                r#"<p>sales@example.com or help@example.com</p>
                   <p>500 Howard Street, San Francisco, California 94105</p>"#,
            ),
        ]));

        let result = crawler.crawl(&job(5, 2), None, &CancellationToken::new()).await.unwrap();

        assert_eq!(result.all_emails.len(), 2);
        assert_eq!(result.all_addresses.len(), 1);
        assert!(result.all_social_media["twitter"].contains("https://twitter.com/acme"));
        assert_eq!(result.pages_details[1].emails_found, 2);
    }
}
