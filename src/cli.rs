// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Every knob can also come from an environment variable
// (CONTACT_HARVESTER_MAX_PAGES, CONTACT_HARVESTER_USER_AGENT, ...), which is
// handy in cron jobs and containers.
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::time::Duration;

use crate::config::{CrawlJob, FetchSettings};

#[derive(Parser, Debug)]
#[command(
    name = "contact-harvester",
    version = "0.1.0",
    about = "Crawl a website and collect emails, phone numbers, addresses and social links",
    long_about = "contact-harvester crawls a website breadth-first, staying on the same domain, \
                  and extracts contact details from every page it visits. Contact and about \
                  pages are visited first so a small page budget still finds the useful ones."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a website starting from one URL
    ///
    /// Example: contact-harvester crawl https://example.com --max-pages 30 --max-depth 2
    Crawl {
        /// Seed URL to start crawling from (e.g., https://example.com)
        seed_url: String,

        #[command(flatten)]
        limits: CrawlLimits,

        #[command(flatten)]
        fetch: FetchOptions,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Extract contact details from the listed pages only (no link following)
    ///
    /// Example: contact-harvester extract https://example.com/contact https://example.org
    Extract {
        /// One or more page URLs
        #[arg(required = true)]
        urls: Vec<String>,

        /// Pause between pages, in milliseconds
        #[arg(long, env = "CONTACT_HARVESTER_DELAY_MS", default_value_t = 1000)]
        delay_ms: u64,

        #[command(flatten)]
        fetch: FetchOptions,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },
}

/// How far a crawl may go.
#[derive(Args, Debug, Clone)]
pub struct CrawlLimits {
    /// Maximum number of pages to visit
    #[arg(long, env = "CONTACT_HARVESTER_MAX_PAGES", default_value_t = 20,
          value_parser = clap::value_parser!(u64).range(1..))]
    pub max_pages: u64,

    /// Maximum link depth (0 = only the seed page, 1 = seed + pages it links to, ...)
    #[arg(long, env = "CONTACT_HARVESTER_MAX_DEPTH", default_value_t = 2)]
    pub max_depth: usize,

    /// Pause after every page, in milliseconds
    #[arg(long, env = "CONTACT_HARVESTER_DELAY_MS", default_value_t = 1000)]
    pub delay_ms: u64,
}

/// How pages are downloaded.
#[derive(Args, Debug, Clone)]
pub struct FetchOptions {
    /// Per-page timeout, in seconds
    #[arg(long, env = "CONTACT_HARVESTER_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,

    /// User-Agent header to send (defaults to a desktop browser string)
    #[arg(long, env = "CONTACT_HARVESTER_USER_AGENT")]
    pub user_agent: Option<String>,
}

impl CrawlLimits {
    pub fn to_job(&self, seed_url: &str, fetch: &FetchOptions) -> CrawlJob {
        CrawlJob::new(seed_url)
            .with_max_pages(self.max_pages as usize)
            .with_max_depth(self.max_depth)
            .with_delay(Duration::from_millis(self.delay_ms))
            .with_timeout(fetch.timeout())
    }
}

impl FetchOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn settings(&self) -> FetchSettings {
        let mut settings = FetchSettings::default();
        if let Some(user_agent) = &self.user_agent {
            settings.user_agent = user_agent.clone();
        }
        settings
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does #[command(flatten)] do?
//    - It pulls the fields of another Args struct into this subcommand
//    - So `crawl` gets --max-pages, --timeout-secs, ... without repeating them
//
// 2. What is `env = "..."`?
//    - If the flag isn't given, clap looks at that environment variable
//    - Needs the "env" feature of clap (see Cargo.toml)
//
// 3. Why value_parser!(u64).range(1..)?
//    - A page budget of 0 makes no sense, so clap rejects it up front
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawl_defaults() {
        let cli = Cli::try_parse_from(["contact-harvester", "crawl", "https://example.com"]).unwrap();

        match cli.command {
            Commands::Crawl { seed_url, limits, fetch, json } => {
                let job = limits.to_job(&seed_url, &fetch);
                assert_eq!(job.seed_url, "https://example.com");
                assert_eq!(job.max_pages, 20);
                assert_eq!(job.max_depth, 2);
                assert_eq!(job.delay, Duration::from_millis(1000));
                assert_eq!(job.timeout, Duration::from_secs(10));
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_crawl_flags() {
        let cli = Cli::try_parse_from([
            "contact-harvester",
            "crawl",
            "https://example.com",
            "--max-pages",
            "5",
            "--max-depth",
            "0",
            "--user-agent",
            "harvest-bot/1.0",
            "--json",
        ])
        .unwrap();

        match cli.command {
            Commands::Crawl { limits, fetch, json, .. } => {
                assert_eq!(limits.max_pages, 5);
                assert_eq!(limits.max_depth, 0);
                assert_eq!(fetch.settings().user_agent, "harvest-bot/1.0");
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_zero_page_budget_rejected() {
        let parsed = Cli::try_parse_from(["contact-harvester", "crawl", "https://example.com", "--max-pages", "0"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_extract_needs_a_url() {
        assert!(Cli::try_parse_from(["contact-harvester", "extract"]).is_err());

        let cli = Cli::try_parse_from(["contact-harvester", "extract", "https://a.com", "https://b.com"]).unwrap();
        match cli.command {
            Commands::Extract { urls, .. } => assert_eq!(urls.len(), 2),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
