// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (tracing, filtered by RUST_LOG)
// 2. Parse command-line arguments using clap
// 3. Dispatch to the appropriate subcommand handler
// 4. Print the results as a table or as JSON
// 5. Exit with proper code (0 = contacts found, 1 = nothing found, 2 = error)
//
// Ctrl-C doesn't kill the crawl mid-page: it asks the crawler to stop after
// the page it is working on, and whatever was collected so far is printed.
// =============================================================================

mod aggregate;
mod cli;
mod config;
mod crawl;
mod error;
mod extract;
mod fetch;

use aggregate::{AggregateResult, CrawlReport};
use clap::Parser;
use cli::{Cli, Commands, FetchOptions};
use config::{CrawlJob, ReferenceLists};
use crawl::{Crawler, ProgressFn};
use fetch::HttpFetcher;

use anyhow::Result;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    init_logging();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so `--json` output on stdout stays machine-readable
fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "contact_harvester=warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// Returns:
//   Ok(0) = at least one contact signal found
//   Ok(1) = crawl ran but found nothing
//   Ok(2) = the job could not run (e.g. invalid URL)
//   Err = unexpected error
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    let cancel = CancellationToken::new();
    stop_on_ctrl_c(cancel.clone());

    match cli.command {
        Commands::Crawl {
            seed_url,
            limits,
            fetch,
            json,
        } => {
            let job = limits.to_job(&seed_url, &fetch);
            handle_crawl(job, &fetch, json, &cancel).await
        }
        Commands::Extract {
            urls,
            delay_ms,
            fetch,
            json,
        } => handle_extract(&urls, Duration::from_millis(delay_ms), &fetch, json, &cancel).await,
    }
}

fn stop_on_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n⏹️  Stopping after the current page...");
            cancel.cancel();
        }
    });
}

fn build_crawler(fetch: &FetchOptions) -> Result<Crawler<HttpFetcher>> {
    let fetcher = HttpFetcher::new(&fetch.settings())?;
    Ok(Crawler::new(fetcher, ReferenceLists::standard())?)
}

fn print_progress(percent: u8, message: &str) {
    eprintln!("  [{:>3}%] {}", percent, message);
}

// Handles the 'crawl' subcommand
async fn handle_crawl(job: CrawlJob, fetch: &FetchOptions, json: bool, cancel: &CancellationToken) -> Result<i32> {
    if !json {
        println!("🔍 Crawling website: {}", job.seed_url);
        println!("📊 Max pages: {}, max depth: {}", job.max_pages, job.max_depth);
    }

    let crawler = build_crawler(fetch)?;
    let print: &ProgressFn = &print_progress;
    let progress = if json { None } else { Some(print) };

    let report = crawler.run(&job, progress, cancel).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(exit_code(std::slice::from_ref(&report)))
}

// Handles the 'extract' subcommand: one page per URL, no link following
async fn handle_extract(
    urls: &[String],
    delay: Duration,
    fetch: &FetchOptions,
    json: bool,
    cancel: &CancellationToken,
) -> Result<i32> {
    let crawler = build_crawler(fetch)?;
    let mut reports = Vec::new();

    for url in urls {
        if cancel.is_cancelled() {
            break;
        }
        if !json {
            println!("🔍 Scanning {}", url);
        }

        let job = CrawlJob::new(url.as_str())
            .with_max_pages(1)
            .with_max_depth(0)
            .with_delay(delay)
            .with_timeout(fetch.timeout());

        reports.push(crawler.run(&job, None, cancel).await);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            print_report(report);
        }
    }

    Ok(exit_code(&reports))
}

fn exit_code(reports: &[CrawlReport]) -> i32 {
    let mut found_any = false;

    for report in reports {
        match report {
            CrawlReport::Failed { .. } => return 2,
            CrawlReport::Completed(result) => found_any |= result.has_signals(),
        }
    }

    if found_any {
        0
    } else {
        1
    }
}

fn print_report(report: &CrawlReport) {
    match report {
        CrawlReport::Completed(result) => print_result(result),
        CrawlReport::Failed { error } => println!("❌ {}", error),
    }
}

// Prints a crawl result as human-readable tables
fn print_result(result: &AggregateResult) {
    let summary = result.summary_row();

    println!();
    println!("{:<60} {:>6} {:>8} {:>7}", "PAGE", "DEPTH", "EMAILS", "PHONES");
    println!("{}", "=".repeat(84));

    for page in result.page_rows() {
        // Truncate URL if too long for display
        let url_display = if page.url.chars().count() > 57 {
            format!("{}...", page.url.chars().take(57).collect::<String>())
        } else {
            page.url.clone()
        };

        println!(
            "{:<60} {:>6} {:>8} {:>7}",
            url_display, page.depth, page.emails_found, page.phones_found
        );
    }

    println!();
    print_list("📧 Emails", result.all_emails.iter());
    print_list("📞 Phones", result.all_phones.iter());

    println!("🏠 Addresses:");
    if result.all_addresses.is_empty() {
        println!("   (none)");
    }
    for address in &result.all_addresses {
        let mut line = address.street.clone();
        if let Some(state) = &address.state {
            line.push_str(&format!(", {}", state));
        }
        if let Some(zip) = &address.zip {
            line.push_str(&format!(" {}", zip));
        }
        println!("   {}", line);
    }

    println!("🔗 Social media:");
    if result.all_social_media.is_empty() {
        println!("   (none)");
    }
    for (platform, links) in &result.all_social_media {
        for link in links {
            println!("   {:<10} {}", platform, link);
        }
    }

    println!();
    println!("📊 Summary:");
    println!("   📄 Pages scraped: {}", summary.pages_scraped);
    println!("   🧭 Max depth reached: {}", summary.max_depth_reached);
    println!("   📧 Emails: {}", result.all_emails.len());
    println!("   📞 Phones: {}", result.all_phones.len());
    println!("   🏠 Addresses: {}", result.all_addresses.len());
    println!("   🔗 Social profiles: {}", summary.social_profiles);
    println!("   🕒 Finished at: {}", summary.timestamp.format("%Y-%m-%d %H:%M:%S UTC"));
}

fn print_list<'a>(title: &str, items: impl Iterator<Item = &'a String>) {
    println!("{}:", title);
    let mut empty = true;
    for item in items {
        println!("   {}", item);
        empty = false;
    }
    if empty {
        println!("   (none)");
    }
}
