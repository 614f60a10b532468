// src/config.rs
// =============================================================================
// Plain configuration values for one crawl.
//
// - CrawlJob: what to crawl and how far (built from the CLI, never mutated)
// - FetchSettings: how the HTTP fetcher behaves
// - ReferenceLists: the fixed word lists the extractor and discoverer use
//
// The reference lists are constants. Components receive them when they are
// constructed; nothing reads them as globals.
// =============================================================================

use std::time::Duration;

/// Everything that defines a single crawl.
#[derive(Debug, Clone)]
pub struct CrawlJob {
    /// Where the crawl starts (depth 0)
    pub seed_url: String,
    /// Upper bound on the number of URLs ever claimed as visited
    pub max_pages: usize,
    /// Deepest hop count that is still fetched (seed = 0)
    pub max_depth: usize,
    /// Pause after every processed page, success or failure
    pub delay: Duration,
    /// How long a single fetch may take before it counts as failed
    pub timeout: Duration,
}

impl CrawlJob {
    pub fn new(seed_url: impl Into<String>) -> Self {
        Self {
            seed_url: seed_url.into(),
            max_pages: 20,
            max_depth: 2,
            delay: Duration::from_millis(1000),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Settings for the reqwest-backed fetcher.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub user_agent: String,
    /// Redirects followed before a page is given up on
    pub max_redirects: usize,
}

/// Browser-like agent string; plenty of small business sites refuse bare clients.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36";

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_redirects: 5,
        }
    }
}

// -----------------------------------------------------------------------------
// Reference lists
// -----------------------------------------------------------------------------

pub const US_STATE_NAMES: &[&str] = &[
    "Alabama", "Alaska", "Arizona", "Arkansas", "California", "Colorado",
    "Connecticut", "Delaware", "Florida", "Georgia", "Hawaii", "Idaho",
    "Illinois", "Indiana", "Iowa", "Kansas", "Kentucky", "Louisiana", "Maine",
    "Maryland", "Massachusetts", "Michigan", "Minnesota", "Mississippi",
    "Missouri", "Montana", "Nebraska", "Nevada", "New Hampshire", "New Jersey",
    "New Mexico", "New York", "North Carolina", "North Dakota", "Ohio",
    "Oklahoma", "Oregon", "Pennsylvania", "Rhode Island", "South Carolina",
    "South Dakota", "Tennessee", "Texas", "Utah", "Vermont", "Virginia",
    "Washington", "West Virginia", "Wisconsin", "Wyoming",
];

pub const US_STATE_CODES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID",
    "IL", "IN", "IA", "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS",
    "MO", "MT", "NE", "NV", "NH", "NJ", "NM", "NY", "NC", "ND", "OH", "OK",
    "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA", "WV",
    "WI", "WY",
];

pub const STREET_SUFFIXES: &[&str] = &[
    "Street", "St", "Avenue", "Ave", "Road", "Rd", "Boulevard", "Blvd",
    "Drive", "Dr", "Lane", "Ln", "Way", "Court", "Ct", "Place", "Pl",
    "Parkway", "Pkwy", "Circle", "Cir", "Highway", "Hwy", "Terrace", "Ter",
];

pub const PRIORITY_KEYWORDS: &[&str] = &[
    "contact", "about", "team", "staff", "location", "office", "support",
    "help", "service", "product", "solution", "careers",
];

/// Paths ending in one of these are never fetched.
pub const EXCLUDED_EXTENSIONS: &[&str] = &[
    // documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "rtf", "txt", "csv",
    // archives
    "zip", "rar", "tar", "gz", "7z", "bz2",
    // images
    "jpg", "jpeg", "png", "gif", "svg", "webp", "bmp", "ico", "tiff",
    // audio
    "mp3", "wav", "ogg", "flac", "aac", "m4a",
    // video
    "mp4", "avi", "mov", "wmv", "mkv", "webm", "flv",
];

/// Email matches ending in one of these are asset names, not addresses.
pub const ASSET_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "webp", "bmp", "ico", "css", "js",
];

/// The read-only tables shared by the extractor and the discoverer.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceLists {
    pub state_names: &'static [&'static str],
    pub state_codes: &'static [&'static str],
    pub street_suffixes: &'static [&'static str],
    pub priority_keywords: &'static [&'static str],
    pub excluded_extensions: &'static [&'static str],
    pub asset_extensions: &'static [&'static str],
}

impl ReferenceLists {
    pub const fn standard() -> Self {
        Self {
            state_names: US_STATE_NAMES,
            state_codes: US_STATE_CODES,
            street_suffixes: STREET_SUFFIXES,
            priority_keywords: PRIORITY_KEYWORDS,
            excluded_extensions: EXCLUDED_EXTENSIONS,
            asset_extensions: ASSET_EXTENSIONS,
        }
    }
}

impl Default for ReferenceLists {
    fn default() -> Self {
        Self::standard()
    }
}
