// src/crawl/frontier.rs
// =============================================================================
// Crawl bookkeeping: what is waiting to be fetched, and what has been claimed.
//
// Frontier:
// - Plain FIFO queue of (url, depth) entries, so the crawl is breadth-first
// - Refuses a second copy of a URL that is already waiting
//
// VisitedSet:
// - Every URL claimed for fetching, keyed by its NormalizedUrl
// - The only way in is try_claim(), which checks and inserts under one lock
// - Counts against the page budget, so its size is the number of pages used
// - One per crawl job, created fresh by the controller
//
// Rust concepts:
// - VecDeque: push_back()/pop_front() give us a FIFO queue
// - Mutex: lets VisitedSet be shared (&self) while still being mutated
// =============================================================================

use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::normalize::{normalize, NormalizedUrl};

/// A URL waiting to be fetched, and how many hops it is from the seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrontierEntry {
    pub url: String,
    pub depth: usize,
}

impl FrontierEntry {
    pub fn new(url: impl Into<String>, depth: usize) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    // Normalized keys of everything currently in `queue`
    queued: HashSet<NormalizedUrl>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry at the back. Returns false if the same URL is already waiting.
    pub fn push(&mut self, entry: FrontierEntry) -> bool {
        if !self.queued.insert(normalize(&entry.url)) {
            return false;
        }
        self.queue.push_back(entry);
        true
    }

    pub fn pop(&mut self) -> Option<FrontierEntry> {
        let entry = self.queue.pop_front()?;
        self.queued.remove(&normalize(&entry.url));
        Some(entry)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

/// URLs claimed during the current crawl.
///
/// Claims go through [`VisitedSet::try_claim`], which is a single
/// compare-and-insert. A pool of fetch workers sharing one VisitedSet (behind
/// an `Arc`) therefore cannot both claim the same URL and spend the budget
/// twice. Do not add a separate "contains, then insert" path.
#[derive(Debug, Default)]
pub struct VisitedSet {
    inner: Mutex<VisitedInner>,
}

#[derive(Debug, Default)]
struct VisitedInner {
    seen: HashSet<NormalizedUrl>,
    // Claim order, for reporting
    order: Vec<NormalizedUrl>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    // Both collections are updated together, so a poisoned lock is still consistent
    fn lock(&self) -> MutexGuard<'_, VisitedInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims `url`. Returns true if this call claimed it, false if it was
    /// already visited.
    pub fn try_claim(&self, url: &NormalizedUrl) -> bool {
        let mut inner = self.lock();
        if !inner.seen.insert(url.clone()) {
            return false;
        }
        inner.order.push(url.clone());
        true
    }

    /// Read-only membership test, used to filter discovered links.
    /// Never use it to decide whether to claim.
    pub fn contains(&self, url: &NormalizedUrl) -> bool {
        self.lock().seen.contains(url)
    }

    pub fn len(&self) -> usize {
        self.lock().seen.len()
    }

    /// Claimed URLs in the order they were claimed.
    pub fn snapshot(&self) -> Vec<NormalizedUrl> {
        self.lock().order.clone()
    }
}
