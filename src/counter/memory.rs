//! In-memory unique-visitor counter
//!
//! Pages live in a sharded `DashMap`, so visits to unrelated pages only
//! contend when they land on the same shard. Each page owns its own
//! `DashSet` of visitor ids plus an atomic count, and the shard guard of the
//! page map is released before the visitor is recorded.

use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::counter::{Counter, CounterError, CounterResult};

/// Distinct visitors seen by a single page
#[derive(Debug, Default)]
pub struct PageVisits {
    visitors: DashSet<String>,
    count: AtomicU64,
}

impl PageVisits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `visitor_id`, returning `true` if it had not been seen before.
    ///
    /// The set insert decides the winner when several callers race with the
    /// same new id; only the winner bumps the count, and only after its
    /// insert landed, so `count()` never runs ahead of the set.
    pub fn record(&self, visitor_id: &str) -> bool {
        // Skip the allocation for repeat visitors
        if self.visitors.contains(visitor_id) {
            return false;
        }

        if self.visitors.insert(visitor_id.to_owned()) {
            self.count.fetch_add(1, Ordering::AcqRel);
            true
        } else {
            false
        }
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Acquire)
    }
}

/// Counter store keeping every page in process memory
#[derive(Debug, Default)]
pub struct MemoryCounter {
    pages: DashMap<String, Arc<PageVisits>>,
}

impl MemoryCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the page entry, creating it exactly once on first visit
    fn page_or_insert(&self, page: &str) -> Arc<PageVisits> {
        if let Some(entry) = self.pages.get(page) {
            return Arc::clone(entry.value());
        }

        // `entry` holds the shard write lock, so only one caller can create
        // the page; late callers find the winner's value.
        let entry = self.pages.entry(page.to_owned()).or_default();
        Arc::clone(entry.value())
    }

    fn page(&self, page: &str) -> Option<Arc<PageVisits>> {
        self.pages.get(page).map(|entry| Arc::clone(entry.value()))
    }
}

impl Counter for MemoryCounter {
    fn add_visit(&self, page: &str, visitor_id: &str) -> CounterResult<()> {
        self.page_or_insert(page).record(visitor_id);
        Ok(())
    }

    fn visits(&self, page: &str) -> CounterResult<u64> {
        self.page(page)
            .map(|visits| visits.count())
            .ok_or(CounterError::NotFound)
    }

    fn pages(&self) -> usize {
        self.pages.len()
    }
}
