//! Counters collected while a traversal runs

use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters shared by every branch of one run
#[derive(Debug, Default)]
pub struct CrawlStats {
    families_fetched: AtomicU64,
    people_fetched: AtomicU64,
    families_absent: AtomicU64,
    people_absent: AtomicU64,
    revisits_skipped: AtomicU64,
    generations: AtomicU64,
    max_depth: AtomicU64,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_family(&self, found: bool) {
        if found {
            self.families_fetched.fetch_add(1, Ordering::Relaxed);
        } else {
            self.families_absent.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_person(&self, found: bool) {
        if found {
            self.people_fetched.fetch_add(1, Ordering::Relaxed);
        } else {
            self.people_absent.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// An id was reached again after another branch had already claimed it
    pub fn record_revisit(&self) {
        self.revisits_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// A breadth-first level finished
    pub fn record_generation(&self) {
        self.generations.fetch_add(1, Ordering::Relaxed);
    }

    /// A depth-first branch expanded a family at `depth`
    pub fn record_depth(&self, depth: u64) {
        self.max_depth.fetch_max(depth, Ordering::Relaxed);
    }

    pub fn summary(&self) -> CrawlSummary {
        CrawlSummary {
            families_fetched: self.families_fetched.load(Ordering::Relaxed),
            people_fetched: self.people_fetched.load(Ordering::Relaxed),
            families_absent: self.families_absent.load(Ordering::Relaxed),
            people_absent: self.people_absent.load(Ordering::Relaxed),
            revisits_skipped: self.revisits_skipped.load(Ordering::Relaxed),
            generations: self.generations.load(Ordering::Relaxed),
            max_depth: self.max_depth.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`CrawlStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Family lookups that returned a record
    pub families_fetched: u64,
    /// Person lookups that returned a record
    pub people_fetched: u64,
    /// Family lookups that came back absent
    pub families_absent: u64,
    /// Person lookups that came back absent
    pub people_absent: u64,
    /// Claims lost to an earlier branch
    pub revisits_skipped: u64,
    /// Breadth-first levels processed (0 for depth-first)
    pub generations: u64,
    /// Deepest depth-first recursion level reached (0 for breadth-first)
    pub max_depth: u64,
}

impl CrawlSummary {
    /// Total lookups sent to the record store
    pub fn total_requests(&self) -> u64 {
        self.families_fetched + self.people_fetched + self.families_absent + self.people_absent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let stats = CrawlStats::new();
        stats.record_family(true);
        stats.record_family(false);
        stats.record_person(true);
        stats.record_person(true);
        stats.record_revisit();
        stats.record_depth(3);
        stats.record_depth(1);

        let summary = stats.summary();
        assert_eq!(summary.families_fetched, 1);
        assert_eq!(summary.families_absent, 1);
        assert_eq!(summary.people_fetched, 2);
        assert_eq!(summary.revisits_skipped, 1);
        assert_eq!(summary.max_depth, 3);
        assert_eq!(summary.total_requests(), 4);
    }
}
