//! Crawl statistics
//!
//! Counters are updated lock-free by crawl tasks and snapshotted into a
//! [`CrawlSummary`] when the run finishes.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared by all crawl tasks
#[derive(Debug)]
pub struct CrawlStats {
    started_at: DateTime<Utc>,
    pub pages_claimed: AtomicU64,
    pub pages_fetched: AtomicU64,
    pub fetch_failures: AtomicU64,
    pub pages_saved: AtomicU64,
    pub save_failures: AtomicU64,
    pub links_discovered: AtomicU64,
    pub tasks_spawned: AtomicU64,
    pub duplicate_claims: AtomicU64,
    pub gate_rejections: AtomicU64,
}

impl Default for CrawlStats {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlStats {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            pages_claimed: AtomicU64::new(0),
            pages_fetched: AtomicU64::new(0),
            fetch_failures: AtomicU64::new(0),
            pages_saved: AtomicU64::new(0),
            save_failures: AtomicU64::new(0),
            links_discovered: AtomicU64::new(0),
            tasks_spawned: AtomicU64::new(0),
            duplicate_claims: AtomicU64::new(0),
            gate_rejections: AtomicU64::new(0),
        }
    }

    /// Increments a counter by one
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a snapshot of the counters
    pub fn snapshot(&self, edges_recorded: usize) -> CrawlSummary {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        CrawlSummary {
            started_at: self.started_at,
            finished_at: Utc::now(),
            pages_claimed: load(&self.pages_claimed),
            pages_fetched: load(&self.pages_fetched),
            fetch_failures: load(&self.fetch_failures),
            pages_saved: load(&self.pages_saved),
            save_failures: load(&self.save_failures),
            links_discovered: load(&self.links_discovered),
            tasks_spawned: load(&self.tasks_spawned),
            duplicate_claims: load(&self.duplicate_claims),
            gate_rejections: load(&self.gate_rejections),
            edges_recorded: edges_recorded as u64,
        }
    }
}

/// Statistics for a finished crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Pages claimed in the crawl graph
    pub pages_claimed: u64,

    /// Pages fetched successfully
    pub pages_fetched: u64,

    /// Fetches that ended in an error
    pub fetch_failures: u64,

    /// Pages written under the save root
    pub pages_saved: u64,

    /// Pages whose content could not be written
    pub save_failures: u64,

    /// Candidate links extracted from fetched content
    pub links_discovered: u64,

    /// Crawl tasks queued, seeds included
    pub tasks_spawned: u64,

    /// Tasks that lost the claim race for their page
    pub duplicate_claims: u64,

    /// Seeds and links refused by the allow-list
    pub gate_rejections: u64,

    /// Discovery edges in the crawl graph
    pub edges_recorded: u64,
}

impl CrawlSummary {
    /// Wall-clock duration of the crawl in seconds
    pub fn duration_seconds(&self) -> u64 {
        (self.finished_at - self.started_at).num_seconds().max(0) as u64
    }
}

/// Prints a crawl summary to stdout
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary ===\n");
    println!("Started:  {}", summary.started_at.to_rfc3339());
    println!("Finished: {}", summary.finished_at.to_rfc3339());
    println!("Duration: {}s", summary.duration_seconds());
    println!();
    println!("Pages claimed:    {}", summary.pages_claimed);
    println!("Pages fetched:    {}", summary.pages_fetched);
    println!("Fetch failures:   {}", summary.fetch_failures);
    println!("Pages saved:      {}", summary.pages_saved);
    println!("Save failures:    {}", summary.save_failures);
    println!("Links discovered: {}", summary.links_discovered);
    println!("Tasks spawned:    {}", summary.tasks_spawned);
    println!("Duplicate claims: {}", summary.duplicate_claims);
    println!("Gate rejections:  {}", summary.gate_rejections);
    println!("Edges recorded:   {}", summary.edges_recorded);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let stats = CrawlStats::new();
        CrawlStats::bump(&stats.pages_claimed);
        CrawlStats::bump(&stats.pages_claimed);
        CrawlStats::bump(&stats.fetch_failures);
        CrawlStats::bump(&stats.gate_rejections);

        let summary = stats.snapshot(5);
        assert_eq!(summary.pages_claimed, 2);
        assert_eq!(summary.fetch_failures, 1);
        assert_eq!(summary.pages_fetched, 0);
        assert_eq!(summary.gate_rejections, 1);
        assert_eq!(summary.edges_recorded, 5);
        assert!(summary.finished_at >= summary.started_at);
    }
}
