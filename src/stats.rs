//! # Statistics Module
//!
//! Counts what happened to the candidates that passed through the frontier.
//!
//! ## Overview
//!
//! `FrontierStats` is updated from every worker thread with atomic counters
//! and a concurrent map of per-filter rejection counts. A consistent
//! [`StatsSnapshot`] backs the `Display` summary and the JSON export.
//!
//! ## Example
//!
//! ```rust,ignore
//! let stats = frontier.stats();
//! println!("{}", stats);
//! println!("{}", stats.to_json_string_pretty()?);
//! ```

use crate::error::FrontierError;
use crate::request::Method;
use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// A point-in-time copy of the counters, used for reporting.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub seeds_added: usize,
    pub links_found: usize,
    pub forms_found: usize,
    pub duplicates_skipped: usize,
    pub malformed_uris: usize,
    pub uris_filtered: usize,
    pub uris_ignored: usize,
    pub get_tasks_submitted: usize,
    pub post_tasks_submitted: usize,
    pub submit_failures: usize,
    pub rejections_by_filter: BTreeMap<String, usize>,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl StatsSnapshot {
    pub fn tasks_submitted(&self) -> usize {
        self.get_tasks_submitted + self.post_tasks_submitted
    }

    fn tasks_per_second(&self) -> f64 {
        let total_seconds = self.elapsed.as_secs_f64();
        if total_seconds > 0.0 {
            self.tasks_submitted() as f64 / total_seconds
        } else {
            0.0
        }
    }
}

/// Thread-safe counters for one crawl session.
#[derive(Debug)]
pub struct FrontierStats {
    start_time: Instant,
    seeds_added: AtomicUsize,
    links_found: AtomicUsize,
    forms_found: AtomicUsize,
    duplicates_skipped: AtomicUsize,
    malformed_uris: AtomicUsize,
    uris_filtered: AtomicUsize,
    uris_ignored: AtomicUsize,
    get_tasks_submitted: AtomicUsize,
    post_tasks_submitted: AtomicUsize,
    submit_failures: AtomicUsize,
    rejections_by_filter: DashMap<String, usize>,
}

impl FrontierStats {
    pub(crate) fn new() -> Self {
        FrontierStats {
            start_time: Instant::now(),
            seeds_added: AtomicUsize::new(0),
            links_found: AtomicUsize::new(0),
            forms_found: AtomicUsize::new(0),
            duplicates_skipped: AtomicUsize::new(0),
            malformed_uris: AtomicUsize::new(0),
            uris_filtered: AtomicUsize::new(0),
            uris_ignored: AtomicUsize::new(0),
            get_tasks_submitted: AtomicUsize::new(0),
            post_tasks_submitted: AtomicUsize::new(0),
            submit_failures: AtomicUsize::new(0),
            rejections_by_filter: DashMap::new(),
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let rejections_by_filter = self
            .rejections_by_filter
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();

        StatsSnapshot {
            seeds_added: self.seeds_added.load(Ordering::SeqCst),
            links_found: self.links_found.load(Ordering::SeqCst),
            forms_found: self.forms_found.load(Ordering::SeqCst),
            duplicates_skipped: self.duplicates_skipped.load(Ordering::SeqCst),
            malformed_uris: self.malformed_uris.load(Ordering::SeqCst),
            uris_filtered: self.uris_filtered.load(Ordering::SeqCst),
            uris_ignored: self.uris_ignored.load(Ordering::SeqCst),
            get_tasks_submitted: self.get_tasks_submitted.load(Ordering::SeqCst),
            post_tasks_submitted: self.post_tasks_submitted.load(Ordering::SeqCst),
            submit_failures: self.submit_failures.load(Ordering::SeqCst),
            rejections_by_filter,
            elapsed: self.start_time.elapsed(),
        }
    }

    pub(crate) fn increment_seeds_added(&self) {
        self.seeds_added.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_found(&self, method: Method) {
        match method {
            Method::Get => self.links_found.fetch_add(1, Ordering::SeqCst),
            Method::Post => self.forms_found.fetch_add(1, Ordering::SeqCst),
        };
    }

    pub(crate) fn increment_duplicates_skipped(&self) {
        self.duplicates_skipped.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_malformed_uris(&self) {
        self.malformed_uris.fetch_add(1, Ordering::SeqCst);
    }

    /// Records a rejection and the filter that issued it.
    pub(crate) fn record_rejection(&self, filter: &str) {
        self.uris_filtered.fetch_add(1, Ordering::SeqCst);
        *self
            .rejections_by_filter
            .entry(filter.to_string())
            .or_insert(0) += 1;
    }

    pub(crate) fn increment_uris_ignored(&self) {
        self.uris_ignored.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_tasks_submitted(&self, method: Method) {
        match method {
            Method::Get => self.get_tasks_submitted.fetch_add(1, Ordering::SeqCst),
            Method::Post => self.post_tasks_submitted.fetch_add(1, Ordering::SeqCst),
        };
    }

    pub(crate) fn increment_submit_failures(&self) {
        self.submit_failures.fetch_add(1, Ordering::SeqCst);
    }

    pub fn to_json_string(&self) -> Result<String, FrontierError> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }

    pub fn to_json_string_pretty(&self) -> Result<String, FrontierError> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }
}

impl Default for FrontierStats {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FrontierStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();

        writeln!(f, "\nFrontier Statistics")?;
        writeln!(f, "-------------------")?;
        writeln!(f, "  duration : {:?}", snapshot.elapsed)?;
        writeln!(f, "  speed    : tasks/s: {:.2}", snapshot.tasks_per_second())?;
        writeln!(
            f,
            "  found    : seeds: {}, links: {}, forms: {}, duplicates: {}",
            snapshot.seeds_added, snapshot.links_found, snapshot.forms_found, snapshot.duplicates_skipped
        )?;
        writeln!(
            f,
            "  dropped  : malformed: {}, filtered: {}, ignored: {}",
            snapshot.malformed_uris, snapshot.uris_filtered, snapshot.uris_ignored
        )?;
        writeln!(
            f,
            "  tasks    : get: {}, post: {}, failed: {}",
            snapshot.get_tasks_submitted, snapshot.post_tasks_submitted, snapshot.submit_failures
        )?;

        let filters = if snapshot.rejections_by_filter.is_empty() {
            "none".to_string()
        } else {
            snapshot
                .rejections_by_filter
                .iter()
                .map(|(filter, count)| format!("{}: {}", filter, count))
                .collect::<Vec<String>>()
                .join(", ")
        };

        writeln!(f, "  filters  : {}\n", filters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_and_rejections_show_up_in_snapshot() {
        let stats = FrontierStats::new();
        stats.increment_found(Method::Get);
        stats.increment_found(Method::Post);
        stats.record_rejection("scope");
        stats.record_rejection("scope");
        stats.record_rejection("depth");
        stats.increment_tasks_submitted(Method::Get);
        stats.increment_tasks_submitted(Method::Post);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.links_found, 1);
        assert_eq!(snapshot.forms_found, 1);
        assert_eq!(snapshot.uris_filtered, 3);
        assert_eq!(snapshot.rejections_by_filter.get("scope"), Some(&2));
        assert_eq!(snapshot.tasks_submitted(), 2);

        let summary = stats.to_string();
        assert!(summary.contains("filters  : depth: 1, scope: 2"));
        assert!(summary.contains("tasks    : get: 1, post: 1, failed: 0"));
    }

    #[test]
    fn json_export_skips_elapsed() {
        let stats = FrontierStats::new();
        stats.increment_seeds_added();
        let json: serde_json::Value =
            serde_json::from_str(&stats.to_json_string().unwrap()).unwrap();
        assert_eq!(json["seeds_added"], 1);
        assert!(json.get("elapsed").is_none());
    }
}
