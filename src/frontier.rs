//! The frontier controller of a crawl session.
//!
//! This module defines the `Frontier`, the single point through which every
//! seeded or discovered URI passes before it may become a fetch task. Parser
//! workers call back into it concurrently; for each candidate it
//!
//! 1. marks the (URI, method) pair as seen, stopping silently on duplicates;
//! 2. parses the URI, reporting and dropping it if that fails;
//! 3. runs the fetch filters (seeds skip this step), reporting rejections;
//! 4. reports the URI as found and, unless the parser asked to ignore it,
//!    hands a task to the crawl engine.
//!
//! The mark in step 1 is a single atomic insert, so across any interleaving
//! of callbacks at most one task is ever emitted per (URI, method) pair.

use crate::builder::FrontierConfig;
use crate::engine::CrawlEngine;
use crate::error::FrontierError;
use crate::filter::{FetchFilter, FetchStatus, FilterChain, ParseFilter};
use crate::listener::DiscoveryListener;
use crate::parser::{Parser, ParserRegistry};
use crate::request::{normalize_uri, Candidate, Method, Task};
use crate::response::Response;
use crate::stats::FrontierStats;
use crate::visited::VisitedStore;
use crossbeam::queue::SegQueue;
use std::sync::{Arc, Weak};
use tracing::{debug, error, info, trace, warn};

/// What became of a candidate.
#[derive(Debug)]
pub enum Admission {
    /// Already seen for this method; nothing was reported.
    Duplicate,
    /// The URI could not be parsed.
    Malformed(FrontierError),
    /// A fetch filter refused the URI.
    Filtered(FetchStatus),
    /// Reported as found but not fetched, on the parser's recommendation.
    Recorded,
    /// Reported as found and handed to the engine.
    Scheduled,
    /// Reported as found, but the engine refused the task. The task was salvaged.
    SubmitFailed(FrontierError),
}

impl Admission {
    pub fn is_scheduled(&self) -> bool {
        matches!(self, Admission::Scheduled)
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Admission::Duplicate)
    }
}

/// Deduplicates, filters and schedules the URIs of one crawl session.
pub struct Frontier {
    engine: Arc<dyn CrawlEngine>,
    visited: VisitedStore,
    filters: FilterChain,
    parsers: ParserRegistry,
    salvaged: SegQueue<Task>,
    stats: Arc<FrontierStats>,
}

impl Frontier {
    /// Creates the frontier and subscribes it to each parser.
    ///
    /// Parsers only hold a weak reference back, so the frontier is dropped
    /// as soon as the session lets go of it.
    pub(crate) fn new(
        engine: Arc<dyn CrawlEngine>,
        filters: FilterChain,
        parsers: Vec<Box<dyn Parser>>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Frontier>| {
            let listener: Weak<dyn DiscoveryListener> = weak.clone();
            let mut registry = ParserRegistry::new(listener);
            for parser in parsers {
                registry.register(parser);
            }

            Frontier {
                engine,
                visited: VisitedStore::new(),
                filters,
                parsers: registry,
                salvaged: SegQueue::new(),
                stats: Arc::new(FrontierStats::new()),
            }
        })
    }

    /// Adds an operator-supplied starting point.
    ///
    /// Seeds skip the fetch filters but are still deduplicated, reported as
    /// found and scheduled as `GET` at depth 0.
    pub fn add_seed(&self, uri: &str) -> Admission {
        info!("Adding seed: {}", uri);
        self.stats.increment_seeds_added();
        self.process(Candidate::seed(uri), false)
    }

    /// Runs a candidate through the same admission steps as the discovery
    /// callbacks.
    pub fn submit_candidate(&self, candidate: Candidate) -> Admission {
        self.process(candidate, false)
    }

    fn process(&self, candidate: Candidate, should_ignore: bool) -> Admission {
        let method = candidate.method();
        if !candidate.is_seed() {
            self.stats.increment_found(method);
        }

        if !self.visited.try_mark(candidate.uri(), method) {
            debug!("URI already visited ({}): {}", method, candidate.uri());
            self.stats.increment_duplicates_skipped();
            return Admission::Duplicate;
        }

        let url = match normalize_uri(candidate.uri()) {
            Ok(url) => url,
            Err(e) => {
                warn!("Dropping candidate: {}", e);
                self.stats.increment_malformed_uris();
                self.engine
                    .notify_found(candidate.uri(), &FetchStatus::Malformed(e.to_string()));
                return Admission::Malformed(e);
            }
        };

        if !candidate.is_seed() {
            let status = self.filters.admit(&url);
            if !status.is_valid() {
                warn!("URI {} was filtered with reason: {}", url, status);
                self.stats
                    .record_rejection(status.rejection().map_or("unknown", |r| r.filter.as_str()));
                self.engine.notify_found(candidate.uri(), &status);
                return Admission::Filtered(status);
            }
        }

        self.engine.notify_found(candidate.uri(), &FetchStatus::Valid);

        if should_ignore {
            debug!("URI {} is valid, but will not be fetched, by parser recommendation", url);
            self.stats.increment_uris_ignored();
            return Admission::Recorded;
        }

        match self.submit(candidate.into_task(url)) {
            Ok(()) => Admission::Scheduled,
            Err(e) => Admission::SubmitFailed(e),
        }
    }

    /// Hands a task to the engine. A refused task is kept in the salvage
    /// queue; it stays marked as seen.
    fn submit(&self, task: Task) -> Result<(), FrontierError> {
        let method = task.method;
        trace!("Submitting task {}", task);
        match self.engine.submit_task(task) {
            Ok(()) => {
                self.stats.increment_tasks_submitted(method);
                Ok(())
            }
            Err(e) => {
                let (task, error) = e.into_parts();
                error!("Failed to submit task {}: {}. Salvaging task.", task, error);
                self.stats.increment_submit_failures();
                self.salvaged.push(task);
                Err(error)
            }
        }
    }

    /// Drains the tasks the engine refused, for the engine to requeue.
    pub fn take_salvaged(&self) -> Vec<Task> {
        std::iter::from_fn(|| self.salvaged.pop()).collect()
    }

    pub fn salvaged_len(&self) -> usize {
        self.salvaged.len()
    }

    /// The configured parsers, in the order the engine should run them.
    pub fn parsers(&self) -> &[Arc<dyn Parser>] {
        self.parsers.list_all()
    }

    pub fn fetch_filters(&self) -> &[Arc<dyn FetchFilter>] {
        self.filters.fetch_filters()
    }

    /// Parse filters, for the parsing pipeline to consult.
    pub fn parse_filters(&self) -> &[Arc<dyn ParseFilter>] {
        self.filters.parse_filters()
    }

    pub fn has_visited(&self, uri: &str, method: Method) -> bool {
        self.visited.contains(uri, method)
    }

    pub fn visited_count(&self, method: Method) -> usize {
        self.visited.len(method)
    }

    pub fn config(&self) -> &FrontierConfig {
        self.engine.config()
    }

    /// Returns a cloned Arc to the session's statistics.
    pub fn stats(&self) -> Arc<FrontierStats> {
        Arc::clone(&self.stats)
    }
}

impl DiscoveryListener for Frontier {
    fn link_found(&self, response: &Response, depth: u32, uri: &str, should_ignore: bool) {
        trace!("New resource found on {}: {}", response.url, uri);
        let admission = self.process(Candidate::link(uri, depth), should_ignore);
        trace!("Link {} admission: {:?}", uri, admission);
    }

    fn form_action_found(&self, response: &Response, depth: u32, uri: &str, request_body: &str) {
        trace!("New POST resource found on {}: {}", response.url, uri);
        let admission = self.process(Candidate::form(uri, depth, request_body), false);
        trace!("Form {} admission: {:?}", uri, admission);
    }
}

impl std::fmt::Debug for Frontier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frontier")
            .field("filters", &self.filters)
            .field("parsers", &self.parsers)
            .field("visited_get", &self.visited.len(Method::Get))
            .field("visited_post", &self.visited.len(Method::Post))
            .field("salvaged", &self.salvaged.len())
            .finish()
    }
}
