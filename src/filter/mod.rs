//! # Filter Module
//!
//! Fetch-admission and parse-admission predicates.
//!
//! ## Overview
//!
//! A [`FetchFilter`] decides whether a URL may be fetched at all. The
//! [`FilterChain`] runs the registered fetch filters in registration order and
//! stops at the first one that does not return [`FetchStatus::Valid`]; that
//! status is the verdict. A URL is admitted only when every filter accepts it.
//!
//! [`ParseFilter`]s are stored next to the fetch filters and exposed to the
//! external parsing pipeline, which asks them whether a fetched resource should
//! be handed to the parsers. The chain never evaluates them itself.
//!
//! Filters are registered while the session is being built and are read-only
//! afterwards, so evaluation takes no locks.

pub mod default;

use crate::response::Response;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::trace;
use url::Url;

/// Why a filter refused a URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum RejectReason {
    /// The scheme is not one the spider can fetch.
    IllegalProtocol,
    /// The host is outside the crawl scope.
    OutOfScope,
    /// An operator-supplied exclusion rule matched.
    UserRules,
    /// A reason defined by a custom filter.
    Custom(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::IllegalProtocol => f.write_str("illegal protocol"),
            RejectReason::OutOfScope => f.write_str("out of scope"),
            RejectReason::UserRules => f.write_str("excluded by user rules"),
            RejectReason::Custom(reason) => f.write_str(reason),
        }
    }
}

/// A rejection together with the filter that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub filter: String,
    pub reason: RejectReason,
}

/// Classification of a discovered URI, reported to session listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FetchStatus {
    Valid,
    Rejected(Rejection),
    /// The URI could not be parsed. Never returned by filters; the frontier
    /// reports it for candidates that fail normalization.
    Malformed(String),
}

impl FetchStatus {
    /// Shorthand for a rejection attributed to `filter`.
    pub fn rejected(filter: impl Into<String>, reason: RejectReason) -> Self {
        FetchStatus::Rejected(Rejection {
            filter: filter.into(),
            reason,
        })
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, FetchStatus::Valid)
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            FetchStatus::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStatus::Valid => f.write_str("valid"),
            FetchStatus::Rejected(rejection) => {
                write!(f, "{} (filter: {})", rejection.reason, rejection.filter)
            }
            FetchStatus::Malformed(error) => write!(f, "malformed: {}", error),
        }
    }
}

/// Decides whether a URL may be fetched.
pub trait FetchFilter: Send + Sync {
    /// Name used to attribute rejections and in logs.
    fn name(&self) -> &str;

    fn evaluate(&self, url: &Url) -> FetchStatus;
}

/// Decides whether a fetched resource should be parsed.
pub trait ParseFilter: Send + Sync {
    fn name(&self) -> &str;

    fn accepts(&self, response: &Response) -> bool;
}

/// Ordered fetch and parse filters for one crawl session.
#[derive(Default, Clone)]
pub struct FilterChain {
    fetch_filters: Vec<Arc<dyn FetchFilter>>,
    parse_filters: Vec<Arc<dyn ParseFilter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fetch filter; evaluation follows insertion order.
    pub fn add_fetch_filter(&mut self, filter: Arc<dyn FetchFilter>) {
        self.fetch_filters.push(filter);
    }

    /// Appends a parse filter.
    pub fn add_parse_filter(&mut self, filter: Arc<dyn ParseFilter>) {
        self.parse_filters.push(filter);
    }

    pub fn fetch_filters(&self) -> &[Arc<dyn FetchFilter>] {
        &self.fetch_filters
    }

    pub fn parse_filters(&self) -> &[Arc<dyn ParseFilter>] {
        &self.parse_filters
    }

    /// Runs the fetch filters; the first non-valid status wins.
    pub fn admit(&self, url: &Url) -> FetchStatus {
        for filter in &self.fetch_filters {
            let status = filter.evaluate(url);
            if !status.is_valid() {
                trace!("Filter '{}' refused {}: {}", filter.name(), url, status);
                return status;
            }
        }
        FetchStatus::Valid
    }
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChain")
            .field(
                "fetch_filters",
                &self.fetch_filters.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .field(
                "parse_filters",
                &self.parse_filters.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
