//! Candidates and tasks: the units of work flowing through the frontier.
//!
//! A [`Candidate`] is what a seed or a parser hands to the frontier. Once it
//! has been marked as seen and admitted by the filter chain, it becomes a
//! [`Task`] that is handed over to the crawl engine.

use crate::error::FrontierError;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// HTTP method of a candidate or task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    /// Supplied by the operator; trusted and never filtered.
    Seed,
    /// Reported by a parser while processing fetched content.
    Discovered,
}

/// A discovered or seeded URI awaiting admission.
///
/// Candidates are immutable once built. The constructors guarantee that a
/// request body is only ever attached to a `POST` candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    uri: String,
    method: Method,
    depth: u32,
    body: Option<String>,
    provenance: Provenance,
}

impl Candidate {
    /// A seed: `GET` at depth 0.
    pub fn seed(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            method: Method::Get,
            depth: 0,
            body: None,
            provenance: Provenance::Seed,
        }
    }

    /// A hyperlink found in fetched content.
    pub fn link(uri: impl Into<String>, depth: u32) -> Self {
        Self {
            uri: uri.into(),
            method: Method::Get,
            depth,
            body: None,
            provenance: Provenance::Discovered,
        }
    }

    /// A form submission found in fetched content.
    pub fn form(uri: impl Into<String>, depth: u32, body: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            method: Method::Post,
            depth,
            body: Some(body.into()),
            provenance: Provenance::Discovered,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn is_seed(&self) -> bool {
        self.provenance == Provenance::Seed
    }

    /// Turns an admitted candidate into a task for the given normalized URL.
    pub(crate) fn into_task(self, url: Url) -> Task {
        Task {
            url,
            depth: self.depth,
            method: self.method,
            body: self.body,
        }
    }
}

/// A fetch task handed to the crawl engine.
///
/// Ownership moves to the engine on submission; the frontier keeps no
/// reference to submitted tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub url: Url,
    pub depth: u32,
    pub method: Method,
    pub body: Option<String>,
}

impl Task {
    /// Creates a `GET` task.
    pub fn get(url: Url, depth: u32) -> Self {
        Self {
            url,
            depth,
            method: Method::Get,
            body: None,
        }
    }

    /// Creates a `POST` task carrying a request body.
    pub fn post(url: Url, depth: u32, body: impl Into<String>) -> Self {
        Self {
            url,
            depth,
            method: Method::Post,
            body: Some(body.into()),
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} (depth {})", self.method, self.url, self.depth)
    }
}

/// Parses a candidate string into a URL.
///
/// The result is consumed right at the discovery boundary, so nothing past the
/// frontier ever sees an unparsed target.
pub fn normalize_uri(uri: &str) -> Result<Url, FrontierError> {
    Url::parse(uri).map_err(|source| FrontierError::MalformedUri {
        uri: uri.to_string(),
        source,
    })
}
