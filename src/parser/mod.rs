//! # Parser Module
//!
//! Content parsers and the registry that subscribes the frontier to them.
//!
//! ## Overview
//!
//! The crawl engine runs every registered [`Parser`] whose `can_parse` accepts
//! a fetched page. Parsers do not schedule anything themselves: they report
//! each hyperlink or form submission to their [`ListenerSet`], and the
//! frontier, subscribed when the [`ParserRegistry`] accepted the parser, turns
//! admitted discoveries into tasks.
//!
//! Two parsers are always present:
//! - [`HtmlLinkParser`]: anchors, frames, scripts, images and meta refreshes;
//! - [`HtmlFormParser`]: form submissions, shaped by the session's
//!   [`FormConfig`](crate::builder::FormConfig).

pub mod form;
pub mod html;

pub use form::HtmlFormParser;
pub use html::HtmlLinkParser;

use crate::error::FrontierError;
use crate::listener::DiscoveryListener;
use crate::response::Response;
use scraper::{Html, Selector};
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::debug;
use url::Url;

/// Extracts candidates from fetched content.
pub trait Parser: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this parser understands the response.
    fn can_parse(&self, response: &Response) -> bool {
        response.is_html()
    }

    /// Parses a page fetched at `depth` and reports discoveries (at
    /// `depth + 1`) to the subscribed listeners. Returns the number of
    /// discoveries reported.
    fn parse(&self, response: &Response, depth: u32) -> usize;

    /// Adds a discovery listener.
    fn subscribe(&mut self, listener: Weak<dyn DiscoveryListener>);
}

/// The ordered parsers of a session, all subscribed to the same listener.
pub struct ParserRegistry {
    parsers: Vec<Arc<dyn Parser>>,
    listener: Weak<dyn DiscoveryListener>,
}

impl ParserRegistry {
    pub fn new(listener: Weak<dyn DiscoveryListener>) -> Self {
        Self {
            parsers: Vec::new(),
            listener,
        }
    }

    /// Subscribes the registry's listener to `parser` and appends it.
    pub fn register(&mut self, mut parser: Box<dyn Parser>) {
        parser.subscribe(self.listener.clone());
        debug!("Registered parser '{}'", parser.name());
        self.parsers.push(Arc::from(parser));
    }

    /// The parsers in registration order.
    pub fn list_all(&self) -> &[Arc<dyn Parser>] {
        &self.parsers
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

impl fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.parsers.iter().map(|p| p.name()))
            .finish()
    }
}

pub(crate) fn selector(css: &str) -> Result<Selector, FrontierError> {
    Selector::parse(css).map_err(|e| {
        FrontierError::ConfigurationError(format!("invalid selector '{}': {:?}", css, e))
    })
}

/// The URL relative references resolve against: `<base href>` if present
/// and valid, otherwise the page URL.
pub(crate) fn document_base(document: &Html, base_selector: &Selector, page: &Url) -> Url {
    document
        .select(base_selector)
        .filter_map(|element| element.value().attr("href"))
        .find_map(|href| page.join(href.trim()).ok())
        .unwrap_or_else(|| page.clone())
}
