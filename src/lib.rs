//! # spider-frontier
//!
//! Frontier controller of a concurrent web spider.
//!
//! Every URI a crawl session learns about, whether an operator seed or a link
//! or form a parser found in fetched content, passes through the
//! [`Frontier`]. It guarantees that each (URI, method) pair is scheduled at
//! most once, runs the fetch filters, reports every outcome to the engine's
//! listeners and emits the admitted fetch tasks to the crawl engine.
//!
//! ## Example
//!
//! ```rust
//! use spider_frontier::filter::default::DefaultFetchFilter;
//! use spider_frontier::{FrontierBuilder, FrontierConfig, Method, Response, TaskQueue};
//!
//! let (queue, tasks) = TaskQueue::new(FrontierConfig::default());
//! let frontier = FrontierBuilder::new(queue)
//!     .add_fetch_filter(DefaultFetchFilter::new().with_scope("example.com"))
//!     .build()
//!     .unwrap();
//!
//! frontier.add_seed("https://example.com/");
//! let seed = tasks.try_recv().unwrap().unwrap();
//!
//! // the engine fetches `seed` and hands the page to the parsers
//! let page = Response::new(seed.url.clone(), 200, r#"<a href="/docs">docs</a>"#)
//!     .with_content_type("text/html");
//! for parser in frontier.parsers() {
//!     if parser.can_parse(&page) {
//!         parser.parse(&page, seed.depth);
//!     }
//! }
//!
//! let next = tasks.try_recv().unwrap().unwrap();
//! assert_eq!(next.url.as_str(), "https://example.com/docs");
//! assert_eq!(next.depth, 1);
//! assert!(frontier.has_visited("https://example.com/docs", Method::Get));
//! ```

pub mod builder;
pub mod engine;
pub mod error;
pub mod filter;
pub mod frontier;
pub mod listener;
pub mod parser;
pub mod prelude;
pub mod request;
pub mod response;
pub mod stats;
pub mod visited;

#[cfg(test)]
pub(crate) mod test_support;

pub use builder::{FormConfig, FrontierBuilder, FrontierConfig};
pub use engine::{CrawlEngine, FoundListener, SubmitError, TaskQueue};
pub use error::FrontierError;
pub use filter::{FetchFilter, FetchStatus, FilterChain, ParseFilter, RejectReason, Rejection};
pub use frontier::{Admission, Frontier};
pub use listener::{DiscoveryListener, ListenerSet};
pub use parser::{HtmlFormParser, HtmlLinkParser, Parser, ParserRegistry};
pub use request::{Candidate, Method, Provenance, Task};
pub use response::Response;
pub use stats::{FrontierStats, StatsSnapshot};
pub use visited::VisitedStore;
