//! A "prelude" for users of the `spider-frontier` crate.
//!
//! This prelude re-exports the types and traits needed to wire a frontier
//! into a crawl engine and to write custom filters and parsers.
//!
//! # Example
//!
//! ```
//! use spider_frontier::prelude::*;
//! ```

pub use crate::{
    // Core structs
    Admission,
    Frontier,
    FrontierBuilder,
    FrontierConfig,
    Response,
    Task,
    TaskQueue,
    // Extension traits
    CrawlEngine,
    DiscoveryListener,
    FetchFilter,
    FoundListener,
    ParseFilter,
    Parser,
    // Outcomes
    FetchStatus,
    FrontierError,
    Method,
    RejectReason,
};
