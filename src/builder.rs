//! # Builder Module
//!
//! Provides the `FrontierBuilder`, a fluent API for setting up a crawl
//! session's frontier, and the session configuration it reads.
//!
//! ## Overview
//!
//! Filters and extra parsers are registered on the builder only. Once
//! [`FrontierBuilder::build`] returns, the filter lists are frozen, so the
//! worker threads evaluate them without any locking.
//!
//! The built-in parsers are created during `build`, configured from the
//! engine's [`FrontierConfig`], and subscribed to the new frontier before it
//! is handed out.
//!
//! ## Example
//!
//! ```rust
//! use spider_frontier::filter::default::DefaultFetchFilter;
//! use spider_frontier::{FrontierBuilder, FrontierConfig, TaskQueue};
//!
//! let (queue, _tasks) = TaskQueue::new(FrontierConfig::default());
//! let frontier = FrontierBuilder::new(queue)
//!     .add_fetch_filter(DefaultFetchFilter::new().with_scope("example.com"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(frontier.parsers().len(), 2);
//! ```

use crate::engine::CrawlEngine;
use crate::error::FrontierError;
use crate::filter::{FetchFilter, FilterChain, ParseFilter};
use crate::frontier::Frontier;
use crate::parser::{HtmlFormParser, HtmlLinkParser, Parser};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Crawl-wide settings shared by the frontier and its parsers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontierConfig {
    /// Capacity of the engine's task queue.
    pub task_queue_capacity: usize,
    /// Settings for the form parser.
    pub form: FormConfig,
}

impl Default for FrontierConfig {
    fn default() -> Self {
        FrontierConfig {
            task_queue_capacity: (num_cpus::get() * 256).max(1000),
            form: FormConfig::default(),
        }
    }
}

impl FrontierConfig {
    /// Reads a config from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, FrontierError> {
        Ok(serde_json::from_str(json)?)
    }

    fn validate(&self) -> Result<(), FrontierError> {
        if self.task_queue_capacity == 0 {
            return Err(FrontierError::ConfigurationError(
                "task_queue_capacity must be greater than 0.".to_string(),
            ));
        }
        if self.form.process_forms && self.form.max_fields_per_form == 0 {
            return Err(FrontierError::ConfigurationError(
                "max_fields_per_form must be greater than 0 when forms are processed.".to_string(),
            ));
        }
        Ok(())
    }
}

/// How forms are turned into submissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Whether forms are reported at all.
    pub process_forms: bool,
    /// Whether `POST` forms are reported.
    pub post_forms: bool,
    /// Fields beyond this many are left out of a submission.
    pub max_fields_per_form: usize,
    /// Value used for fields that have none.
    pub default_field_value: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        FormConfig {
            process_forms: true,
            post_forms: true,
            max_fields_per_form: 64,
            default_field_value: "spider".to_string(),
        }
    }
}

pub struct FrontierBuilder {
    engine: Arc<dyn CrawlEngine>,
    filters: FilterChain,
    parsers: Vec<Box<dyn Parser>>,
}

impl FrontierBuilder {
    /// Creates a builder bound to the session's crawl engine.
    pub fn new(engine: Arc<dyn CrawlEngine>) -> Self {
        Self {
            engine,
            filters: FilterChain::new(),
            parsers: Vec::new(),
        }
    }

    /// Appends a fetch filter; filters run in the order they were added.
    pub fn add_fetch_filter<F>(mut self, filter: F) -> Self
    where
        F: FetchFilter + 'static,
    {
        self.filters.add_fetch_filter(Arc::new(filter));
        self
    }

    /// Appends a parse filter for the parsing pipeline to consult.
    pub fn add_parse_filter<F>(mut self, filter: F) -> Self
    where
        F: ParseFilter + 'static,
    {
        self.filters.add_parse_filter(Arc::new(filter));
        self
    }

    /// Registers an additional parser, run after the built-in ones.
    pub fn add_parser<P>(mut self, parser: P) -> Self
    where
        P: Parser + 'static,
    {
        self.parsers.push(Box::new(parser));
        self
    }

    /// Builds the frontier and subscribes it to every parser.
    pub fn build(self) -> Result<Arc<Frontier>, FrontierError> {
        let config = self.engine.config().clone();
        config.validate()?;

        let mut parsers: Vec<Box<dyn Parser>> = vec![
            Box::new(HtmlLinkParser::new()?),
            Box::new(HtmlFormParser::new(config.form.clone())?),
        ];
        parsers.extend(self.parsers);

        info!(
            "Building frontier with {} fetch filters, {} parse filters and {} parsers",
            self.filters.fetch_filters().len(),
            self.filters.parse_filters().len(),
            parsers.len()
        );
        Ok(Frontier::new(self.engine, self.filters, parsers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TaskQueue;
    use crate::filter::default::{DefaultFetchFilter, DefaultParseFilter};

    #[test]
    fn config_json_fills_defaults() {
        let config = FrontierConfig::from_json_str(
            r#"{"task_queue_capacity": 10, "form": {"post_forms": false}}"#,
        )
        .expect("valid json");
        assert_eq!(config.task_queue_capacity, 10);
        assert!(!config.form.post_forms);
        assert!(config.form.process_forms);
        assert_eq!(config.form.max_fields_per_form, 64);

        assert!(matches!(
            FrontierConfig::from_json_str("{not json"),
            Err(FrontierError::Json(_))
        ));
    }

    #[test]
    fn build_rejects_invalid_config() {
        let config = FrontierConfig {
            form: FormConfig {
                max_fields_per_form: 0,
                ..FormConfig::default()
            },
            ..FrontierConfig::default()
        };
        let (queue, _rx) = TaskQueue::new(config);
        assert!(matches!(
            FrontierBuilder::new(queue).build(),
            Err(FrontierError::ConfigurationError(_))
        ));
    }

    #[test]
    fn build_registers_filters_and_parsers_in_order() {
        let (queue, _rx) = TaskQueue::new(FrontierConfig::default());
        let frontier = FrontierBuilder::new(queue)
            .add_fetch_filter(DefaultFetchFilter::new())
            .add_parse_filter(DefaultParseFilter::default())
            .add_parser(HtmlLinkParser::new().unwrap())
            .build()
            .expect("frontier builds");

        assert_eq!(frontier.fetch_filters().len(), 1);
        assert_eq!(frontier.parse_filters().len(), 1);
        let names: Vec<_> = frontier.parsers().iter().map(|p| p.name().to_string()).collect();
        assert_eq!(names, vec!["html-links", "html-forms", "html-links"]);
    }
}
