//! Stock filters for common crawl policies.

use super::{FetchFilter, FetchStatus, ParseFilter, RejectReason};
use crate::error::FrontierError;
use crate::response::Response;
use regex::Regex;
use tracing::debug;
use url::Url;

/// Scheme, scope and exclusion checks.
///
/// - only `http` and `https` URLs are fetchable;
/// - when a scope is set, the host must be one of the scope domains (or,
///   if enabled, a subdomain of one);
/// - a URL matching any exclusion pattern is refused.
#[derive(Debug, Clone, Default)]
pub struct DefaultFetchFilter {
    scope: Vec<String>,
    include_subdomains: bool,
    excludes: Vec<Regex>,
}

impl DefaultFetchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a domain to the crawl scope.
    pub fn with_scope(mut self, domain: impl Into<String>) -> Self {
        self.scope.push(domain.into().to_ascii_lowercase());
        self
    }

    pub fn include_subdomains(mut self, include: bool) -> Self {
        self.include_subdomains = include;
        self
    }

    /// Adds an exclusion regex, matched against the full URL.
    pub fn with_exclude(mut self, pattern: &str) -> Result<Self, FrontierError> {
        let regex = Regex::new(pattern).map_err(|e| {
            FrontierError::ConfigurationError(format!("invalid exclude pattern '{}': {}", pattern, e))
        })?;
        self.excludes.push(regex);
        Ok(self)
    }

    fn in_scope(&self, url: &Url) -> bool {
        if self.scope.is_empty() {
            return true;
        }
        let Some(host) = url.host_str().map(str::to_ascii_lowercase) else {
            return false;
        };
        self.scope.iter().any(|domain| {
            host == *domain
                || (self.include_subdomains && host.ends_with(&format!(".{}", domain)))
        })
    }
}

impl FetchFilter for DefaultFetchFilter {
    fn name(&self) -> &str {
        "default"
    }

    fn evaluate(&self, url: &Url) -> FetchStatus {
        if !matches!(url.scheme(), "http" | "https") {
            return FetchStatus::rejected(self.name(), RejectReason::IllegalProtocol);
        }
        if !self.in_scope(url) {
            return FetchStatus::rejected(self.name(), RejectReason::OutOfScope);
        }
        if let Some(pattern) = self.excludes.iter().find(|re| re.is_match(url.as_str())) {
            debug!("{} matched exclude pattern {}", url, pattern.as_str());
            return FetchStatus::rejected(self.name(), RejectReason::UserRules);
        }
        FetchStatus::Valid
    }
}

/// Refuses to parse oversized bodies and content that is not text.
#[derive(Debug, Clone)]
pub struct DefaultParseFilter {
    max_body_bytes: usize,
}

impl DefaultParseFilter {
    pub const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

    pub fn new(max_body_bytes: usize) -> Self {
        Self { max_body_bytes }
    }
}

impl Default for DefaultParseFilter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_BODY_BYTES)
    }
}

impl ParseFilter for DefaultParseFilter {
    fn name(&self) -> &str {
        "default"
    }

    fn accepts(&self, response: &Response) -> bool {
        if response.body.len() > self.max_body_bytes {
            return false;
        }
        match &response.content_type {
            Some(content_type) => {
                let content_type = content_type.to_ascii_lowercase();
                content_type.starts_with("text/")
                    || content_type.contains("html")
                    || content_type.contains("xml")
            }
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn non_http_schemes_are_illegal() {
        let filter = DefaultFetchFilter::new();
        let status = filter.evaluate(&url("ftp://x/file"));
        assert_eq!(
            status.rejection().map(|r| &r.reason),
            Some(&RejectReason::IllegalProtocol)
        );
        assert!(filter.evaluate(&url("https://x/")).is_valid());
    }

    #[test]
    fn scope_with_and_without_subdomains() {
        let strict = DefaultFetchFilter::new().with_scope("Example.com");
        assert!(strict.evaluate(&url("http://example.com/a")).is_valid());
        assert_eq!(
            strict.evaluate(&url("http://www.example.com/a")),
            FetchStatus::rejected("default", RejectReason::OutOfScope)
        );

        let loose = strict.clone().include_subdomains(true);
        assert!(loose.evaluate(&url("http://www.example.com/a")).is_valid());
        assert!(!loose.evaluate(&url("http://notexample.com/a")).is_valid());
    }

    #[test]
    fn exclusion_patterns_are_user_rules() {
        let filter = DefaultFetchFilter::new()
            .with_exclude(r"/logout")
            .expect("valid pattern");
        assert_eq!(
            filter.evaluate(&url("http://x/app/logout?now=1")),
            FetchStatus::rejected("default", RejectReason::UserRules)
        );
        assert!(filter.evaluate(&url("http://x/app/login")).is_valid());
        assert!(DefaultFetchFilter::new().with_exclude("(").is_err());
    }

    #[test]
    fn parse_filter_checks_size_and_type() {
        let filter = DefaultParseFilter::new(8);
        let base = url("http://x/");
        assert!(filter.accepts(&Response::new(base.clone(), 200, "<p>hi</p>"[..8].to_string())));
        assert!(!filter.accepts(&Response::new(base.clone(), 200, "0123456789")));
        assert!(!filter.accepts(
            &Response::new(base.clone(), 200, "png").with_content_type("image/png")
        ));
        assert!(filter.accepts(
            &Response::new(base, 200, "<a/>").with_content_type("application/xhtml+xml")
        ));
    }
}
