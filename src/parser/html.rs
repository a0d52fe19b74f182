//! Hyperlink extraction from HTML pages.

use super::{document_base, selector, Parser};
use crate::error::FrontierError;
use crate::listener::{DiscoveryListener, ListenerSet};
use crate::response::Response;
use scraper::{Html, Selector};
use std::sync::Weak;
use tracing::trace;
use url::Url;

const SKIPPED_SCHEMES: [&str; 4] = ["javascript:", "mailto:", "tel:", "data:"];

/// Reports every navigable reference in an HTML page as a `GET` discovery.
///
/// Links marked `rel="nofollow"` are reported with `should_ignore` set.
#[derive(Debug)]
pub struct HtmlLinkParser {
    listeners: ListenerSet,
    base: Selector,
    anchors: Selector,
    links: Selector,
    sources: Selector,
    meta: Selector,
}

impl HtmlLinkParser {
    pub fn new() -> Result<Self, FrontierError> {
        Ok(Self {
            listeners: ListenerSet::new(),
            base: selector("base[href]")?,
            anchors: selector("a[href], area[href]")?,
            links: selector("link[href]")?,
            sources: selector("frame[src], iframe[src], script[src], img[src]")?,
            meta: selector("meta[http-equiv][content]")?,
        })
    }

    fn report(
        &self,
        response: &Response,
        base: &Url,
        reference: &str,
        depth: u32,
        should_ignore: bool,
    ) -> bool {
        match resolve(base, reference) {
            Some(uri) => {
                trace!("Found link {} on {}", uri, response.url);
                self.listeners
                    .notify_link(response, depth.saturating_add(1), &uri, should_ignore);
                true
            }
            None => false,
        }
    }
}

impl Parser for HtmlLinkParser {
    fn name(&self) -> &str {
        "html-links"
    }

    fn parse(&self, response: &Response, depth: u32) -> usize {
        let text = response.text();
        let document = Html::parse_document(&text);
        let base = document_base(&document, &self.base, &response.url);
        let mut found = 0;

        for element in document.select(&self.anchors) {
            let element = element.value();
            if let Some(href) = element.attr("href") {
                let ignore = is_nofollow(element.attr("rel"));
                found += usize::from(self.report(response, &base, href, depth, ignore));
            }
        }

        for element in document.select(&self.links) {
            if let Some(href) = element.value().attr("href") {
                found += usize::from(self.report(response, &base, href, depth, false));
            }
        }

        for element in document.select(&self.sources) {
            if let Some(src) = element.value().attr("src") {
                found += usize::from(self.report(response, &base, src, depth, false));
            }
        }

        for element in document.select(&self.meta) {
            let element = element.value();
            let is_refresh = element
                .attr("http-equiv")
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("refresh"));
            if !is_refresh {
                continue;
            }
            if let Some(target) = element.attr("content").and_then(refresh_target) {
                found += usize::from(self.report(response, &base, target, depth, false));
            }
        }

        found
    }

    fn subscribe(&mut self, listener: Weak<dyn DiscoveryListener>) {
        self.listeners.subscribe(listener);
    }
}

/// Resolves a reference against `base`, dropping the fragment. Returns
/// `None` for empty, fragment-only, non-navigable or unresolvable references.
fn resolve(base: &Url, reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() || reference.starts_with('#') {
        return None;
    }
    let lowered = reference.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme)) {
        return None;
    }
    let mut url = base.join(reference).ok()?;
    url.set_fragment(None);
    Some(url.into())
}

fn is_nofollow(rel: Option<&str>) -> bool {
    rel.is_some_and(|rel| {
        rel.split_ascii_whitespace()
            .any(|token| token.eq_ignore_ascii_case("nofollow"))
    })
}

/// Extracts the URL from a refresh value such as `5; url=/next`.
fn refresh_target(content: &str) -> Option<&str> {
    let position = content.to_ascii_lowercase().find("url=")?;
    let target = content[position + 4..]
        .trim()
        .trim_matches(|c| c == '\'' || c == '"');
    (!target.is_empty()).then_some(target)
}
