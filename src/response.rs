//! The fetched page handed to parsers and parse filters.

use bytes::Bytes;
use std::borrow::Cow;
use url::Url;

/// A fetched resource as seen by parsers.
///
/// The crawl engine builds these after a fetch; the frontier only reads them
/// (they are the `sourceResponse` of every discovery callback).
#[derive(Debug, Clone)]
pub struct Response {
    /// The final URL of the fetched resource, used as base for relative links.
    pub url: Url,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl Response {
    pub fn new(url: Url, status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            url,
            status,
            content_type: None,
            body: body.into(),
        }
    }

    /// Builder-style setter for the `Content-Type` header value.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// The body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Returns `true` if the content type (or, lacking one, the body) looks like HTML.
    pub fn is_html(&self) -> bool {
        match &self.content_type {
            Some(content_type) => {
                let content_type = content_type.to_ascii_lowercase();
                content_type.contains("text/html") || content_type.contains("xhtml")
            }
            None => {
                let head = &self.body[..self.body.len().min(512)];
                let head = String::from_utf8_lossy(head).to_ascii_lowercase();
                head.contains("<html") || head.contains("<!doctype html")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_detection_uses_content_type_then_sniffing() {
        let url = Url::parse("http://x/").unwrap();
        let typed = Response::new(url.clone(), 200, "plain").with_content_type("text/html; charset=utf-8");
        assert!(typed.is_html());

        let json = Response::new(url.clone(), 200, "<html>").with_content_type("application/json");
        assert!(!json.is_html());

        let sniffed = Response::new(url, 200, "<!DOCTYPE html><html><body></body></html>");
        assert!(sniffed.is_html());
    }
}
