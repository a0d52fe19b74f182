//! Form submission extraction from HTML pages.
//!
//! Each `<form>` becomes one discovery: a `GET` form is reported as a link
//! whose query string holds the encoded fields, a `POST` form as a form
//! action carrying the encoded body.

use super::{document_base, selector, Parser};
use crate::builder::FormConfig;
use crate::error::FrontierError;
use crate::listener::{DiscoveryListener, ListenerSet};
use crate::response::Response;
use scraper::{ElementRef, Html, Selector};
use std::sync::Weak;
use tracing::{debug, trace};
use url::form_urlencoded;

#[derive(Debug)]
pub struct HtmlFormParser {
    config: FormConfig,
    listeners: ListenerSet,
    base: Selector,
    forms: Selector,
    fields: Selector,
    options: Selector,
}

impl HtmlFormParser {
    pub fn new(config: FormConfig) -> Result<Self, FrontierError> {
        Ok(Self {
            config,
            listeners: ListenerSet::new(),
            base: selector("base[href]")?,
            forms: selector("form")?,
            fields: selector("input[name], textarea[name], select[name]")?,
            options: selector("option")?,
        })
    }

    /// Name/value pairs a submission of `form` would send, capped at
    /// `max_fields_per_form`.
    fn collect_fields(&self, form: ElementRef<'_>) -> Vec<(String, String)> {
        let mut fields = Vec::new();
        for field in form.select(&self.fields) {
            if fields.len() >= self.config.max_fields_per_form {
                debug!(
                    "Form field limit ({}) reached, ignoring remaining fields",
                    self.config.max_fields_per_form
                );
                break;
            }

            let element = field.value();
            let Some(name) = element.attr("name").filter(|n| !n.is_empty()) else {
                continue;
            };

            let value = match element.name() {
                "textarea" => {
                    let text: String = field.text().collect();
                    self.or_default(Some(text.trim()))
                }
                "select" => self.selected_option(field),
                _ => {
                    let kind = element.attr("type").unwrap_or("text").to_ascii_lowercase();
                    match kind.as_str() {
                        "submit" | "button" | "reset" | "image" | "file" => continue,
                        "checkbox" | "radio" => {
                            if element.attr("checked").is_none() {
                                continue;
                            }
                            element.attr("value").unwrap_or("on").to_string()
                        }
                        _ => self.or_default(element.attr("value")),
                    }
                }
            };
            fields.push((name.to_string(), value));
        }
        fields
    }

    fn selected_option(&self, select: ElementRef<'_>) -> String {
        let mut options = select.select(&self.options).peekable();
        let first = options.peek().copied();
        let chosen = options
            .find(|option| option.value().attr("selected").is_some())
            .or(first);
        match chosen {
            Some(option) => match option.value().attr("value") {
                Some(value) => value.to_string(),
                None => self.or_default(Some(option.text().collect::<String>().trim())),
            },
            None => self.config.default_field_value.clone(),
        }
    }

    fn or_default(&self, value: Option<&str>) -> String {
        match value {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => self.config.default_field_value.clone(),
        }
    }
}

impl Parser for HtmlFormParser {
    fn name(&self) -> &str {
        "html-forms"
    }

    fn parse(&self, response: &Response, depth: u32) -> usize {
        if !self.config.process_forms {
            return 0;
        }

        let text = response.text();
        let document = Html::parse_document(&text);
        let base = document_base(&document, &self.base, &response.url);
        let mut found = 0;

        for form in document.select(&self.forms) {
            let element = form.value();
            let mut target = match element.attr("action").map(str::trim) {
                Some(action) if !action.is_empty() => match base.join(action) {
                    Ok(url) => url,
                    Err(e) => {
                        debug!("Skipping form with unresolvable action '{}': {}", action, e);
                        continue;
                    }
                },
                _ => base.clone(),
            };
            if !matches!(target.scheme(), "http" | "https") {
                trace!("Skipping form with non-HTTP action {}", target);
                continue;
            }
            target.set_fragment(None);

            let fields = self.collect_fields(form);
            let encoded = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(fields.iter())
                .finish();

            let is_post = element
                .attr("method")
                .is_some_and(|m| m.trim().eq_ignore_ascii_case("post"));
            if is_post {
                if !self.config.post_forms {
                    debug!("POST form to {} skipped, POST forms are disabled", target);
                    continue;
                }
                trace!("Found POST form {} with {} fields", target, fields.len());
                self.listeners
                    .notify_form(response, depth.saturating_add(1), target.as_str(), &encoded);
            } else {
                target.set_query((!encoded.is_empty()).then_some(encoded.as_str()));
                trace!("Found GET form {}", target);
                self.listeners
                    .notify_link(response, depth.saturating_add(1), target.as_str(), false);
            }
            found += 1;
        }

        found
    }

    fn subscribe(&mut self, listener: Weak<dyn DiscoveryListener>) {
        self.listeners.subscribe(listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{page, RecordingListener};
    use std::sync::Arc;

    fn subscribed_parser(config: FormConfig) -> (HtmlFormParser, Arc<RecordingListener>) {
        let listener = Arc::new(RecordingListener::default());
        let mut parser = HtmlFormParser::new(config).expect("selectors compile");
        let weak = Arc::downgrade(&listener) as Weak<dyn DiscoveryListener>;
        parser.subscribe(weak);
        (parser, listener)
    }

    const LOGIN: &str = r#"
        <form action="/login" method="POST">
            <input type="text" name="user">
            <input type="password" name="pass" value="secret">
            <input type="checkbox" name="remember" checked>
            <input type="checkbox" name="newsletter" value="yes">
            <select name="lang"><option value="en">English</option><option value="de" selected>Deutsch</option></select>
            <textarea name="note">hello there</textarea>
            <input type="submit" name="go" value="Sign in">
        </form>"#;

    #[test]
    fn post_forms_report_encoded_body() {
        let (parser, listener) = subscribed_parser(FormConfig::default());
        let response = page("http://x/account/", LOGIN);

        assert_eq!(parser.parse(&response, 0), 1);
        assert!(listener.links().is_empty());
        assert_eq!(
            listener.forms(),
            vec![(
                "http://x/login".to_string(),
                1,
                "user=spider&pass=secret&remember=on&lang=de&note=hello+there".to_string()
            )]
        );
    }

    #[test]
    fn get_forms_become_links_with_query() {
        let (parser, listener) = subscribed_parser(FormConfig::default());
        let response = page(
            "http://x/search.html",
            r#"<form><input name="q" value="rust lang"><select name="sort"><option>newest</option></select></form>"#,
        );

        assert_eq!(parser.parse(&response, 4), 1);
        assert_eq!(
            listener.links(),
            vec![("http://x/search.html?q=rust+lang&sort=newest".to_string(), 5, false)]
        );
    }

    #[test]
    fn field_limit_and_toggles_are_honored() {
        let config = FormConfig {
            max_fields_per_form: 2,
            ..FormConfig::default()
        };
        let (parser, listener) = subscribed_parser(config);
        parser.parse(&page("http://x/", LOGIN), 0);
        assert_eq!(listener.forms()[0].2, "user=spider&pass=secret");

        let no_post = FormConfig {
            post_forms: false,
            ..FormConfig::default()
        };
        let (parser, listener) = subscribed_parser(no_post);
        assert_eq!(parser.parse(&page("http://x/", LOGIN), 0), 0);
        assert!(listener.forms().is_empty());

        let disabled = FormConfig {
            process_forms: false,
            ..FormConfig::default()
        };
        let (parser, _) = subscribed_parser(disabled);
        assert_eq!(parser.parse(&page("http://x/", LOGIN), 0), 0);
    }

    #[test]
    fn form_depth_saturates_at_the_maximum() {
        let (parser, listener) = subscribed_parser(FormConfig::default());
        parser.parse(&page("http://x/", LOGIN), u32::MAX);
        assert_eq!(listener.forms()[0].1, u32::MAX);

        parser.parse(&page("http://x/", r#"<form><input name="q"></form>"#), u32::MAX);
        assert_eq!(listener.links()[0].1, u32::MAX);
    }

    #[test]
    fn non_http_actions_are_skipped() {
        let (parser, listener) = subscribed_parser(FormConfig::default());
        let response = page(
            "http://x/",
            r#"<form action="javascript:submit()" method="post"><input name="a"></form>"#,
        );
        assert_eq!(parser.parse(&response, 0), 0);
        assert!(listener.forms().is_empty());
    }
}
