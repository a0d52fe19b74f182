//! Shared fixtures for unit tests.

use crate::builder::FrontierConfig;
use crate::engine::{CrawlEngine, FoundListener, SubmitError};
use crate::filter::{FetchFilter, FetchStatus, RejectReason};
use crate::listener::DiscoveryListener;
use crate::request::Task;
use crate::response::Response;
use parking_lot::Mutex;
use url::Url;

/// An HTML response for `url`.
pub(crate) fn page(url: &str, html: &str) -> Response {
    Response::new(Url::parse(url).expect("test url"), 200, html.to_string())
        .with_content_type("text/html; charset=utf-8")
}

/// Records every discovery callback it receives.
#[derive(Default)]
pub(crate) struct RecordingListener {
    links: Mutex<Vec<(String, u32, bool)>>,
    forms: Mutex<Vec<(String, u32, String)>>,
}

impl RecordingListener {
    pub(crate) fn links(&self) -> Vec<(String, u32, bool)> {
        self.links.lock().clone()
    }

    pub(crate) fn forms(&self) -> Vec<(String, u32, String)> {
        self.forms.lock().clone()
    }
}

impl DiscoveryListener for RecordingListener {
    fn link_found(&self, _response: &Response, depth: u32, uri: &str, should_ignore: bool) {
        self.links.lock().push((uri.to_string(), depth, should_ignore));
    }

    fn form_action_found(&self, _response: &Response, depth: u32, uri: &str, request_body: &str) {
        self.forms
            .lock()
            .push((uri.to_string(), depth, request_body.to_string()));
    }
}

#[derive(Default)]
pub(crate) struct RecordingFoundListener {
    events: Mutex<Vec<(String, FetchStatus)>>,
}

impl RecordingFoundListener {
    pub(crate) fn events(&self) -> Vec<(String, FetchStatus)> {
        self.events.lock().clone()
    }
}

impl FoundListener for RecordingFoundListener {
    fn found_uri(&self, uri: &str, status: &FetchStatus) {
        self.events.lock().push((uri.to_string(), status.clone()));
    }
}

/// An engine that accepts every task and keeps it.
#[derive(Default)]
pub(crate) struct RecordingEngine {
    config: FrontierConfig,
    tasks: Mutex<Vec<Task>>,
    found: Mutex<Vec<(String, FetchStatus)>>,
}

impl RecordingEngine {
    pub(crate) fn tasks(&self) -> Vec<Task> {
        self.tasks.lock().clone()
    }

    pub(crate) fn found(&self) -> Vec<(String, FetchStatus)> {
        self.found.lock().clone()
    }
}

impl CrawlEngine for RecordingEngine {
    fn submit_task(&self, task: Task) -> Result<(), SubmitError> {
        self.tasks.lock().push(task);
        Ok(())
    }

    fn notify_found(&self, uri: &str, status: &FetchStatus) {
        self.found.lock().push((uri.to_string(), status.clone()));
    }

    fn config(&self) -> &FrontierConfig {
        &self.config
    }
}

pub(crate) struct RejectAll;

impl FetchFilter for RejectAll {
    fn name(&self) -> &str {
        "reject-all"
    }

    fn evaluate(&self, _url: &Url) -> FetchStatus {
        FetchStatus::rejected(self.name(), RejectReason::UserRules)
    }
}
