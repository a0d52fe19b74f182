//! The discovery callbacks through which parsers report what they find.
//!
//! Parsers run inside the engine's worker threads and never talk to the task
//! queue. They report hyperlinks and form submissions to whoever subscribed
//! to them, normally the session's [`Frontier`](crate::Frontier).

use crate::response::Response;
use std::sync::Weak;

/// Receiver of parser discoveries.
///
/// Implementations are invoked concurrently from many worker threads, any
/// number of times per page, with no ordering between pages.
pub trait DiscoveryListener: Send + Sync {
    /// A hyperlink-style discovery, fetched with `GET`.
    ///
    /// `should_ignore` means the URI is legitimate and should be recorded as
    /// found, but not fetched.
    fn link_found(&self, response: &Response, depth: u32, uri: &str, should_ignore: bool);

    /// A form submission, fetched with `POST` and the given body.
    fn form_action_found(&self, response: &Response, depth: u32, uri: &str, request_body: &str);
}

/// The listeners subscribed to one parser.
///
/// Listeners are held weakly: the frontier owns its parsers, and a strong
/// back-reference would keep the session alive forever.
#[derive(Default, Clone)]
pub struct ListenerSet {
    listeners: Vec<Weak<dyn DiscoveryListener>>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Weak<dyn DiscoveryListener>) {
        self.listeners.push(listener);
    }

    /// Number of listeners still alive.
    pub fn len(&self) -> usize {
        self.listeners.iter().filter(|l| l.strong_count() > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn notify_link(&self, response: &Response, depth: u32, uri: &str, should_ignore: bool) {
        for listener in self.listeners.iter().filter_map(Weak::upgrade) {
            listener.link_found(response, depth, uri, should_ignore);
        }
    }

    pub fn notify_form(&self, response: &Response, depth: u32, uri: &str, request_body: &str) {
        for listener in self.listeners.iter().filter_map(Weak::upgrade) {
            listener.form_action_found(response, depth, uri, request_body);
        }
    }
}

impl std::fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSet")
            .field("listeners", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{page, RecordingListener};
    use std::sync::Arc;

    #[test]
    fn dropped_listeners_are_skipped() {
        let kept = Arc::new(RecordingListener::default());
        let dropped = Arc::new(RecordingListener::default());

        let mut set = ListenerSet::new();
        let kept_weak = Arc::downgrade(&kept) as Weak<dyn DiscoveryListener>;
        let dropped_weak = Arc::downgrade(&dropped) as Weak<dyn DiscoveryListener>;
        set.subscribe(kept_weak);
        set.subscribe(dropped_weak);
        drop(dropped);

        assert_eq!(set.len(), 1);
        let response = page("http://x/", "");
        set.notify_link(&response, 1, "http://x/a", false);
        set.notify_form(&response, 1, "http://x/f", "a=1");

        assert_eq!(kept.links(), vec![("http://x/a".to_string(), 1, false)]);
        assert_eq!(kept.forms(), vec![("http://x/f".to_string(), 1, "a=1".to_string())]);
    }
}
