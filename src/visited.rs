//! # Visited Module
//!
//! Tracks which resources have already been scheduled, per HTTP method.
//!
//! ## Overview
//!
//! Discovery callbacks arrive concurrently from every parser worker, so the
//! "have we seen this?" question and the "remember it" step must be one
//! atomic operation. [`VisitedStore::try_mark`] inserts into a sharded
//! concurrent set and reports whether the insert was new; only the caller that
//! wins the insert may go on to submit a task.
//!
//! Entries are never removed and never evicted. A bounded cache would let a
//! URI be scheduled twice once its entry aged out.
//!
//! ## Example
//!
//! ```rust
//! use spider_frontier::{Method, VisitedStore};
//!
//! let visited = VisitedStore::new();
//! assert!(visited.try_mark("http://example.com/", Method::Get));
//! assert!(!visited.try_mark("http://example.com/", Method::Get));
//! assert!(visited.try_mark("http://example.com/", Method::Post));
//! ```

use crate::request::Method;
use dashmap::DashSet;
use tracing::trace;

/// One seen-set per HTTP method.
#[derive(Debug, Default)]
pub struct VisitedStore {
    get: DashSet<String>,
    post: DashSet<String>,
}

impl VisitedStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&self, method: Method) -> &DashSet<String> {
        match method {
            Method::Get => &self.get,
            Method::Post => &self.post,
        }
    }

    /// Marks `uri` as seen for `method`.
    ///
    /// Returns `true` iff this call performed the first insertion of the pair
    /// in this session.
    pub fn try_mark(&self, uri: &str, method: Method) -> bool {
        let inserted = self.set(method).insert(uri.to_owned());
        if inserted {
            trace!("Marked {} {} as seen", method, uri);
        }
        inserted
    }

    /// Checks whether `uri` has been marked for `method`.
    pub fn contains(&self, uri: &str, method: Method) -> bool {
        self.set(method).contains(uri)
    }

    /// Number of distinct URIs marked for `method`.
    #[inline]
    pub fn len(&self, method: Method) -> usize {
        self.set(method).len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.get.is_empty() && self.post.is_empty()
    }
}
