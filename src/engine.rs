//! # Engine Module
//!
//! The boundary between the frontier and the crawl engine that executes
//! fetch tasks.
//!
//! ## Overview
//!
//! The frontier needs three things from the engine, captured by
//! [`CrawlEngine`]: a place to enqueue tasks, a way to report discovery
//! outcomes to session listeners, and read access to the session config.
//!
//! [`TaskQueue`] is a ready-made engine front: a bounded channel whose
//! receiving half is handed to the engine's async fetch workers, plus a list
//! of [`FoundListener`]s for reporting.
//!
//! ## Example
//!
//! ```rust
//! use spider_frontier::{FrontierBuilder, FrontierConfig, TaskQueue};
//!
//! let (queue, tasks) = TaskQueue::new(FrontierConfig::default());
//! let frontier = FrontierBuilder::new(queue.clone()).build().unwrap();
//! frontier.add_seed("https://example.com/");
//!
//! let task = tasks.try_recv().unwrap().expect("seed task queued");
//! assert_eq!(task.url.as_str(), "https://example.com/");
//! ```

use crate::builder::FrontierConfig;
use crate::error::FrontierError;
use crate::filter::FetchStatus;
use crate::request::Task;
use kanal::{bounded_async, AsyncReceiver, AsyncSender};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, trace};

/// A refused submission. The task is handed back to the caller.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("task queue is full, rejected {0}")]
    QueueFull(Task),
    #[error("engine is shutting down, rejected {0}")]
    ShuttingDown(Task),
}

impl SubmitError {
    /// Splits into the returned task and the matching frontier error.
    pub fn into_parts(self) -> (Task, FrontierError) {
        match self {
            SubmitError::QueueFull(task) => {
                let uri = task.url.to_string();
                (task, FrontierError::QueueFull { uri })
            }
            SubmitError::ShuttingDown(task) => {
                let uri = task.url.to_string();
                (task, FrontierError::EngineShutdown { uri })
            }
        }
    }
}

/// What the frontier consumes from the crawl engine.
pub trait CrawlEngine: Send + Sync {
    /// Enqueues a fetch task. Must not block beyond a bounded enqueue.
    fn submit_task(&self, task: Task) -> Result<(), SubmitError>;

    /// Forwards a discovery outcome to session-level listeners.
    fn notify_found(&self, uri: &str, status: &FetchStatus);

    /// Crawl-wide settings.
    fn config(&self) -> &FrontierConfig;
}

/// Session-level observer of discovery outcomes (reporting, UI).
pub trait FoundListener: Send + Sync {
    fn found_uri(&self, uri: &str, status: &FetchStatus);
}

/// A [`CrawlEngine`] backed by a bounded channel.
pub struct TaskQueue {
    config: FrontierConfig,
    tx: AsyncSender<Task>,
    listeners: RwLock<Vec<Arc<dyn FoundListener>>>,
    is_shutting_down: AtomicBool,
}

impl TaskQueue {
    /// Creates the queue and the receiver the fetch workers pull tasks from.
    pub fn new(config: FrontierConfig) -> (Arc<Self>, AsyncReceiver<Task>) {
        let (tx, rx) = bounded_async(config.task_queue_capacity);
        info!(
            "Task queue created with capacity {}",
            config.task_queue_capacity
        );
        let queue = Arc::new(Self {
            config,
            tx,
            listeners: RwLock::new(Vec::new()),
            is_shutting_down: AtomicBool::new(false),
        });
        (queue, rx)
    }

    /// Registers a listener for every `notify_found`.
    pub fn add_found_listener(&self, listener: Arc<dyn FoundListener>) {
        self.listeners.write().push(listener);
    }

    /// Number of tasks waiting to be picked up.
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_shutting_down(&self) -> bool {
        self.is_shutting_down.load(Ordering::SeqCst)
    }

    /// Refuses further tasks and closes the channel so workers drain and stop.
    pub fn shutdown(&self) {
        if self.is_shutting_down.swap(true, Ordering::SeqCst) {
            debug!("Task queue already shutting down");
            return;
        }
        info!("Task queue shutting down with {} tasks pending", self.tx.len());
        let _ = self.tx.close();
    }
}

impl CrawlEngine for TaskQueue {
    fn submit_task(&self, task: Task) -> Result<(), SubmitError> {
        if self.is_shutting_down() || self.tx.is_closed() {
            return Err(SubmitError::ShuttingDown(task));
        }
        trace!("Queueing task {}", task);
        let mut slot = Some(task);
        let sent = self.tx.try_send_option(&mut slot);
        match (sent, slot) {
            (Ok(_), Some(task)) => Err(SubmitError::QueueFull(task)),
            (Err(_), Some(task)) => Err(SubmitError::ShuttingDown(task)),
            (_, None) => Ok(()),
        }
    }

    fn notify_found(&self, uri: &str, status: &FetchStatus) {
        for listener in self.listeners.read().iter() {
            listener.found_uri(uri, status);
        }
    }

    fn config(&self) -> &FrontierConfig {
        &self.config
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("pending", &self.tx.len())
            .field("listeners", &self.listeners.read().len())
            .field("is_shutting_down", &self.is_shutting_down())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingFoundListener;
    use url::Url;

    fn small_queue(capacity: usize) -> (Arc<TaskQueue>, AsyncReceiver<Task>) {
        TaskQueue::new(FrontierConfig {
            task_queue_capacity: capacity,
            ..FrontierConfig::default()
        })
    }

    fn task(path: &str) -> Task {
        Task::get(Url::parse(&format!("http://x/{}", path)).unwrap(), 1)
    }

    #[tokio::test]
    async fn tasks_reach_the_async_receiver() {
        let (queue, rx) = small_queue(4);
        queue.submit_task(task("a")).expect("queued");
        assert_eq!(queue.len(), 1);

        let received = rx.recv().await.expect("task received");
        assert_eq!(received, task("a"));
        assert!(queue.is_empty());
    }

    #[test]
    fn full_queue_hands_the_task_back() {
        let (queue, rx) = small_queue(1);
        queue.submit_task(task("a")).expect("first fits");

        let form = Task::post(Url::parse("http://x/submit").unwrap(), 2, "a=1&b=2");
        match queue.submit_task(form.clone()) {
            Err(SubmitError::QueueFull(returned)) => assert_eq!(returned, form),
            other => panic!("expected QueueFull, got {other:?}"),
        }
        assert_eq!(queue.len(), 1);
        assert_eq!(rx.try_recv().unwrap(), Some(task("a")));
    }

    #[test]
    fn dropped_receiver_hands_the_task_back() {
        let (queue, rx) = small_queue(4);
        drop(rx);
        match queue.submit_task(task("orphan")) {
            Err(SubmitError::ShuttingDown(returned)) => assert_eq!(returned, task("orphan")),
            other => panic!("expected ShuttingDown, got {other:?}"),
        }
    }

    #[test]
    fn shutdown_refuses_new_tasks() {
        let (queue, rx) = small_queue(4);
        queue.shutdown();
        queue.shutdown();
        assert!(queue.is_shutting_down());

        let err = queue.submit_task(task("late")).expect_err("refused");
        let (returned, error) = err.into_parts();
        assert_eq!(returned, task("late"));
        assert!(matches!(error, FrontierError::EngineShutdown { .. }));
        assert!(rx.is_closed());
    }

    #[test]
    fn found_listeners_receive_notifications() {
        let (queue, _rx) = small_queue(4);
        let listener = Arc::new(RecordingFoundListener::default());
        queue.add_found_listener(listener.clone());

        queue.notify_found("http://x/a", &FetchStatus::Valid);
        assert_eq!(
            listener.events(),
            vec![("http://x/a".to_string(), FetchStatus::Valid)]
        );
    }
}
