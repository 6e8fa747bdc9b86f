// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Retry queue for sync actions whose push failed.
//!
//! Items are processed one at a time in FIFO order by a single background
//! task. A failing head item is retried with exponential backoff until it
//! succeeds, fails with a non-retryable error, or exhausts its retries, in
//! which case it is discarded and the exhaustion hook runs.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use ss_core::{ActionId, Backoff, QueueItem, SyncAction, SyncConfig};
use tokio::runtime::Handle;
use tokio::sync::Notify;

use super::error::SyncError;

/// Performs one queued action.
pub trait Executor<T>: Send + Sync {
    /// Executes the action; an error counts as a failed attempt.
    fn execute(
        &self,
        action: SyncAction<T>,
    ) -> Pin<Box<dyn Future<Output = Result<(), SyncError>> + Send + '_>>;
}

impl<T, F, Fut> Executor<T> for F
where
    F: Fn(SyncAction<T>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), SyncError>> + Send + 'static,
{
    fn execute(
        &self,
        action: SyncAction<T>,
    ) -> Pin<Box<dyn Future<Output = Result<(), SyncError>> + Send + '_>> {
        Box::pin(self(action))
    }
}

/// Called with the discarded action and its last error.
pub type FailureHook<T> = Arc<dyn Fn(&SyncAction<T>, &SyncError) + Send + Sync>;

/// Retry limits of a queue.
#[derive(Debug, Clone)]
pub struct RetrySettings {
    /// Retries allowed after the first failed attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
    /// Emit debug events for queue activity.
    pub debug: bool,
}

impl<T> From<&SyncConfig<T>> for RetrySettings {
    fn from(config: &SyncConfig<T>) -> Self {
        RetrySettings {
            max_retries: config.max_retries,
            base_delay: config.base_delay,
            debug: config.debug,
        }
    }
}

/// FIFO retry queue.
///
/// Cheap to clone; clones share the same queue.
pub struct RetryQueue<T> {
    inner: Arc<QueueInner<T>>,
}

impl<T> Clone for RetryQueue<T> {
    fn clone(&self) -> Self {
        RetryQueue { inner: Arc::clone(&self.inner) }
    }
}

struct QueueInner<T> {
    label: String,
    items: Mutex<VecDeque<QueueItem<T>>>,
    /// Set while a processing task owns the queue.
    processing: AtomicBool,
    executor: Arc<dyn Executor<T>>,
    backoff: Backoff,
    max_retries: u32,
    debug: bool,
    on_exhausted: Mutex<Option<FailureHook<T>>>,
    /// Wakes a backoff sleep when the queue is cleared.
    cleared: Notify,
    runtime: Handle,
}

enum Outcome<T> {
    Next,
    Retry { attempts: u32 },
    Dropped { item: QueueItem<T>, error: SyncError },
}

impl<T> QueueInner<T> {
    fn lock_items(&self) -> MutexGuard<'_, VecDeque<QueueItem<T>>> {
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<T: Clone + Send + Sync + 'static> RetryQueue<T> {
    /// Creates an empty queue whose processing task runs on `runtime`.
    ///
    /// `label` names the owning store in log events.
    pub fn new(
        runtime: Handle,
        label: impl Into<String>,
        settings: RetrySettings,
        executor: Arc<dyn Executor<T>>,
    ) -> Self {
        RetryQueue {
            inner: Arc::new(QueueInner {
                label: label.into(),
                items: Mutex::new(VecDeque::new()),
                processing: AtomicBool::new(false),
                executor,
                backoff: Backoff::new(settings.base_delay),
                max_retries: settings.max_retries,
                debug: settings.debug,
                on_exhausted: Mutex::new(None),
                cleared: Notify::new(),
                runtime,
            }),
        }
    }

    /// Installs the hook run when an action is discarded.
    pub fn set_on_exhausted(&self, hook: FailureHook<T>) {
        *self.inner.on_exhausted.lock().unwrap_or_else(|e| e.into_inner()) = Some(hook);
    }

    /// Appends an action and starts processing if idle.
    pub fn add(&self, action: SyncAction<T>) {
        let id = action.id;
        let start = {
            let mut items = self.inner.lock_items();
            items.push_back(QueueItem::new(action));
            !self.inner.processing.swap(true, Ordering::SeqCst)
        };
        if self.inner.debug {
            tracing::debug!(store = %self.inner.label, action = %id, "sync action queued");
        }
        if start {
            self.inner.runtime.spawn(process(Arc::clone(&self.inner)));
        }
    }

    /// Discards every queued action.
    ///
    /// An execution already in flight completes but its outcome is ignored.
    pub fn clear(&self) {
        let discarded = {
            let mut items = self.inner.lock_items();
            let n = items.len();
            items.clear();
            n
        };
        self.inner.cleared.notify_waiters();
        if self.inner.debug {
            tracing::debug!(store = %self.inner.label, discarded, "retry queue cleared");
        }
    }

    /// Discards queued actions created before `id` and returns how many
    /// were dropped.
    ///
    /// Like [`clear`](Self::clear), an execution already in flight completes
    /// but its outcome is ignored.
    pub fn discard_before(&self, id: ActionId) -> usize {
        let (discarded, head_dropped) = {
            let mut items = self.inner.lock_items();
            let head = items.front().map(|item| item.action.id);
            let before = items.len();
            items.retain(|item| item.action.id >= id);
            (before - items.len(), head.is_some_and(|head| head < id))
        };
        if head_dropped {
            self.inner.cleared.notify_waiters();
        }
        if discarded > 0 && self.inner.debug {
            tracing::debug!(store = %self.inner.label, discarded, before = %id, "stale sync actions discarded");
        }
        discarded
    }

    pub fn size(&self) -> usize {
        self.inner.lock_items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock_items().is_empty()
    }

    /// Returns true while items are queued or being processed.
    pub fn is_active(&self) -> bool {
        let items = self.inner.lock_items();
        !items.is_empty() || self.inner.processing.load(Ordering::SeqCst)
    }
}

async fn process<T: Clone + Send + Sync + 'static>(inner: Arc<QueueInner<T>>) {
    loop {
        let action = {
            let mut items = inner.lock_items();
            match items.front() {
                Some(item) => item.action.with_retry_count(item.attempts),
                None => {
                    // Cleared under the lock so a concurrent add either sees
                    // the flag still set or starts a new task.
                    inner.processing.store(false, Ordering::SeqCst);
                    return;
                }
            }
        };
        let id = action.id;

        let result = inner.executor.execute(action).await;

        let outcome = {
            let mut items = inner.lock_items();
            match items.front_mut() {
                Some(head) if head.action.id == id => match result {
                    Ok(()) => {
                        items.pop_front();
                        Outcome::Next
                    }
                    Err(error) => {
                        head.attempts += 1;
                        let attempts = head.attempts;
                        if !error.is_retryable() || attempts > inner.max_retries {
                            match items.pop_front() {
                                Some(item) => Outcome::Dropped { item, error },
                                None => Outcome::Next,
                            }
                        } else {
                            Outcome::Retry { attempts }
                        }
                    }
                },
                // Head changed underneath us: the queue was cleared.
                _ => Outcome::Next,
            }
        };

        match outcome {
            Outcome::Next => {}
            Outcome::Retry { attempts } => {
                let delay = inner.backoff.delay(attempts - 1);
                if inner.debug {
                    tracing::debug!(
                        store = %inner.label,
                        action = %id,
                        attempts,
                        delay_ms = delay.as_millis() as u64,
                        "sync action failed, retrying"
                    );
                }
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = inner.cleared.notified() => {}
                }
            }
            Outcome::Dropped { item, error } => {
                tracing::warn!(
                    store = %inner.label,
                    action = %id,
                    attempts = item.attempts,
                    error = %error,
                    "discarding sync action"
                );
                let hook = inner.on_exhausted.lock().unwrap_or_else(|e| e.into_inner()).clone();
                if let Some(hook) = hook {
                    hook(&item.action, &error);
                }
            }
        }
    }
}
