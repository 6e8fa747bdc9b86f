// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync controller owning one store's lifecycle.
//!
//! Local mutations are applied optimistically and persisted, then pushed to
//! the remote endpoint after a debounce window. The payload is read when
//! the timer fires, so rapid mutations collapse into a single push of the
//! latest state.
//!
//! Status transitions:
//!
//! ```text
//! idle ──► syncing ──► synced
//!             │   ───► offline   (401, not retried)
//!             ▼
//!           error ──► retry queue ──► syncing ──► synced
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use ss_core::persist::{load_payload, save_payload};
use ss_core::{
    resolve, ActionId, ActionIdGen, DeviceIdentityProvider, Payload, Persistence, SyncAction, SyncConfig,
    SyncStatus, SyncableState,
};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::error::{SyncError, SyncResult};
use super::queue::{Executor, FailureHook, RetryQueue, RetrySettings};
use super::transport::{HttpTransport, PushRequest, PushResponse, Transport};

/// Poll interval of [`SyncStore::wait_settled`].
const SETTLE_POLL: Duration = Duration::from_millis(10);

/// Emits a debug event tagged with the store name when the store's debug
/// flag is set.
macro_rules! store_debug {
    ($inner:expr, $($arg:tt)+) => {
        if $inner.config.debug {
            tracing::debug!(store = %$inner.config.name, $($arg)+);
        }
    };
}

/// One synchronized store.
///
/// Cheap to clone; clones share the same state, timer and retry queue.
/// Must be created inside a Tokio runtime.
pub struct SyncStore<T: Payload, X: Transport = HttpTransport> {
    inner: Arc<StoreInner<T, X>>,
}

impl<T: Payload, X: Transport> Clone for SyncStore<T, X> {
    fn clone(&self) -> Self {
        SyncStore { inner: Arc::clone(&self.inner) }
    }
}

struct StoreInner<T: Payload, X: Transport> {
    config: SyncConfig<T>,
    transport: X,
    persistence: Arc<dyn Persistence>,
    device_id: String,
    state: Mutex<SyncableState<T>>,
    status_tx: watch::Sender<SyncStatus>,
    /// Pending debounce timer, if any.
    debounce: Mutex<Option<PendingSync>>,
    debounce_seq: AtomicU64,
    /// Set when a push was skipped because another write was in flight.
    skipped_sync: AtomicBool,
    /// Held for the duration of every remote write.
    write_gate: tokio::sync::Mutex<()>,
    queue: RetryQueue<T>,
    ids: ActionIdGen,
    runtime: Handle,
}

struct PendingSync {
    seq: u64,
    token: CancellationToken,
}

/// Queue executor that retries a failed push through its store.
struct StoreExecutor<T: Payload, X: Transport> {
    store: Weak<StoreInner<T, X>>,
}

impl<T: Payload, X: Transport> Executor<T> for StoreExecutor<T, X> {
    fn execute(
        &self,
        action: SyncAction<T>,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), SyncError>> + Send + '_>>
    {
        Box::pin(async move {
            let inner = self.store.upgrade().ok_or(SyncError::StoreClosed)?;
            SyncStore { inner }.retry(action).await
        })
    }
}

impl<T: Payload> SyncStore<T, HttpTransport> {
    /// Creates a store pushing over HTTP.
    pub fn new(
        config: SyncConfig<T>,
        auth_token: Option<String>,
        persistence: Arc<dyn Persistence>,
        identity: &dyn DeviceIdentityProvider,
    ) -> SyncResult<Self> {
        let transport = HttpTransport::new(config.request_timeout, auth_token)?;
        Self::with_transport(config, transport, persistence, identity)
    }
}

impl<T: Payload, X: Transport> SyncStore<T, X> {
    /// Creates a store with a custom transport (for testing).
    ///
    /// The payload is restored from `persistence`; sync metadata always
    /// starts over.
    pub fn with_transport(
        config: SyncConfig<T>,
        transport: X,
        persistence: Arc<dyn Persistence>,
        identity: &dyn DeviceIdentityProvider,
    ) -> SyncResult<Self> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| SyncError::NoRuntime)?;
        let device_id = identity.device_id()?;

        let data = match load_payload::<T>(persistence.as_ref(), &config.name) {
            Ok(Some(data)) => data,
            Ok(None) => config.initial.clone(),
            Err(e) => {
                tracing::warn!(
                    store = %config.name,
                    error = %e,
                    "failed to restore store payload, using initial state"
                );
                config.initial.clone()
            }
        };
        let state = SyncableState::restore(data);
        let (status_tx, _) = watch::channel(state.status);

        let inner = Arc::new_cyclic(|weak: &Weak<StoreInner<T, X>>| {
            let executor = Arc::new(StoreExecutor { store: weak.clone() });
            let queue = RetryQueue::new(
                runtime.clone(),
                config.name.clone(),
                RetrySettings::from(&config),
                executor,
            );
            StoreInner {
                config,
                transport,
                persistence,
                device_id,
                state: Mutex::new(state),
                status_tx,
                debounce: Mutex::new(None),
                debounce_seq: AtomicU64::new(0),
                skipped_sync: AtomicBool::new(false),
                write_gate: tokio::sync::Mutex::new(()),
                queue,
                ids: ActionIdGen::new(),
                runtime,
            }
        });

        store_debug!(inner, device = %inner.device_id, "store opened");
        Ok(SyncStore { inner })
    }

    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    pub fn device_id(&self) -> &str {
        &self.inner.device_id
    }

    pub fn config(&self) -> &SyncConfig<T> {
        &self.inner.config
    }

    /// Returns a copy of the payload and its sync metadata.
    pub fn snapshot(&self) -> SyncableState<T> {
        self.lock_state().clone()
    }

    pub fn data(&self) -> T {
        self.lock_state().data.clone()
    }

    pub fn status(&self) -> SyncStatus {
        self.lock_state().status
    }

    pub fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        self.lock_state().last_synced_at
    }

    pub fn pending_action_count(&self) -> u32 {
        self.lock_state().pending_action_count
    }

    /// Subscribes to status changes.
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.inner.status_tx.subscribe()
    }

    pub fn is_syncing(&self) -> bool {
        self.status() == SyncStatus::Syncing
    }

    /// Returns true if a failed push has not been resolved yet.
    pub fn has_pending_changes(&self) -> bool {
        self.pending_action_count() > 0 || !self.inner.queue.is_empty()
    }

    /// Number of actions waiting in the retry queue.
    pub fn queue_size(&self) -> usize {
        self.inner.queue.size()
    }

    /// Installs a hook run when a queued push is discarded.
    pub fn on_exhausted(&self, hook: FailureHook<T>) {
        self.inner.queue.set_on_exhausted(hook);
    }

    /// Applies a local mutation, persists it and schedules a sync.
    pub fn mutate(&self, f: impl FnOnce(&mut T)) {
        {
            let mut state = self.lock_state();
            f(&mut state.data);
            self.persist(&state);
        }
        store_debug!(self.inner, "local mutation applied");
        self.sync_to_backend();
    }

    /// Replaces the whole payload locally and schedules a sync.
    pub fn replace(&self, data: T) {
        self.mutate(|current| *current = data);
    }

    /// Hydrates the store with data fetched from the backend.
    ///
    /// Overwrites local state unconditionally.
    pub fn load_from_backend(&self, data: T) {
        let mut state = self.lock_state();
        state.data = data;
        state.last_synced_at = Some(Utc::now());
        self.persist(&state);
        self.transition(&mut state, SyncStatus::Synced);
        store_debug!(self.inner, "loaded from backend");
    }

    /// Schedules a push after the debounce window.
    ///
    /// Each call restarts the window; only the last one fires.
    pub fn sync_to_backend(&self) {
        let token = CancellationToken::new();
        let seq = self.inner.debounce_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let previous =
            self.lock_debounce().replace(PendingSync { seq, token: token.clone() });
        if let Some(previous) = previous {
            previous.token.cancel();
        }

        let store = self.clone();
        let delay = self.inner.config.debounce;
        self.inner.runtime.spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => store.fire_debounced(seq).await,
            }
        });
        store_debug!(self.inner, debounce_ms = delay.as_millis() as u64, "sync scheduled");
    }

    /// Cancels any pending debounce and pushes now.
    pub async fn force_sync(&self) {
        if let Some(pending) = self.lock_debounce().take() {
            pending.token.cancel();
        }
        store_debug!(self.inner, "forced sync");
        if let Some((id, payload)) = self.begin_sync() {
            self.finish_sync(id, payload).await;
        }
    }

    /// Discards queued retries and forgets pending failures.
    pub fn clear_sync_queue(&self) {
        self.inner.queue.clear();
        self.lock_state().pending_action_count = 0;
        store_debug!(self.inner, "sync queue cleared");
    }

    /// Waits until no debounce is pending, no write is in flight and the
    /// retry queue is idle.
    ///
    /// Returns false if that did not happen within `timeout`.
    pub async fn wait_settled(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, async {
            while !self.is_settled() {
                tokio::time::sleep(SETTLE_POLL).await;
            }
        })
        .await
        .is_ok()
    }

    fn is_settled(&self) -> bool {
        self.lock_debounce().is_none() && !self.is_syncing() && !self.inner.queue.is_active()
    }

    async fn fire_debounced(&self, seq: u64) {
        // Marked syncing before the pending timer is released so observers
        // never see an idle gap.
        let payload = self.begin_sync();
        {
            let mut pending = self.lock_debounce();
            if pending.as_ref().is_some_and(|p| p.seq == seq) {
                *pending = None;
            }
        }
        if let Some((id, payload)) = payload {
            self.finish_sync(id, payload).await;
        }
    }

    /// Marks the store syncing and returns the payload to push, or `None`
    /// if a write is already running.
    ///
    /// The id is issued under the state lock, so ids order snapshots by age.
    fn begin_sync(&self) -> Option<(ActionId, T)> {
        let mut state = self.lock_state();
        if state.status == SyncStatus::Syncing {
            self.inner.skipped_sync.store(true, Ordering::SeqCst);
            store_debug!(self.inner, "sync already in progress, skipping");
            return None;
        }
        self.transition(&mut state, SyncStatus::Syncing);
        Some((self.inner.ids.next_id(), state.data.clone()))
    }

    async fn finish_sync(&self, id: ActionId, payload: T) {
        match self.write(&payload).await {
            Ok(remote) => {
                // Anything still queued holds an older snapshot.
                let superseded = self.inner.queue.discard_before(id);
                if superseded > 0 {
                    store_debug!(self.inner, superseded, "dropped retries superseded by newer push");
                }
                self.apply_success(&payload, remote);
            }
            Err(SyncError::Unauthorized) => self.mark_offline(),
            Err(e) => {
                let action = SyncAction::sync(id, payload);
                store_debug!(self.inner, action = %action.id, error = %e, "sync failed, queueing retry");
                {
                    let mut state = self.lock_state();
                    state.pending_action_count += 1;
                    self.transition(&mut state, SyncStatus::Error);
                    // Queued under the state lock so a retry cannot finish
                    // before the error is recorded.
                    self.inner.queue.add(action);
                }
                self.resync_if_skipped();
            }
        }
    }

    /// Pushes a queued action's payload.
    async fn retry(&self, action: SyncAction<T>) -> Result<(), SyncError> {
        {
            let mut state = self.lock_state();
            self.transition(&mut state, SyncStatus::Syncing);
        }
        store_debug!(self.inner, action = %action.id, retry = action.retry_count, "retrying sync");

        match self.write(&action.payload).await {
            Ok(remote) => {
                self.apply_success(&action.payload, remote);
                Ok(())
            }
            Err(SyncError::Unauthorized) => {
                self.mark_offline();
                Err(SyncError::Unauthorized)
            }
            Err(e) => {
                {
                    let mut state = self.lock_state();
                    self.transition(&mut state, SyncStatus::Error);
                }
                self.resync_if_skipped();
                Err(e)
            }
        }
    }

    /// Performs one remote write and returns the server's payload when it
    /// reports a conflict.
    async fn write(&self, payload: &T) -> SyncResult<Option<T>> {
        let _gate = self.inner.write_gate.lock().await;
        let request = PushRequest {
            endpoint: self.inner.config.endpoint.clone(),
            device_id: self.inner.device_id.clone(),
            body: serde_json::to_value(payload)?,
        };

        let timeout = self.inner.config.request_timeout;
        let response = tokio::time::timeout(timeout, self.inner.transport.put(request))
            .await
            .map_err(|_| SyncError::Timeout(timeout))??;
        interpret(response)
    }

    /// Records a successful write of `sent`.
    ///
    /// If local state moved on while the write was in flight, the newer
    /// state is pushed again.
    fn apply_success(&self, sent: &T, remote: Option<T>) {
        let changed = {
            let mut state = self.lock_state();
            let changed = !same_payload(sent, &state.data);
            state.mark_synced(Utc::now());
            if let Some(remote) = remote {
                let config = &self.inner.config;
                let resolved =
                    resolve(&state.data, &remote, config.strategy, config.resolver.as_ref());
                state.data = resolved;
                self.persist(&state);
                store_debug!(self.inner, strategy = %config.strategy, "conflict resolved");
            }
            self.transition(&mut state, SyncStatus::Synced);
            changed
        };
        store_debug!(self.inner, "sync succeeded");

        self.inner.skipped_sync.store(false, Ordering::SeqCst);
        if changed {
            store_debug!(self.inner, "local state changed during push, resyncing");
            self.sync_to_backend();
        }
    }

    /// Reschedules a push that was skipped while a write was in flight.
    fn resync_if_skipped(&self) {
        if self.inner.skipped_sync.swap(false, Ordering::SeqCst) {
            store_debug!(self.inner, "rescheduling skipped sync");
            self.sync_to_backend();
        }
    }

    fn mark_offline(&self) {
        self.inner.skipped_sync.store(false, Ordering::SeqCst);
        let mut state = self.lock_state();
        self.transition(&mut state, SyncStatus::Offline);
        store_debug!(self.inner, "endpoint rejected credentials, store offline");
    }

    fn transition(&self, state: &mut SyncableState<T>, status: SyncStatus) {
        state.status = status;
        self.inner.status_tx.send_replace(status);
    }

    /// Writes the persisted part of `state`; sync metadata is never stored.
    fn persist(&self, state: &SyncableState<T>) {
        let name = &self.inner.config.name;
        if let Err(e) = save_payload(self.inner.persistence.as_ref(), name, state.partialize()) {
            tracing::warn!(store = %name, error = %e, "failed to persist store payload");
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, SyncableState<T>> {
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_debounce(&self) -> MutexGuard<'_, Option<PendingSync>> {
        self.inner.debounce.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Compares payloads by their JSON form.
fn same_payload<T: Payload>(a: &T, b: &T) -> bool {
    match (serde_json::to_value(a), serde_json::to_value(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Maps an endpoint response onto the sync outcome.
fn interpret<T: Payload>(response: PushResponse) -> SyncResult<Option<T>> {
    if response.status == 401 {
        return Err(SyncError::Unauthorized);
    }
    if !response.is_success() {
        let message = response
            .body
            .and_then(|body| body.error)
            .unwrap_or_else(|| "no details".to_string());
        return Err(SyncError::Http { status: response.status, message });
    }

    let body = response
        .body
        .ok_or_else(|| SyncError::InvalidResponse("missing or malformed response body".into()))?;
    if !body.success {
        return Err(SyncError::Rejected(body.error.unwrap_or_else(|| "unknown error".into())));
    }
    match body.conflict_data() {
        Some(data) => serde_json::from_value(data.clone())
            .map(Some)
            .map_err(|e| SyncError::InvalidResponse(format!("conflict payload: {e}"))),
        None => Ok(None),
    }
}
