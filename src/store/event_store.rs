//! The event store: canonical table plus live-channel lifecycle.
//!
//! [`EventStore`] is a cheap-clone handle. Every mutation takes the table
//! lock once and runs to completion, so readers never observe a
//! half-applied snapshot or update. No lock is held across an `.await`.
//!
//! Lock order is `live` before `state`.

use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;

use super::live_channel::{ChannelId, ChannelScope, DEFAULT_CHANNEL_PATH, LiveChannel};
use super::reconnect::ReconnectPolicy;
use crate::domain::{
    Clock, Event, EventId, EventTable, OddsUpdate, SystemClock, TableStatus, UpdateOrdering,
    UpdateOutcome, decode_push_message,
};
use crate::error::FetchError;
use crate::transport::{ChannelSignal, ChannelTransport, SnapshotSource};

/// Store behaviour knobs.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// How push updates older than their record are treated.
    pub ordering: UpdateOrdering,
    /// What to do when the channel drops.
    pub reconnect: ReconnectPolicy,
    /// Global channel path; per-event channels append `/{id}`.
    pub channel_path: String,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            ordering: UpdateOrdering::default(),
            reconnect: ReconnectPolicy::default(),
            channel_path: DEFAULT_CHANNEL_PATH.to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct StoreState {
    table: EventTable,
    fetches_in_flight: usize,
}

#[derive(Debug)]
struct PendingReconnect {
    token: uuid::Uuid,
    task: JoinHandle<()>,
}

#[derive(Debug, Default)]
struct LiveState {
    channel: Option<LiveChannel>,
    pending: Option<PendingReconnect>,
    attempts: u32,
}

impl LiveState {
    fn is_current(&self, id: ChannelId) -> bool {
        self.channel.as_ref().is_some_and(|c| c.id == id)
    }

    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.task.abort();
        }
    }
}

#[derive(Debug)]
pub(crate) struct StoreInner {
    state: RwLock<StoreState>,
    live: Mutex<LiveState>,
    snapshots: Arc<dyn SnapshotSource>,
    transport: Arc<dyn ChannelTransport>,
    clock: Arc<dyn Clock>,
    options: StoreOptions,
}

/// Client-side cache of live events fed by snapshots and push updates.
#[derive(Debug, Clone)]
pub struct EventStore {
    inner: Arc<StoreInner>,
}

impl EventStore {
    /// Creates an empty store using the wall clock.
    #[must_use]
    pub fn new(
        snapshots: Arc<dyn SnapshotSource>,
        transport: Arc<dyn ChannelTransport>,
        options: StoreOptions,
    ) -> Self {
        Self::with_clock(snapshots, transport, options, Arc::new(SystemClock))
    }

    /// Creates an empty store with an injected clock.
    #[must_use]
    pub fn with_clock(
        snapshots: Arc<dyn SnapshotSource>,
        transport: Arc<dyn ChannelTransport>,
        options: StoreOptions,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(StoreState::default()),
                live: Mutex::new(LiveState::default()),
                snapshots,
                transport,
                clock,
                options,
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<StoreInner>) -> Self {
        Self { inner }
    }

    fn downgrade(&self) -> Weak<StoreInner> {
        Arc::downgrade(&self.inner)
    }

    // ----------------------------------------------------------------------
    // Snapshot loading
    // ----------------------------------------------------------------------

    /// Fetches a snapshot and merges it into the table.
    ///
    /// Clears `error` and raises `loading` for the duration of the fetch.
    /// On failure the message lands in `error` and the existing events are
    /// kept. `loading` drops on every exit path, including cancellation.
    /// Never retries.
    ///
    /// # Errors
    ///
    /// Returns the transport's [`FetchError`]; it has already been recorded
    /// in the table by the time the caller sees it.
    pub async fn load_snapshot(&self) -> Result<(), FetchError> {
        let _loading = LoadingGuard::acquire(&self.inner);

        match self.inner.snapshots.fetch_events().await {
            Ok(records) => {
                let now = self.inner.clock.now_millis();
                let count = records.len();
                self.inner.state.write().table.merge_snapshot(records, now);
                tracing::info!(count, snapshot_at = now, "snapshot merged");
                Ok(())
            }
            Err(e) => {
                let message = e.user_message();
                tracing::warn!(error = %message, "snapshot fetch failed");
                self.inner.state.write().table.error = Some(message);
                Err(e)
            }
        }
    }

    // ----------------------------------------------------------------------
    // Mutations
    // ----------------------------------------------------------------------

    /// Inserts or shallow-merges events; new ids are appended to the list
    /// order.
    pub fn upsert_many<I>(&self, events: I)
    where
        I: IntoIterator<Item = Event>,
    {
        self.inner.state.write().table.upsert_many(events);
    }

    /// Folds one push update into its record using the configured ordering.
    pub fn apply_update(&self, update: OddsUpdate) -> UpdateOutcome {
        let outcome = self
            .inner
            .state
            .write()
            .table
            .apply_update(update, self.inner.options.ordering);
        match outcome {
            UpdateOutcome::Applied => {
                tracing::trace!(event_id = %update.id, coeff = %update.coeff, "odds updated");
            }
            UpdateOutcome::UnknownEvent => {
                tracing::debug!(event_id = %update.id, "update for unknown event dropped");
            }
            UpdateOutcome::Stale => {
                tracing::debug!(event_id = %update.id, at = update.at, "stale update dropped");
            }
        }
        outcome
    }

    /// Decodes one inbound channel payload and applies it.
    ///
    /// Malformed payloads are logged and dropped; payloads without both
    /// `id` and `coeff` are ignored. Neither touches the table. Returns the
    /// outcome when an update was applied or rejected by the table.
    pub fn handle_channel_message(&self, text: &str) -> Option<UpdateOutcome> {
        let now = self.inner.clock.now_millis();
        match decode_push_message(text, now) {
            Ok(Some(update)) => Some(self.apply_update(update)),
            Ok(None) => {
                tracing::trace!("ignoring non-update payload");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse push payload");
                None
            }
        }
    }

    // ----------------------------------------------------------------------
    // Reads
    // ----------------------------------------------------------------------

    /// Events in list order.
    #[must_use]
    pub fn list(&self) -> Vec<Event> {
        self.inner.state.read().table.list().cloned().collect()
    }

    /// One event by id.
    #[must_use]
    pub fn by_id(&self, id: EventId) -> Option<Event> {
        self.inner.state.read().table.by_id(id).cloned()
    }

    /// Runs `f` against the table under the read lock.
    ///
    /// `f` must not call back into the store.
    pub fn read<R>(&self, f: impl FnOnce(&EventTable) -> R) -> R {
        f(&self.inner.state.read().table)
    }

    /// Status flags.
    #[must_use]
    pub fn status(&self) -> TableStatus {
        self.inner.state.read().table.status()
    }

    /// `true` while a snapshot fetch is in flight.
    #[must_use]
    pub fn loading(&self) -> bool {
        self.inner.state.read().table.loading
    }

    /// Message from the last failed fetch.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.inner.state.read().table.error.clone()
    }

    /// `true` iff the push channel is open.
    #[must_use]
    pub fn live_connected(&self) -> bool {
        self.inner.state.read().table.live_connected
    }

    /// Timestamp of the last successful snapshot merge.
    #[must_use]
    pub fn last_snapshot_at(&self) -> Option<i64> {
        self.inner.state.read().table.last_snapshot_at
    }

    // ----------------------------------------------------------------------
    // Live channel lifecycle
    // ----------------------------------------------------------------------

    /// Opens the push channel, tearing down any channel already open.
    ///
    /// Returns immediately; `live_connected` turns true once the transport
    /// reports the socket open. Cancels any pending reconnect. Must be
    /// called from within a tokio runtime.
    pub fn connect(&self, scope: ChannelScope) {
        let mut live = self.inner.live.lock();
        live.cancel_pending();
        live.attempts = 0;
        self.open_channel(&mut live, scope);
    }

    /// Closes the push channel, if any.
    ///
    /// `live_connected` drops immediately without waiting for the close
    /// acknowledgment. Cancels any pending reconnect.
    pub fn disconnect(&self) {
        let mut live = self.inner.live.lock();
        live.cancel_pending();
        let Some(channel) = live.channel.take() else {
            return;
        };
        tracing::info!(channel_id = %channel.id, "disconnecting push channel");
        channel.teardown();
        self.inner.state.write().table.live_connected = false;
    }

    /// Scope of the current channel, if one is held.
    #[must_use]
    pub fn channel_scope(&self) -> Option<ChannelScope> {
        self.inner.live.lock().channel.as_ref().map(|c| c.scope)
    }

    fn open_channel(&self, live: &mut LiveState, scope: ChannelScope) {
        if let Some(previous) = live.channel.take() {
            tracing::debug!(channel_id = %previous.id, "tearing down previous channel");
            previous.teardown();
        }
        self.inner.state.write().table.live_connected = false;

        let path = scope.path(&self.inner.options.channel_path);
        let connection = self.inner.transport.open(&path);
        let channel = LiveChannel::start(
            self.downgrade(),
            scope,
            connection.signals,
            connection.close,
        );
        tracing::info!(channel_id = %channel.id, %path, "push channel opening");
        live.channel = Some(channel);
    }

    /// Applies one channel signal. Signals from any channel other than the
    /// current one are ignored.
    pub(crate) fn handle_signal(&self, id: ChannelId, signal: ChannelSignal) {
        match signal {
            ChannelSignal::Message(text) => {
                // Held across the apply: nothing lands after disconnect returns.
                let live = self.inner.live.lock();
                if !live.is_current(id) {
                    tracing::debug!(channel_id = %id, "message from superseded channel ignored");
                    return;
                }
                let _ = self.handle_channel_message(&text);
                drop(live);
            }
            ChannelSignal::Opened => {
                let mut live = self.inner.live.lock();
                if !live.is_current(id) {
                    return;
                }
                live.attempts = 0;
                self.inner.state.write().table.live_connected = true;
                tracing::info!(channel_id = %id, "push channel open");
            }
            ChannelSignal::Error(reason) => {
                let live = self.inner.live.lock();
                if !live.is_current(id) {
                    return;
                }
                self.inner.state.write().table.live_connected = false;
                tracing::warn!(channel_id = %id, %reason, "push channel error");
            }
            ChannelSignal::Closed => {
                let mut live = self.inner.live.lock();
                if !live.is_current(id) {
                    tracing::debug!(channel_id = %id, "close from superseded channel ignored");
                    return;
                }
                let scope = live.channel.take().map(|c| c.scope);
                self.inner.state.write().table.live_connected = false;
                tracing::info!(channel_id = %id, "push channel closed");
                if let Some(scope) = scope {
                    self.schedule_reconnect(&mut live, scope);
                }
            }
        }
    }

    fn schedule_reconnect(&self, live: &mut LiveState, scope: ChannelScope) {
        let Some(delay) = self.inner.options.reconnect.delay_for(live.attempts) else {
            if self.inner.options.reconnect.enabled {
                tracing::warn!(attempts = live.attempts, "reconnect attempts exhausted");
            }
            return;
        };
        live.attempts = live.attempts.saturating_add(1);
        live.cancel_pending();

        let token = uuid::Uuid::new_v4();
        let store = self.downgrade();
        tracing::info!(
            attempt = live.attempts,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "scheduling reconnect"
        );
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = store.upgrade() {
                EventStore::from_inner(inner).reconnect(token, scope);
            }
        });
        live.pending = Some(PendingReconnect { token, task });
    }

    fn reconnect(&self, token: uuid::Uuid, scope: ChannelScope) {
        let mut live = self.inner.live.lock();
        if live.pending.as_ref().map(|p| p.token) != Some(token) {
            return;
        }
        live.pending = None;
        self.open_channel(&mut live, scope);
    }
}

/// Holds `loading` up for the lifetime of one fetch.
struct LoadingGuard<'a> {
    inner: &'a StoreInner,
}

impl<'a> LoadingGuard<'a> {
    fn acquire(inner: &'a StoreInner) -> Self {
        let mut state = inner.state.write();
        state.fetches_in_flight = state.fetches_in_flight.saturating_add(1);
        state.table.loading = true;
        state.table.error = None;
        Self { inner }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.inner.state.write();
        state.fetches_in_flight = state.fetches_in_flight.saturating_sub(1);
        state.table.loading = state.fetches_in_flight > 0;
    }
}
