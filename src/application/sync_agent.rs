//! Remote synchronization of the quote store.
//!
//! A tick fetches the remote collection, merges it into the store with the
//! remote side authoritative, re-renders the selected view and posts a
//! notification. Ticks are serialized: a tick requested while another is
//! still pending is skipped.

use std::future::Future;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;

use crate::domain::{Quote, Result, SyncReport, SyncState};
use crate::infrastructure::RemoteSource;

use super::presenter::Presenter;
use super::quote_store::QuoteStore;

/// Result of a single tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick ran to completion. `error` is set when the fetch failed and
    /// an empty remote list was merged instead.
    Completed {
        report: SyncReport,
        error: Option<String>,
    },
    /// Another tick was already in flight.
    Skipped,
}

/// Resets the in-flight flag when dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Periodic sync between the quote store and a remote source.
pub struct SyncAgent<R: RemoteSource> {
    remote: R,
    store: Arc<Mutex<QuoteStore>>,
    in_flight: AtomicBool,
}

impl<R: RemoteSource> SyncAgent<R> {
    /// Create an agent syncing `store` with `remote`.
    pub const fn new(remote: R, store: Arc<Mutex<QuoteStore>>) -> Self {
        Self {
            remote,
            store,
            in_flight: AtomicBool::new(false),
        }
    }

    /// The shared store.
    #[must_use]
    pub const fn store(&self) -> &Arc<Mutex<QuoteStore>> {
        &self.store
    }

    fn try_begin(&self) -> Option<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(&self.in_flight))
    }

    /// Fetch the remote list.
    ///
    /// A failure is logged and yields an empty list along with its message.
    pub async fn fetch_remote(&self) -> (Vec<Quote>, Option<String>) {
        match self.remote.fetch().await {
            Ok(quotes) => {
                tracing::debug!(count = quotes.len(), "Fetched remote quotes");
                (quotes, None)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Remote fetch failed, treating as empty");
                (Vec::new(), Some(e.to_string()))
            }
        }
    }

    /// Send a quote to the remote. Failures are logged only.
    pub async fn push_quote(&self, quote: &Quote) {
        if let Err(e) = self.remote.push(quote).await {
            tracing::warn!(error = %e, "Failed to push quote to remote");
        }
    }

    /// Run one sync tick.
    ///
    /// # Errors
    /// Returns error only if the display surface cannot be written.
    pub async fn tick<W: Write>(&self, presenter: &mut Presenter<W>) -> Result<TickOutcome> {
        // Idle -> Syncing; the guard returns to Idle on every exit path.
        let Some(_guard) = self.try_begin() else {
            tracing::debug!("Sync already in flight, skipping tick");
            return Ok(TickOutcome::Skipped);
        };

        tracing::info!("Starting sync...");
        self.record_state(|state| state.syncing()).await;

        let start = std::time::Instant::now();
        let (remote, error) = self.fetch_remote().await;

        let (report, view) = {
            let mut store = self.store.lock().await;
            let report = store.merge(remote);
            let view = store.filter(store.selected());

            let state = SyncState {
                last_remote_count: report.remote_count,
                quote_count: report.total,
                ..read_state(&store)
            }
            .with_sync_time()
            .completed();
            let state = match &error {
                Some(message) => state.with_error(message.clone()),
                None => state.clear_error(),
            };
            write_state(&store, &state);

            (report, view)
        };

        tracing::info!(
            remote = report.remote_count,
            total = report.total,
            duration_ms = start.elapsed().as_millis(),
            "Sync completed"
        );

        presenter.render_many(&view)?;
        match &error {
            None => presenter.notify(&format!(
                "Quotes synced with server: {} received, {} local replaced, {} total",
                report.remote_count, report.local_dropped, report.total
            ))?,
            Some(message) => {
                presenter.warn(&format!("Sync failed, keeping local quotes: {message}"))?;
            }
        }

        Ok(TickOutcome::Completed { report, error })
    }

    /// Tick every `interval` until `shutdown` resolves.
    ///
    /// The first tick runs immediately.
    ///
    /// # Errors
    /// Returns error if the display surface cannot be written.
    pub async fn run<W, F>(
        &self,
        interval: Duration,
        presenter: &mut Presenter<W>,
        shutdown: F,
    ) -> Result<()>
    where
        W: Write,
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        tracing::info!(interval_secs = interval.as_secs(), "Sync loop started");

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!("Sync loop stopped");
                    break;
                }
                _ = ticker.tick() => {
                    self.tick(presenter).await?;
                }
            }
        }

        Ok(())
    }

    async fn record_state(&self, update: impl FnOnce(SyncState) -> SyncState) {
        let store = self.store.lock().await;
        let state = update(read_state(&store));
        write_state(&store, &state);
    }
}

fn read_state(store: &QuoteStore) -> SyncState {
    store.storage().get_sync_state().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to read sync state");
        SyncState::default()
    })
}

fn write_state(store: &QuoteStore, state: &SyncState) {
    if let Err(e) = store.storage().update_sync_state(state) {
        tracing::warn!(error = %e, "Failed to update sync state");
    }
}
