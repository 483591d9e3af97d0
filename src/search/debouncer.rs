//! Debounced coin search.
//!
//! Every input restarts a quiet-period timer; only a timer that survives the whole
//! period runs a search. Each input also bumps a generation counter, and a search
//! whose generation is no longer current when it returns is dropped. A search that
//! has already been sent is never cancelled, so its response still reaches the cache.

use crate::models::SearchHit;
use crate::services::MarketService;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Default quiet period before a search is sent.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(300);

/// What the search box currently shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSnapshot {
    /// Latest input, as typed
    pub query: String,
    pub results: Vec<SearchHit>,
    /// Whether the results dropdown is open
    pub visible: bool,
    /// A search for `query` is in flight
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    /// A timer or search is outstanding
    Pending,
}

#[derive(Default)]
struct Inner {
    generation: u64,
    pending: Option<JoinHandle<()>>,
    /// The pending task is past its timer and awaiting the search
    searching: bool,
}

impl Inner {
    /// Cancel a task still waiting out its timer; detach one already searching.
    fn release_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            if !self.searching {
                pending.abort();
            }
        }
        self.searching = false;
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    match inner.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

pub struct SearchDebouncer {
    service: Arc<dyn MarketService>,
    quiet: Duration,
    inner: Arc<Mutex<Inner>>,
    snapshot: Arc<watch::Sender<SearchSnapshot>>,
}

impl SearchDebouncer {
    pub fn new(service: Arc<dyn MarketService>, quiet: Duration) -> Self {
        let (tx, _rx) = watch::channel(SearchSnapshot::default());
        Self {
            service,
            quiet,
            inner: Arc::new(Mutex::new(Inner::default())),
            snapshot: Arc::new(tx),
        }
    }

    /// Record new input text. Must be called from within a tokio runtime.
    pub fn input(&self, text: &str) {
        let mut inner = lock(&self.inner);
        inner.generation += 1;
        let generation = inner.generation;
        inner.release_pending();

        let query = text.trim().to_string();
        if query.is_empty() {
            self.snapshot.send_replace(SearchSnapshot {
                query: text.to_string(),
                ..Default::default()
            });
            return;
        }

        self.snapshot.send_modify(|s| {
            s.query = text.to_string();
            s.error = None;
        });

        let service = self.service.clone();
        let quiet = self.quiet;
        let state = self.inner.clone();
        let snapshot = self.snapshot.clone();

        inner.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            {
                let mut inner = lock(&state);
                if inner.generation != generation {
                    return;
                }
                inner.searching = true;
            }

            snapshot.send_modify(|s| s.loading = true);
            tracing::debug!(query = %query, "Running debounced search");
            let result = service.search(&query).await;

            let mut inner = lock(&state);
            if inner.generation != generation {
                tracing::debug!(query = %query, "Discarding superseded search result");
                return;
            }
            inner.pending = None;
            inner.searching = false;
            drop(inner);

            snapshot.send_modify(|s| {
                s.loading = false;
                s.visible = true;
                match result {
                    Ok(fetched) => {
                        s.results = fetched.data;
                        s.error = None;
                    }
                    Err(e) => {
                        tracing::warn!(query = %query, error = %e, "Search failed");
                        s.results = Vec::new();
                        s.error = Some(e.to_string());
                    }
                }
            });
        }));
    }

    /// Hide the results. A pending search still runs and shows its results.
    pub fn dismiss(&self) {
        self.snapshot.send_modify(|s| s.visible = false);
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Receive every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn state(&self) -> DebounceState {
        match &lock(&self.inner).pending {
            Some(task) if !task.is_finished() => DebounceState::Pending,
            _ => DebounceState::Idle,
        }
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        lock(&self.inner).release_pending();
    }
}
