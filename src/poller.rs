//! Periodic refresh of one dataset.
//!
//! A [`Poller`] fetches once on start, then on every interval tick, and on demand
//! through [`PollerHandle::trigger`]. Stopping it (or dropping the handle) ends the
//! schedule. A fetch already in flight runs to completion, but its result is
//! discarded instead of delivered.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Lifecycle of a poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Spawned, first fetch not started yet
    Idle,
    Fetching,
    /// Waiting for the next tick or a trigger
    Scheduled,
    Stopped,
}

#[derive(Clone)]
struct SharedState(Arc<Mutex<PollState>>);

impl SharedState {
    fn get(&self) -> PollState {
        self.0.lock().map(|s| *s).unwrap_or(PollState::Stopped)
    }

    /// `Stopped` is terminal.
    fn set(&self, next: PollState) {
        if let Ok(mut state) = self.0.lock() {
            if *state != PollState::Stopped {
                *state = next;
            }
        }
    }
}

pub struct Poller;

impl Poller {
    /// Start polling `fetch` every `interval`, passing each result to `deliver`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<T, F, Fut, D>(
        name: &'static str,
        interval: Duration,
        mut fetch: F,
        mut deliver: D,
    ) -> PollerHandle
    where
        T: Send + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        D: FnMut(T) + Send + 'static,
    {
        let state = SharedState(Arc::new(Mutex::new(PollState::Idle)));
        let mounted = Arc::new(AtomicBool::new(true));
        let trigger = Arc::new(Notify::new());
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = {
            let state = state.clone();
            let mounted = mounted.clone();
            let trigger = trigger.clone();

            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

                loop {
                    tokio::select! {
                        biased;
                        _ = shutdown_rx.changed() => break,
                        _ = trigger.notified() => {
                            tracing::debug!(poller = name, "Manual refresh");
                            ticker.reset();
                        }
                        _ = ticker.tick() => {}
                    }

                    state.set(PollState::Fetching);
                    let value = fetch().await;

                    if !mounted.load(Ordering::SeqCst) {
                        tracing::debug!(poller = name, "Stopped during fetch, discarding result");
                        break;
                    }
                    deliver(value);
                    state.set(PollState::Scheduled);
                }

                state.set(PollState::Stopped);
                tracing::debug!(poller = name, "Poller finished");
            })
        };

        tracing::info!(poller = name, interval_secs = interval.as_secs(), "Poller started");

        PollerHandle {
            name,
            state,
            mounted,
            trigger,
            shutdown: shutdown_tx,
            task: Some(task),
        }
    }
}

/// Owner of a running poller. Dropping it stops the poller.
pub struct PollerHandle {
    name: &'static str,
    state: SharedState,
    mounted: Arc<AtomicBool>,
    trigger: Arc<Notify>,
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn state(&self) -> PollState {
        self.state.get()
    }

    /// Fetch now instead of waiting for the next tick. The schedule restarts from here.
    pub fn trigger(&self) {
        if self.mounted.load(Ordering::SeqCst) {
            self.trigger.notify_one();
        }
    }

    /// Stop polling. Idempotent.
    pub fn stop(&self) {
        if self.mounted.swap(false, Ordering::SeqCst) {
            self.state.set(PollState::Stopped);
            let _ = self.shutdown.send(true);
            tracing::info!(poller = self.name, "Poller stopped");
        }
    }

    /// Stop and wait for the background task to exit.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
