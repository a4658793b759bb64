//! Scoped timers and snapshot state cells.
//!
//! The simulated UI processes (upload progress, reply delay) run as timer tasks
//! spawned from a [`TaskScope`]. Component state lives in [`StateCell`]s bound to
//! the same scope. Disposing the scope cancels every timer, and sealing a cell
//! takes its write lock before marking it dead, so a timer that already woke up
//! can never land a mutation on a disposed component.
//!
//! # Example
//!
//! ```rust
//! use pdf_assistant::scheduler::{StateCell, TaskScope};
//!
//! let scope = TaskScope::new();
//! let cell = StateCell::new(0_u8, &scope);
//!
//! assert!(cell.update(|n| Some(n + 1)).is_some());
//! scope.dispose();
//! cell.seal();
//! assert!(cell.update(|n| Some(n + 1)).is_none());
//! assert_eq!(*cell.get(), 1);
//! ```

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};
use tokio_util::task::TaskTracker;

/// Owner of a group of timer tasks.
///
/// Cloning a scope shares it; disposing any clone disposes all of them.
#[derive(Debug, Clone, Default)]
pub struct TaskScope {
    token: CancellationToken,
    tracker: TaskTracker,
}

impl TaskScope {
    /// Create a live scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel every task spawned from this scope and refuse new ones.
    pub fn dispose(&self) {
        self.token.cancel();
        self.tracker.close();
    }

    /// Whether [`TaskScope::dispose`] has been called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the scope is disposed.
    pub fn disposed(&self) -> WaitForCancellationFutureOwned {
        self.token.clone().cancelled_owned()
    }

    /// Number of timer tasks that have not finished yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Wait until every task spawned from a disposed scope has exited.
    pub async fn drained(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }

    /// Run `callback` once at `deadline`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule_at<F>(&self, deadline: Instant, callback: F) -> TimerHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let token = self.token.child_token();
        let handle = TimerHandle {
            token: token.clone(),
        };
        if self.is_disposed() {
            return handle;
        }

        self.tracker.spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => {}
                () = time::sleep_until(deadline) => callback(),
            }
        });
        handle
    }

    /// Run `callback` once after `delay`.
    pub fn schedule_after<F>(&self, delay: Duration, callback: F) -> TimerHandle
    where
        F: FnOnce() + Send + 'static,
    {
        self.schedule_at(Instant::now() + delay, callback)
    }

    /// Run `callback` every `period`, first after one full period, until it
    /// returns [`ControlFlow::Break`] or the timer is cancelled.
    pub fn schedule_every<F>(&self, period: Duration, mut callback: F) -> TimerHandle
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let token = self.token.child_token();
        let handle = TimerHandle {
            token: token.clone(),
        };
        if self.is_disposed() {
            return handle;
        }

        self.tracker.spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {
                        if callback().is_break() {
                            break;
                        }
                    }
                }
            }
        });
        handle
    }

    fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

/// Handle to a single scheduled timer.
///
/// Dropping the handle does not cancel the timer.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    token: CancellationToken,
}

impl TimerHandle {
    /// Cancel this timer only.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// A published, immutable snapshot of component state.
///
/// Updates replace the snapshot wholesale and notify every subscriber. Once the
/// owning scope is disposed, updates are refused.
#[derive(Debug)]
pub struct StateCell<T> {
    tx: watch::Sender<Arc<T>>,
    token: CancellationToken,
}

impl<T> StateCell<T> {
    /// Create a cell holding `initial`, bound to `scope`.
    pub fn new(initial: T, scope: &TaskScope) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(initial));
        Self {
            tx,
            token: scope.token(),
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn get(&self) -> Arc<T> {
        Arc::clone(&self.tx.borrow())
    }

    /// Subscribe to snapshot changes. The receiver starts at the current one.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<T>> {
        self.tx.subscribe()
    }

    /// Compute the next snapshot from the current one.
    ///
    /// `step` returns `None` to leave the state untouched. Returns the newly
    /// published snapshot, or `None` when nothing was published.
    pub fn update<F>(&self, step: F) -> Option<Arc<T>>
    where
        F: FnOnce(&T) -> Option<T>,
    {
        let mut published = None;
        self.tx.send_if_modified(|current| {
            if self.token.is_cancelled() {
                return false;
            }
            match step(current.as_ref()) {
                Some(next) => {
                    let next = Arc::new(next);
                    *current = Arc::clone(&next);
                    published = Some(next);
                    true
                }
                None => false,
            }
        });
        published
    }

    /// Refuse all further updates.
    ///
    /// Runs under the write lock, so an update already in progress finishes
    /// first and none can start afterwards.
    pub fn seal(&self) {
        self.tx.send_if_modified(|_| {
            self.token.cancel();
            false
        });
    }

    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_schedule_after_fires_once() {
        let scope = TaskScope::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        scope.schedule_after(Duration::from_millis(500), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        time::sleep(Duration::from_millis(499)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        time::sleep(Duration::from_millis(2)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(scope.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_cancels_pending_timer() {
        let scope = TaskScope::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        scope.schedule_after(Duration::from_millis(100), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        scope.dispose();

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        scope.drained().await;
        assert_eq!(scope.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_every_stops_on_break() {
        let scope = TaskScope::new();
        let ticks = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&ticks);
        scope.schedule_every(Duration::from_millis(100), move || {
            if counter.fetch_add(1, Ordering::SeqCst) + 1 == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        time::sleep(Duration::from_millis(250)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);

        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_handle_cancels_single_timer() {
        let scope = TaskScope::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let first = Arc::clone(&hits);
        let handle = scope.schedule_after(Duration::from_millis(10), move || {
            first.fetch_add(1, Ordering::SeqCst);
        });
        let second = Arc::clone(&hits);
        scope.schedule_after(Duration::from_millis(10), move || {
            second.fetch_add(10, Ordering::SeqCst);
        });

        handle.cancel();
        time::sleep(Duration::from_millis(50)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 10);
        assert!(!scope.is_disposed());
    }

    #[tokio::test]
    async fn test_state_cell_publishes_snapshots() {
        let scope = TaskScope::new();
        let cell = StateCell::new(vec![1], &scope);
        let mut rx = cell.subscribe();

        let before = cell.get();
        cell.update(|v| {
            let mut next = v.clone();
            next.push(2);
            Some(next)
        });

        assert_eq!(*before, vec![1]);
        assert!(rx.has_changed().unwrap());
        assert_eq!(**rx.borrow_and_update(), vec![1, 2]);

        assert!(cell.update(|_| None).is_none());
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_sealed_cell_refuses_updates() {
        let scope = TaskScope::new();
        let cell = StateCell::new(String::from("a"), &scope);

        cell.seal();
        assert!(cell.is_sealed());
        assert!(scope.is_disposed());
        assert!(cell.update(|_| Some(String::from("b"))).is_none());
        assert_eq!(cell.get().as_str(), "a");
    }
}
