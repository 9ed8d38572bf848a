//! Hierarchical progress accounting.
//!
//! One "unit" is one window-fetch. For multi-account runs the total is the
//! sum of per-account window counts, known before any daily fetch begins.
//! The tracker is an explicit accumulator updated from unit-completion
//! events, so the aggregation is testable without any orchestration around
//! it. Completion callbacks may arrive in any order; the tracker only ever
//! counts, so the reported percentage is non-decreasing.

use std::sync::Arc;

use parking_lot::Mutex;

/// Ordered progress snapshot delivered to observers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressEvent {
    /// Multi-account history export progress.
    History {
        completed_accounts: usize,
        total_accounts: usize,
        complete_percentage: f64,
    },
    /// Single-trend export progress.
    Trend { complete_percentage: f64 },
}

/// Observer for progress snapshots. Subscribe once, receive ordered events.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

#[derive(Debug, Default)]
struct TrackerState {
    completed_units: usize,
    completed_accounts: usize,
}

/// Accumulator folding account-level completions into a global percentage.
pub struct ProgressTracker {
    total_units: usize,
    total_accounts: usize,
    state: Mutex<TrackerState>,
}

/// Point-in-time view of the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub completed_units: usize,
    pub total_units: usize,
    pub completed_accounts: usize,
    pub total_accounts: usize,
}

impl ProgressSnapshot {
    /// Fraction of units completed in [0, 1]. A run with zero units is
    /// complete by definition.
    pub fn complete_percentage(&self) -> f64 {
        if self.total_units == 0 {
            1.0
        } else {
            self.completed_units as f64 / self.total_units as f64
        }
    }

    pub fn history_event(&self) -> ProgressEvent {
        ProgressEvent::History {
            completed_accounts: self.completed_accounts,
            total_accounts: self.total_accounts,
            complete_percentage: self.complete_percentage(),
        }
    }

    pub fn trend_event(&self) -> ProgressEvent {
        ProgressEvent::Trend {
            complete_percentage: self.complete_percentage(),
        }
    }
}

impl ProgressTracker {
    pub fn new(total_units: usize, total_accounts: usize) -> Self {
        Self {
            total_units,
            total_accounts,
            state: Mutex::new(TrackerState::default()),
        }
    }

    /// Record one finished window-fetch and return the resulting snapshot.
    pub fn unit_completed(&self) -> ProgressSnapshot {
        let mut state = self.state.lock();
        state.completed_units = (state.completed_units + 1).min(self.total_units);
        self.snapshot_locked(&state)
    }

    /// Record one finished window-fetch and hand the snapshot to `notify`
    /// while the tracker lock is still held. Completions landing on
    /// different worker threads therefore deliver their snapshots in the
    /// order they were counted, keeping the observed percentage
    /// non-decreasing.
    pub fn unit_completed_with<F>(&self, notify: F) -> ProgressSnapshot
    where
        F: FnOnce(&ProgressSnapshot),
    {
        let mut state = self.state.lock();
        state.completed_units = (state.completed_units + 1).min(self.total_units);
        let snapshot = self.snapshot_locked(&state);
        notify(&snapshot);
        snapshot
    }

    /// Record one fully-processed account and return the resulting snapshot.
    pub fn account_completed(&self) -> ProgressSnapshot {
        let mut state = self.state.lock();
        state.completed_accounts = (state.completed_accounts + 1).min(self.total_accounts);
        self.snapshot_locked(&state)
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.snapshot_locked(&self.state.lock())
    }

    fn snapshot_locked(&self, state: &TrackerState) -> ProgressSnapshot {
        ProgressSnapshot {
            completed_units: state.completed_units,
            total_units: self.total_units,
            completed_accounts: state.completed_accounts,
            total_accounts: self.total_accounts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_is_monotonic_and_hits_one_at_final_unit() {
        let tracker = ProgressTracker::new(5, 2);
        let mut last = 0.0;
        for i in 1..=5 {
            let snap = tracker.unit_completed();
            let pct = snap.complete_percentage();
            assert!(pct >= last);
            if i < 5 {
                assert!(pct < 1.0);
            } else {
                assert_eq!(pct, 1.0);
            }
            last = pct;
        }
    }

    #[test]
    fn test_account_completions_tracked_separately() {
        let tracker = ProgressTracker::new(3, 2);
        tracker.unit_completed();
        let snap = tracker.account_completed();
        assert_eq!(snap.completed_accounts, 1);
        assert_eq!(snap.completed_units, 1);
    }

    #[test]
    fn test_zero_units_is_complete() {
        let tracker = ProgressTracker::new(0, 0);
        assert_eq!(tracker.snapshot().complete_percentage(), 1.0);
    }

    #[test]
    fn test_overcounting_saturates() {
        let tracker = ProgressTracker::new(1, 1);
        tracker.unit_completed();
        let snap = tracker.unit_completed();
        assert_eq!(snap.completed_units, 1);
        assert_eq!(snap.complete_percentage(), 1.0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_completions_observed_in_counted_order() {
        // Completions land on different worker threads; each observer call
        // happens under the tracker lock, so snapshots arrive in exactly
        // the order they were counted.
        let tracker = Arc::new(ProgressTracker::new(64, 1));
        let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for _ in 0..64 {
            let tracker = tracker.clone();
            let seen = seen.clone();
            handles.push(tokio::spawn(async move {
                tracker.unit_completed_with(|snap| seen.lock().push(snap.completed_units));
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(*seen.lock(), (1..=64).collect::<Vec<usize>>());
    }

    #[test]
    fn test_event_shapes() {
        let tracker = ProgressTracker::new(2, 1);
        let snap = tracker.unit_completed();
        assert_eq!(
            snap.history_event(),
            ProgressEvent::History {
                completed_accounts: 0,
                total_accounts: 1,
                complete_percentage: 0.5,
            }
        );
        assert_eq!(
            snap.trend_event(),
            ProgressEvent::Trend {
                complete_percentage: 0.5,
            }
        );
    }
}
