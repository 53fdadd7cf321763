//! Active connection accounting.
//!
//! Counts are a load signal for least-connections selection, not a literal
//! count of transport connections. Entries are created lazily on first
//! increment and never removed.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::load_balancer::backend::Backend;

/// What a [`ConnectionTracker::decrement`] call actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Count was positive and has been decremented.
    Released { remaining: u64 },
    /// Backend is tracked but already at zero.
    AlreadyIdle,
    /// Backend never received tracked traffic.
    Untracked,
}

impl ReleaseOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseOutcome::Released { .. } => "released",
            ReleaseOutcome::AlreadyIdle => "already_idle",
            ReleaseOutcome::Untracked => "untracked",
        }
    }
}

/// Per-backend active connection counters.
#[derive(Debug, Default)]
pub struct ConnectionTracker {
    counts: Mutex<HashMap<Backend, u64>>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one to the backend's count, initializing it to zero if unseen.
    pub fn increment(&self, backend: &Backend) {
        *self.counts.lock().entry(backend.clone()).or_insert(0) += 1;
    }

    /// Subtract one from the backend's count, floored at zero.
    /// Unknown backends are left untouched.
    pub fn decrement(&self, backend: &Backend) -> ReleaseOutcome {
        let mut counts = self.counts.lock();
        match counts.get_mut(backend) {
            Some(0) => ReleaseOutcome::AlreadyIdle,
            Some(count) => {
                *count -= 1;
                ReleaseOutcome::Released { remaining: *count }
            }
            None => ReleaseOutcome::Untracked,
        }
    }

    /// Current count for the backend; zero if never tracked.
    pub fn snapshot(&self, backend: &Backend) -> u64 {
        self.counts.lock().get(backend).copied().unwrap_or(0)
    }

    /// Pick the backend with the fewest active connections and reserve a
    /// slot on it, all under one lock.
    ///
    /// Ties go to the earliest backend in `candidates`. Returns `None` only
    /// when `candidates` is empty.
    pub fn reserve_least(&self, candidates: &[Backend]) -> Option<(Backend, u64)> {
        let mut counts = self.counts.lock();

        // min_by_key keeps the first of equal minima
        let chosen = candidates
            .iter()
            .min_by_key(|b| counts.get(*b).copied().unwrap_or(0))?
            .clone();

        let count = counts.entry(chosen.clone()).or_insert(0);
        *count += 1;
        let reserved = *count;
        Some((chosen, reserved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(addr: &str) -> Backend {
        Backend::new(addr)
    }

    #[test]
    fn test_increment_initializes_unknown_backend() {
        let tracker = ConnectionTracker::new();
        let a = backend("10.0.0.1");
        assert_eq!(tracker.snapshot(&a), 0);
        tracker.increment(&a);
        tracker.increment(&a);
        assert_eq!(tracker.snapshot(&a), 2);
    }

    #[test]
    fn test_decrement_floors_at_zero() {
        let tracker = ConnectionTracker::new();
        let a = backend("10.0.0.1");
        tracker.increment(&a);

        assert_eq!(tracker.decrement(&a), ReleaseOutcome::Released { remaining: 0 });
        assert_eq!(tracker.decrement(&a), ReleaseOutcome::AlreadyIdle);
        assert_eq!(tracker.snapshot(&a), 0);
    }

    #[test]
    fn test_decrement_unknown_is_noop() {
        let tracker = ConnectionTracker::new();
        let a = backend("10.0.0.1");
        assert_eq!(tracker.decrement(&a), ReleaseOutcome::Untracked);
        assert_eq!(tracker.snapshot(&a), 0);
    }

    #[test]
    fn test_reserve_least_breaks_ties_in_order() {
        let tracker = ConnectionTracker::new();
        let candidates = vec![backend("a"), backend("b"), backend("c")];

        let (first, _) = tracker.reserve_least(&candidates).unwrap();
        let (second, _) = tracker.reserve_least(&candidates).unwrap();
        let (third, _) = tracker.reserve_least(&candidates).unwrap();
        assert_eq!(first.addr(), "a");
        assert_eq!(second.addr(), "b");
        assert_eq!(third.addr(), "c");

        tracker.decrement(&candidates[1]);
        let (next, count) = tracker.reserve_least(&candidates).unwrap();
        assert_eq!(next.addr(), "b");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_reserve_least_concurrent_spreads_load() {
        use std::sync::Arc;
        use std::thread;

        let tracker = Arc::new(ConnectionTracker::new());
        let candidates = Arc::new(vec![backend("a"), backend("b"), backend("c"), backend("d")]);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = tracker.clone();
                let candidates = candidates.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        tracker.reserve_least(&candidates);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        // 800 reservations with read-then-reserve under one lock stay perfectly even
        for b in candidates.iter() {
            assert_eq!(tracker.snapshot(b), 200);
        }
    }
}
