//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::load_balancer::{
    backend::{Backend, BackendSet},
    tracker::ConnectionTracker,
    LoadBalancer,
};

/// Round-robin selector.
/// Keeps a cursor in `[0, len)` and rotates through backends in configured order.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoadBalancer for RoundRobin {
    fn next_server(&self, backends: &BackendSet, _connections: &ConnectionTracker) -> Option<Backend> {
        let len = backends.len();
        if len == 0 {
            return None;
        }

        // Read and advance in a single CAS so concurrent callers never share an index.
        let index = self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| Some((c + 1) % len))
            .unwrap_or_else(|c| c);

        backends.backends().get(index % len).cloned()
    }

    fn name(&self) -> &'static str {
        "round_robin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_round_robin() {
        let lb = RoundRobin::new();
        let tracker = ConnectionTracker::new();
        let backends = BackendSet::new(["10.0.0.1", "10.0.0.2", "10.0.0.3"]).unwrap();

        let picks: Vec<_> = (0..7)
            .map(|_| lb.next_server(&backends, &tracker).unwrap())
            .collect();

        for (i, pick) in picks.iter().enumerate() {
            assert_eq!(pick, &backends.backends()[i % 3]);
        }
    }

    #[test]
    fn test_round_robin_does_not_touch_connections() {
        let lb = RoundRobin::new();
        let tracker = ConnectionTracker::new();
        let backends = BackendSet::new(["10.0.0.1"]).unwrap();

        lb.next_server(&backends, &tracker);
        assert_eq!(tracker.snapshot(&backends.backends()[0]), 0);
    }

    #[test]
    fn test_round_robin_concurrent_is_even() {
        let lb = Arc::new(RoundRobin::new());
        let tracker = Arc::new(ConnectionTracker::new());
        let backends = Arc::new(BackendSet::new(["a", "b", "c"]).unwrap());

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let (lb, tracker, backends) = (lb.clone(), tracker.clone(), backends.clone());
                thread::spawn(move || {
                    (0..300)
                        .map(|_| lb.next_server(&backends, &tracker).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut hits: HashMap<Backend, usize> = HashMap::new();
        for h in handles {
            for b in h.join().unwrap() {
                *hits.entry(b).or_default() += 1;
            }
        }

        // 1800 picks over 3 backends: no index is skipped or served twice
        assert!(hits.values().all(|&n| n == 600), "uneven distribution: {:?}", hits);
    }
}
