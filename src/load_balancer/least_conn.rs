//! Least Connections load balancing strategy.

use crate::load_balancer::{
    backend::{Backend, BackendSet},
    tracker::ConnectionTracker,
    LoadBalancer,
};

/// Least connections selector.
/// Selects the backend with the minimum number of active connections and
/// reserves a connection on it before returning.
#[derive(Debug, Default)]
pub struct LeastConnections;

impl LeastConnections {
    pub fn new() -> Self {
        Self
    }
}

impl LoadBalancer for LeastConnections {
    fn next_server(&self, backends: &BackendSet, connections: &ConnectionTracker) -> Option<Backend> {
        // In case of tie, the first configured backend is selected (stability)
        connections
            .reserve_least(backends.backends())
            .map(|(backend, _)| backend)
    }

    fn reserves_connection(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "least_connections"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_least_conn() {
        let lb = LeastConnections::new();
        let tracker = ConnectionTracker::new();
        let backends = BackendSet::new(["127.0.0.1:8080", "127.0.0.1:8081"]).unwrap();
        let (b1, b2) = (&backends.backends()[0], &backends.backends()[1]);

        // artificially increase connections on b1
        tracker.increment(b1);

        // Should pick b2 (0 connections) and reserve on it
        let s1 = lb.next_server(&backends, &tracker).unwrap();
        assert_eq!(&s1, b2);
        assert_eq!(tracker.snapshot(b2), 1);

        // increase b2 again, now b2 has 2, b1 has 1
        tracker.increment(b2);

        // Should pick b1 (1 connection)
        let s2 = lb.next_server(&backends, &tracker).unwrap();
        assert_eq!(&s2, b1);
        assert_eq!(tracker.snapshot(b1), 2);
    }

    #[test]
    fn test_selected_count_is_minimal() {
        let lb = LeastConnections::new();
        let tracker = ConnectionTracker::new();
        let backends = BackendSet::new(["a", "b", "c"]).unwrap();

        for _ in 0..3 {
            tracker.increment(&backends.backends()[0]);
        }
        tracker.increment(&backends.backends()[2]);

        let before: Vec<u64> = backends.backends().iter().map(|b| tracker.snapshot(b)).collect();
        let chosen = lb.next_server(&backends, &tracker).unwrap();
        let idx = backends.backends().iter().position(|b| b == &chosen).unwrap();

        assert!(before.iter().all(|&c| before[idx] <= c));
        assert_eq!(chosen.addr(), "b");
    }
}
