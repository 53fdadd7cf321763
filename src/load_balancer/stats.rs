//! Per-backend request and latency statistics.
//!
//! Only running aggregates are kept (count, sum, min, max), so memory stays
//! constant per backend no matter how much traffic is dispatched.

use std::collections::{BTreeSet, HashMap};

use parking_lot::Mutex;
use serde::Serialize;

use crate::load_balancer::backend::Backend;

#[derive(Debug, Clone, Copy, Default)]
struct LatencyStats {
    requests: u64,
    sum: f64,
    min: f64,
    max: f64,
}

impl LatencyStats {
    fn record(&mut self, latency_secs: f64) {
        if self.requests == 0 {
            self.min = latency_secs;
            self.max = latency_secs;
        } else {
            self.min = self.min.min(latency_secs);
            self.max = self.max.max(latency_secs);
        }
        self.requests += 1;
        self.sum += latency_secs;
    }

    fn summary(&self) -> LatencySummary {
        let avg = if self.requests > 0 {
            self.sum / self.requests as f64
        } else {
            0.0
        };
        LatencySummary {
            count: self.requests,
            avg,
            min: self.min,
            max: self.max,
        }
    }
}

/// Derived view of a backend's traffic. All fields are zero when nothing
/// has been recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LatencySummary {
    pub count: u64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

/// Collects request counts and latency aggregates per backend.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    records: Mutex<HashMap<Backend, LatencyStats>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one request against `backend` and fold in its latency.
    pub fn record(&self, backend: &Backend, latency_secs: f64) {
        self.records
            .lock()
            .entry(backend.clone())
            .or_default()
            .record(latency_secs);
    }

    pub fn aggregate(&self, backend: &Backend) -> LatencySummary {
        self.records
            .lock()
            .get(backend)
            .map(LatencyStats::summary)
            .unwrap_or_default()
    }

    /// Backends that have at least one recorded request.
    pub fn all_backends(&self) -> BTreeSet<Backend> {
        self.records.lock().keys().cloned().collect()
    }
}
