use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Operational counters for the engine. An empty recommendation list and
/// a store outage both look like "no results" to the end user; these
/// counters keep them distinguishable in telemetry.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    recommendations_served: AtomicU64,
    empty_results: AtomicU64,
    store_errors: AtomicU64,
    interactions_tracked: AtomicU64,
    preference_cache_hits: AtomicU64,
    preference_cache_misses: AtomicU64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub recommendations_served: u64,
    pub empty_results: u64,
    pub store_errors: u64,
    pub interactions_tracked: u64,
    pub preference_cache_hits: u64,
    pub preference_cache_misses: u64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_served(&self, result_count: usize) {
        self.recommendations_served.fetch_add(1, Ordering::Relaxed);
        if result_count == 0 {
            self.empty_results.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_store_error(&self) {
        self.store_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_interaction(&self) {
        self.interactions_tracked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.preference_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.preference_cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            recommendations_served: self.recommendations_served.load(Ordering::Relaxed),
            empty_results: self.empty_results.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
            interactions_tracked: self.interactions_tracked.load(Ordering::Relaxed),
            preference_cache_hits: self.preference_cache_hits.load(Ordering::Relaxed),
            preference_cache_misses: self.preference_cache_misses.load(Ordering::Relaxed),
        }
    }
}
