//! DashMap Metrics Store
//!
//! Implements MetricsStore with a bounded FIFO history per (group, region)
//! pair, using DashMap for concurrent access across keys.

use crate::domain::entities::ReplicationMetrics;
use crate::domain::ports::MetricsStore;
use dashmap::DashMap;
use std::collections::VecDeque;

/// DashMap-backed sample history.
///
/// Each (group, region) pair owns an independent ring of samples capped at
/// `retention`; the oldest sample is evicted first. Eviction is count-based,
/// not time-based, so memory stays bounded deterministically.
pub struct DashMapMetricsStore {
    history: DashMap<(String, String), VecDeque<ReplicationMetrics>>,
    retention: usize,
}

impl DashMapMetricsStore {
    /// Create a store retaining up to `retention` samples per key.
    pub fn new(retention: usize) -> Self {
        Self {
            history: DashMap::new(),
            retention,
        }
    }

    /// Number of samples currently held for a (group, region) pair.
    pub fn len(&self, group_id: &str, region_id: &str) -> usize {
        self.history
            .get(&(group_id.to_string(), region_id.to_string()))
            .map(|h| h.len())
            .unwrap_or(0)
    }
}

impl MetricsStore for DashMapMetricsStore {
    fn append(&self, sample: ReplicationMetrics) {
        let key = (sample.group_id.clone(), sample.region_id.clone());
        let mut entry = self.history.entry(key).or_default();
        if entry.len() >= self.retention {
            entry.pop_front();
        }
        entry.push_back(sample);
    }

    fn latest(&self, group_id: &str, region_id: &str) -> Option<ReplicationMetrics> {
        self.history
            .get(&(group_id.to_string(), region_id.to_string()))
            .and_then(|h| h.back().cloned())
    }

    fn history(&self, group_id: &str, region_id: &str) -> Vec<ReplicationMetrics> {
        self.history
            .get(&(group_id.to_string(), region_id.to_string()))
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn purge_group(&self, group_id: &str) {
        self.history.retain(|(gid, _), _| gid != group_id);
    }
}
