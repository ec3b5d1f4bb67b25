//! Metrics Store Port
//!
//! Defines the interface for the bounded per-(group, region) sample history.
//! Health evaluation and failover candidate selection read the most recent
//! sample through this interface.

use crate::domain::entities::ReplicationMetrics;

/// Store for replication telemetry samples.
///
/// Appends for different (group, region) keys may run concurrently; the
/// store bounds each history to a fixed cap with FIFO eviction.
pub trait MetricsStore: Send + Sync {
    /// Append a sample to its (group, region) history.
    fn append(&self, sample: ReplicationMetrics);

    /// Most recent sample for a (group, region) pair.
    fn latest(&self, group_id: &str, region_id: &str) -> Option<ReplicationMetrics>;

    /// Full retained history for a (group, region) pair, oldest first.
    fn history(&self, group_id: &str, region_id: &str) -> Vec<ReplicationMetrics>;

    /// Drop all histories belonging to a group.
    fn purge_group(&self, group_id: &str);
}
