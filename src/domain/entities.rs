//! Domain Entities - Core business objects
//!
//! These entities represent the core concepts of the replication domain.
//! They have no external dependencies and contain only business logic.

use crate::domain::value_objects::{
    ConflictStrategy, ConsistencyLevel, FailoverMode, FailoverTrigger, HealthState, SchemaChangeType,
    SchemaStatus, SnapshotState, Topology,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A geographic endpoint that can hold a copy of a dataset.
///
/// Regions are long-lived reference data: they are registered once and
/// outlive any replication group that points at them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    /// Unique identifier for this region (e.g., "us-east")
    pub id: String,
    /// Human-readable display name
    pub name: String,
    /// Hosting provider (aws, gcp, azure, on-prem, ...)
    pub provider: String,
    /// Network endpoint for the region's data-shipping primitive
    pub endpoint: String,
    /// Whether this region may be promoted to primary
    pub primary_eligible: bool,
    /// Failover candidate rank (lower ranks first)
    pub priority: u32,
    /// Compliance zone the region's data must stay within
    pub compliance_zone: String,
    /// Estimated one-way network latency in milliseconds
    pub estimated_latency_ms: u32,
}

impl Region {
    /// Estimated one-way latency for well-known region identifiers.
    ///
    /// Unknown identifiers fall into a default band.
    pub fn default_latency_ms(region_id: &str) -> u32 {
        const LATENCY_TABLE: &[(&str, u32)] = &[
            ("us-east", 40),
            ("us-west", 60),
            ("eu-west", 80),
            ("eu-central", 90),
            ("ap-northeast", 120),
            ("ap-southeast", 130),
            ("ap-south", 140),
            ("sa-east", 150),
        ];

        for (prefix, latency) in LATENCY_TABLE {
            if region_id.starts_with(prefix) {
                return *latency;
            }
        }
        100
    }
}

/// Caller-supplied specification for a new replication group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSpec {
    /// Unique identifier for the group
    pub id: String,
    /// Owning tenant
    pub tenant_id: String,
    /// Write-flow topology
    pub topology: Topology,
    /// Region that currently accepts writes
    pub primary_region_id: String,
    /// Ordered list of replica regions
    pub replica_region_ids: Vec<String>,
    /// Conflict resolution strategy
    pub conflict_strategy: ConflictStrategy,
    /// Staleness guarantee offered to readers
    pub consistency: ConsistencyLevel,
    /// Who decides when a failover happens
    pub failover_mode: FailoverMode,
    /// Maximum allowed replication lag in milliseconds (the SLA)
    pub sla_max_lag_ms: u64,
    /// Tables included in replication (empty = all)
    pub included_tables: Vec<String>,
    /// Tables excluded from replication
    pub excluded_tables: Vec<String>,
}

/// Partial update for a group's mutable policy fields.
///
/// `status` is deliberately absent: it is derived by health evaluation and
/// can never be written by callers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupUpdate {
    pub sla_max_lag_ms: Option<u64>,
    pub conflict_strategy: Option<ConflictStrategy>,
    pub consistency: Option<ConsistencyLevel>,
    pub failover_mode: Option<FailoverMode>,
    pub included_tables: Option<Vec<String>>,
    pub excluded_tables: Option<Vec<String>>,
}

/// The unit of replication configuration: one logical dataset mapped onto a
/// primary region and a set of replicas.
///
/// Invariant: `primary_region_id` is never a member of `replica_region_ids`,
/// before or after any failover.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationGroup {
    pub id: String,
    pub tenant_id: String,
    pub topology: Topology,
    pub primary_region_id: String,
    pub replica_region_ids: Vec<String>,
    pub conflict_strategy: ConflictStrategy,
    pub consistency: ConsistencyLevel,
    pub failover_mode: FailoverMode,
    pub sla_max_lag_ms: u64,
    pub included_tables: Vec<String>,
    pub excluded_tables: Vec<String>,
    /// Derived overall health, written only by health evaluation
    pub status: HealthState,
}

impl ReplicationGroup {
    /// Build a group from a validated spec with initial healthy status.
    pub fn from_spec(spec: GroupSpec) -> Self {
        Self {
            id: spec.id,
            tenant_id: spec.tenant_id,
            topology: spec.topology,
            primary_region_id: spec.primary_region_id,
            replica_region_ids: spec.replica_region_ids,
            conflict_strategy: spec.conflict_strategy,
            consistency: spec.consistency,
            failover_mode: spec.failover_mode,
            sla_max_lag_ms: spec.sla_max_lag_ms,
            included_tables: spec.included_tables,
            excluded_tables: spec.excluded_tables,
            status: HealthState::Healthy,
        }
    }

    /// All region ids of the group, primary first.
    pub fn all_region_ids(&self) -> Vec<String> {
        let mut ids = Vec::with_capacity(1 + self.replica_region_ids.len());
        ids.push(self.primary_region_id.clone());
        ids.extend(self.replica_region_ids.iter().cloned());
        ids
    }

    /// Merge a partial update into the group's mutable policy fields.
    pub fn apply_update(&mut self, update: GroupUpdate) {
        if let Some(sla) = update.sla_max_lag_ms {
            self.sla_max_lag_ms = sla;
        }
        if let Some(strategy) = update.conflict_strategy {
            self.conflict_strategy = strategy;
        }
        if let Some(consistency) = update.consistency {
            self.consistency = consistency;
        }
        if let Some(mode) = update.failover_mode {
            self.failover_mode = mode;
        }
        if let Some(tables) = update.included_tables {
            self.included_tables = tables;
        }
        if let Some(tables) = update.excluded_tables {
            self.excluded_tables = tables;
        }
    }
}

/// An immutable, timestamped telemetry sample for one (group, region) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationMetrics {
    pub group_id: String,
    pub region_id: String,
    /// When the sample was taken, epoch milliseconds
    pub sampled_at_ms: u64,
    /// Replication lag behind the primary; zero by construction for the primary
    pub lag_ms: u64,
    pub writes_per_sec: f64,
    pub reads_per_sec: f64,
    pub bytes_per_sec: f64,
    pub conflicts_per_min: f64,
    pub error_rate: f64,
    pub pending_ops: u64,
}

/// Input for recording a write conflict between two regions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictInput {
    pub group_id: String,
    pub table: String,
    pub primary_key: String,
    pub region_a: String,
    pub value_a: serde_json::Value,
    pub ts_a_ms: u64,
    pub region_b: String,
    pub value_b: serde_json::Value,
    pub ts_b_ms: u64,
}

/// An immutable record of one resolved write conflict.
///
/// Created only by conflict resolution and never mutated afterwards; the
/// accumulated records form the audit trail for diagnosing data divergence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictRecord {
    pub id: String,
    pub group_id: String,
    pub table: String,
    pub primary_key: String,
    pub region_a: String,
    pub value_a: serde_json::Value,
    pub ts_a_ms: u64,
    pub region_b: String,
    pub value_b: serde_json::Value,
    pub ts_b_ms: u64,
    /// Strategy that was applied
    pub strategy: ConflictStrategy,
    pub resolved_value: serde_json::Value,
    /// False when an external hook made the decision
    pub resolved_automatically: bool,
    pub recorded_at_ms: u64,
}

/// Outcome of a failover trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FailoverOutcome {
    /// A replica was promoted; the event carries RTO/RPO accounting
    Promoted(FailoverEvent),
    /// No primary-eligible replica exists; the group is left untouched
    NoEligibleCandidate { group_id: String, reason: String },
}

impl FailoverOutcome {
    pub fn is_promoted(&self) -> bool {
        matches!(self, FailoverOutcome::Promoted(_))
    }
}

/// One failover of a group, from trigger to completion.
///
/// Created when the failover starts and mutated exactly once, on completion,
/// to finalize the measured recovery time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailoverEvent {
    pub id: String,
    pub group_id: String,
    pub trigger: FailoverTrigger,
    pub previous_primary: String,
    pub new_primary: String,
    /// Estimated at trigger time, replaced by the measured value on completion
    pub rto_ms: u64,
    /// The new primary's lag at trigger time: data that may not have replicated
    pub rpo_ms: u64,
    /// Estimated number of records lost, derived from lag and write rate
    pub data_loss_records: u64,
    pub notes: Option<String>,
    pub triggered_at_ms: u64,
    pub completed: bool,
    pub completed_at_ms: Option<u64>,
}

/// A point-in-time consistent snapshot of a subset of tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationSnapshot {
    pub id: String,
    pub group_id: String,
    pub created_at_ms: u64,
    /// Consistency point, slightly before `created_at_ms`
    pub consistent_at_ms: u64,
    pub tables: Vec<String>,
    /// Diagnostic CRC32 per captured table
    pub table_checksums: BTreeMap<String, u32>,
    pub size_bytes: u64,
    pub expires_at_ms: u64,
}

impl ReplicationSnapshot {
    /// Lifecycle state at the given instant. Expiry is a read-time
    /// computation, not an active sweep.
    pub fn state(&self, now_ms: u64) -> SnapshotState {
        if now_ms < self.created_at_ms {
            SnapshotState::Creating
        } else if now_ms >= self.expires_at_ms {
            SnapshotState::Expired
        } else {
            SnapshotState::Ready
        }
    }
}

/// A schema change and its per-region propagation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaChange {
    pub id: String,
    pub group_id: String,
    pub table: String,
    pub change_type: SchemaChangeType,
    pub ddl: String,
    pub succeeded_regions: Vec<String>,
    pub failed_regions: Vec<String>,
    pub status: SchemaStatus,
    pub applied_at_ms: u64,
}

/// Health classification of a single region within a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionHealth {
    pub region_id: String,
    pub status: HealthState,
    pub lag_ms: u64,
    /// When this region was last seen, epoch milliseconds
    pub last_seen_ms: Option<u64>,
}

/// Derived health snapshot for a group, recomputed on every evaluation.
///
/// Only the latest evaluation is retained per group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub group_id: String,
    /// Worst-case aggregate of the per-region statuses
    pub overall: HealthState,
    pub regions: Vec<RegionHealth>,
    /// True iff the maximum observed lag exceeds the group's SLA
    pub sla_breached: bool,
    /// Reserved for quorum-based detection; currently always `false`
    pub split_brain_suspected: bool,
    /// Conflicts recorded in the last minute
    pub open_conflicts: u64,
    /// At least one region offline and the group is not manual-failover
    pub failover_pending: bool,
    pub evaluated_at_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_spec() -> GroupSpec {
        GroupSpec {
            id: "orders".to_string(),
            tenant_id: "acme".to_string(),
            topology: Topology::PrimaryReplica,
            primary_region_id: "us-east".to_string(),
            replica_region_ids: vec!["us-west".to_string(), "eu-west".to_string()],
            conflict_strategy: ConflictStrategy::LastWriteWins,
            consistency: ConsistencyLevel::BoundedStaleness,
            failover_mode: FailoverMode::Automatic,
            sla_max_lag_ms: 200,
            included_tables: vec![],
            excluded_tables: vec![],
        }
    }

    // ===== Region Tests =====

    #[test]
    fn test_default_latency_known_regions() {
        assert_eq!(Region::default_latency_ms("us-east"), 40);
        assert_eq!(Region::default_latency_ms("us-east-1"), 40);
        assert_eq!(Region::default_latency_ms("eu-central-1"), 90);
        assert_eq!(Region::default_latency_ms("sa-east-1"), 150);
    }

    #[test]
    fn test_default_latency_unknown_region_band() {
        assert_eq!(Region::default_latency_ms("mars-north-1"), 100);
        assert_eq!(Region::default_latency_ms(""), 100);
    }

    // ===== ReplicationGroup Tests =====

    #[test]
    fn test_group_from_spec_starts_healthy() {
        let group = ReplicationGroup::from_spec(sample_spec());
        assert_eq!(group.status, HealthState::Healthy);
        assert_eq!(group.primary_region_id, "us-east");
        assert_eq!(group.replica_region_ids.len(), 2);
    }

    #[test]
    fn test_group_all_region_ids_primary_first() {
        let group = ReplicationGroup::from_spec(sample_spec());
        assert_eq!(group.all_region_ids(), vec!["us-east", "us-west", "eu-west"]);
    }

    #[test]
    fn test_group_apply_update_merges_fields() {
        let mut group = ReplicationGroup::from_spec(sample_spec());

        group.apply_update(GroupUpdate {
            sla_max_lag_ms: Some(500),
            conflict_strategy: Some(ConflictStrategy::Crdt),
            included_tables: Some(vec!["orders".to_string()]),
            ..Default::default()
        });

        assert_eq!(group.sla_max_lag_ms, 500);
        assert_eq!(group.conflict_strategy, ConflictStrategy::Crdt);
        assert_eq!(group.included_tables, vec!["orders".to_string()]);
        // Untouched fields keep their values
        assert_eq!(group.consistency, ConsistencyLevel::BoundedStaleness);
        assert_eq!(group.failover_mode, FailoverMode::Automatic);
    }

    #[test]
    fn test_group_apply_empty_update_is_noop() {
        let mut group = ReplicationGroup::from_spec(sample_spec());
        let before = group.clone();

        group.apply_update(GroupUpdate::default());

        assert_eq!(group.sla_max_lag_ms, before.sla_max_lag_ms);
        assert_eq!(group.status, before.status);
    }

    // ===== Snapshot Tests =====

    #[test]
    fn test_snapshot_state_ready_then_expired() {
        let snapshot = ReplicationSnapshot {
            id: "s1".to_string(),
            group_id: "orders".to_string(),
            created_at_ms: 1000,
            consistent_at_ms: 950,
            tables: vec!["orders".to_string()],
            table_checksums: BTreeMap::new(),
            size_bytes: 4096,
            expires_at_ms: 2000,
        };

        assert_eq!(snapshot.state(500), SnapshotState::Creating);
        assert_eq!(snapshot.state(1000), SnapshotState::Ready);
        assert_eq!(snapshot.state(1999), SnapshotState::Ready);
        assert_eq!(snapshot.state(2000), SnapshotState::Expired);
        assert_eq!(snapshot.state(5000), SnapshotState::Expired);
    }

    // ===== FailoverOutcome Tests =====

    #[test]
    fn test_failover_outcome_is_promoted() {
        let outcome = FailoverOutcome::NoEligibleCandidate {
            group_id: "orders".to_string(),
            reason: "no primary-eligible replicas".to_string(),
        };
        assert!(!outcome.is_promoted());
    }
}
