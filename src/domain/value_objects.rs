//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.
//! They are immutable and can be freely shared.

use serde::{Deserialize, Serialize};

/// How writes flow between the regions of a replication group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// One writable primary, read-only replicas
    PrimaryReplica,
    /// Every region accepts writes; conflicts are expected
    MultiMaster,
    /// Each region forwards to the next in a ring
    Ring,
    /// A hub region fans changes out to spokes
    HubSpoke,
    /// All regions ship changes to all others
    Mesh,
}

impl Topology {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PrimaryReplica => "primary_replica",
            Self::MultiMaster => "multi_master",
            Self::Ring => "ring",
            Self::HubSpoke => "hub_spoke",
            Self::Mesh => "mesh",
        }
    }
}

impl std::fmt::Display for Topology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Staleness guarantee offered to readers of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyLevel {
    /// Replicas converge eventually, no bound
    Eventual,
    /// Replicas never trail the primary by more than the SLA lag
    BoundedStaleness,
    /// Read-your-writes within a session
    Session,
    /// All replicas acknowledge before a write commits
    Strong,
}

impl ConsistencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eventual => "eventual",
            Self::BoundedStaleness => "bounded_staleness",
            Self::Session => "session",
            Self::Strong => "strong",
        }
    }
}

impl std::fmt::Display for ConsistencyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How two conflicting region-local writes to the same record are reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictStrategy {
    /// No resolution configured; only valid for single-writer topologies
    None,
    /// The write with the greater timestamp wins
    LastWriteWins,
    /// The write with the lesser timestamp wins
    FirstWriteWins,
    /// Timestamp-ordered, same tie-break as last-write-wins
    VersionVector,
    /// Structured values are shallow-merged, scalars fall back to LWW
    Crdt,
    /// Delegated to an external resolution hook
    Custom,
}

impl ConflictStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::LastWriteWins => "last_write_wins",
            Self::FirstWriteWins => "first_write_wins",
            Self::VersionVector => "version_vector",
            Self::Crdt => "crdt",
            Self::Custom => "custom",
        }
    }
}

impl std::fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who decides when a failover happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailoverMode {
    /// The health evaluator promotes a replacement on its own
    Automatic,
    /// Only explicit operator commands trigger failover
    Manual,
    /// The evaluator flags a pending failover but waits for confirmation
    SemiAutomatic,
}

impl FailoverMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Automatic => "automatic",
            Self::Manual => "manual",
            Self::SemiAutomatic => "semi_automatic",
        }
    }
}

impl std::fmt::Display for FailoverMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What caused a failover to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailoverTrigger {
    /// Health evaluation found the primary or a replica offline
    HealthCheck,
    /// An operator requested the failover
    Manual,
    /// Planned maintenance window
    Scheduled,
    /// A network partition was reported
    NetworkPartition,
}

impl FailoverTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HealthCheck => "health_check",
            Self::Manual => "manual",
            Self::Scheduled => "scheduled",
            Self::NetworkPartition => "network_partition",
        }
    }
}

impl std::fmt::Display for FailoverTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Health classification for a region or a whole group.
///
/// Variants are ordered from best to worst, so the worst-case aggregate of a
/// set of regions is simply the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    /// Lag within the SLA
    Healthy,
    /// Lag above the SLA
    Lagging,
    /// Lag above twice the SLA
    Degraded,
    /// No sample within the staleness window
    Offline,
}

impl HealthState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Lagging => "lagging",
            Self::Degraded => "degraded",
            Self::Offline => "offline",
        }
    }
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of DDL change propagated across a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaChangeType {
    AddColumn,
    DropColumn,
    ModifyColumn,
    AddIndex,
    DropIndex,
    CreateTable,
    DropTable,
}

impl SchemaChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddColumn => "add_column",
            Self::DropColumn => "drop_column",
            Self::ModifyColumn => "modify_column",
            Self::AddIndex => "add_index",
            Self::DropIndex => "drop_index",
            Self::CreateTable => "create_table",
            Self::DropTable => "drop_table",
        }
    }
}

impl std::fmt::Display for SchemaChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a schema change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaStatus {
    Pending,
    Propagating,
    Applied,
    Failed,
}

impl SchemaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Propagating => "propagating",
            Self::Applied => "applied",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for SchemaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of a snapshot, computed at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotState {
    Creating,
    Ready,
    Expired,
}

impl SnapshotState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creating => "creating",
            Self::Ready => "ready",
            Self::Expired => "expired",
        }
    }
}

impl std::fmt::Display for SnapshotState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===== HealthState Tests =====

    #[test]
    fn test_health_state_ordering() {
        assert!(HealthState::Healthy < HealthState::Lagging);
        assert!(HealthState::Lagging < HealthState::Degraded);
        assert!(HealthState::Degraded < HealthState::Offline);
    }

    #[test]
    fn test_health_state_worst_is_max() {
        let states = vec![
            HealthState::Healthy,
            HealthState::Degraded,
            HealthState::Lagging,
        ];
        assert_eq!(
            states.into_iter().max(),
            Some(HealthState::Degraded)
        );
    }

    #[test]
    fn test_health_state_display() {
        assert_eq!(format!("{}", HealthState::Healthy), "healthy");
        assert_eq!(format!("{}", HealthState::Lagging), "lagging");
        assert_eq!(format!("{}", HealthState::Degraded), "degraded");
        assert_eq!(format!("{}", HealthState::Offline), "offline");
    }

    // ===== Serde Tests =====

    #[test]
    fn test_topology_serde_snake_case() {
        let json = serde_json::to_string(&Topology::MultiMaster).unwrap();
        assert_eq!(json, "\"multi_master\"");

        let parsed: Topology = serde_json::from_str("\"hub_spoke\"").unwrap();
        assert_eq!(parsed, Topology::HubSpoke);
    }

    #[test]
    fn test_conflict_strategy_serde() {
        let json = serde_json::to_string(&ConflictStrategy::LastWriteWins).unwrap();
        assert_eq!(json, "\"last_write_wins\"");

        let parsed: ConflictStrategy = serde_json::from_str("\"crdt\"").unwrap();
        assert_eq!(parsed, ConflictStrategy::Crdt);
    }

    #[test]
    fn test_consistency_level_display() {
        assert_eq!(
            format!("{}", ConsistencyLevel::BoundedStaleness),
            "bounded_staleness"
        );
        assert_eq!(format!("{}", ConsistencyLevel::Strong), "strong");
    }

    #[test]
    fn test_failover_mode_display() {
        assert_eq!(format!("{}", FailoverMode::Automatic), "automatic");
        assert_eq!(format!("{}", FailoverMode::SemiAutomatic), "semi_automatic");
    }

    #[test]
    fn test_failover_trigger_display() {
        assert_eq!(format!("{}", FailoverTrigger::HealthCheck), "health_check");
        assert_eq!(
            format!("{}", FailoverTrigger::NetworkPartition),
            "network_partition"
        );
    }

    #[test]
    fn test_schema_change_type_display() {
        assert_eq!(format!("{}", SchemaChangeType::AddColumn), "add_column");
        assert_eq!(format!("{}", SchemaChangeType::DropTable), "drop_table");
    }

    #[test]
    fn test_schema_status_display() {
        assert_eq!(format!("{}", SchemaStatus::Propagating), "propagating");
        assert_eq!(format!("{}", SchemaStatus::Applied), "applied");
    }

    #[test]
    fn test_snapshot_state_display() {
        assert_eq!(format!("{}", SnapshotState::Creating), "creating");
        assert_eq!(format!("{}", SnapshotState::Ready), "ready");
        assert_eq!(format!("{}", SnapshotState::Expired), "expired");
    }
}
