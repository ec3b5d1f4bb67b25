//! geoSync Library
//!
//! Cross-region data replication engine: keeps a logical dataset consistent
//! across geographically distributed regions, monitors replication lag
//! against an SLA, resolves write conflicts, orchestrates failover and
//! propagates schema changes.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

// Re-export commonly used types
pub use application::ReplicationEngine;
pub use config::{load_config, EngineConfig};
pub use domain::entities::{
    ConflictInput, ConflictRecord, FailoverEvent, FailoverOutcome, GroupSpec, GroupUpdate,
    HealthStatus, Region, ReplicationGroup, ReplicationMetrics, ReplicationSnapshot, SchemaChange,
};
pub use domain::ports::{
    Clock, ConflictHook, DdlApplier, DdlError, MetricsStore, SystemClock, TelemetryError,
    TelemetrySample, TelemetrySource,
};
pub use domain::services::{ConflictResolver, HealthEvaluator};
pub use domain::value_objects::{
    ConflictStrategy, ConsistencyLevel, FailoverMode, FailoverTrigger, HealthState,
    SchemaChangeType, SchemaStatus, SnapshotState, Topology,
};
pub use error::{EngineError, EngineResult};
