//! Replication Engine - Main application use case
//!
//! Orchestrates region registration, group lifecycle, metric collection,
//! health evaluation, failover, conflict resolution, schema propagation and
//! snapshots. One engine instance owns all state; construct it once at
//! process start and share it by cloning (all clones see the same state).

use crate::adapters::outbound::DashMapMetricsStore;
use crate::config::EngineConfig;
use crate::domain::entities::{
    ConflictInput, ConflictRecord, FailoverEvent, FailoverOutcome, GroupSpec, GroupUpdate,
    HealthStatus, Region, ReplicationGroup, ReplicationMetrics, ReplicationSnapshot, SchemaChange,
};
use crate::domain::ports::{
    Clock, ConflictHook, DdlApplier, MetricsStore, SystemClock, TelemetrySource,
};
use crate::domain::services::{ConflictResolver, HealthEvaluator};
use crate::domain::value_objects::{
    ConflictStrategy, FailoverMode, FailoverTrigger, SchemaChangeType, SchemaStatus, Topology,
};
use crate::error::{EngineError, EngineResult};
use crate::infrastructure::monitor::{spawn_monitor, MonitorHandle};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Conflicts recorded within this window count as "open" in health output.
const OPEN_CONFLICT_WINDOW_MS: u64 = 60_000;

/// Estimated on-disk footprint per captured snapshot table.
const SNAPSHOT_TABLE_SIZE_EST: u64 = 64 * 1024;

/// A failover whose completion is still scheduled.
struct PendingFailover {
    event_id: String,
    handle: JoinHandle<()>,
}

struct EngineInner {
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    telemetry: Arc<dyn TelemetrySource>,
    ddl_applier: Arc<dyn DdlApplier>,
    conflict_hook: Option<Arc<dyn ConflictHook>>,
    metrics: Arc<dyn MetricsStore>,
    regions: DashMap<String, Region>,
    groups: DashMap<String, ReplicationGroup>,
    health: DashMap<String, HealthStatus>,
    conflicts: DashMap<String, Vec<ConflictRecord>>,
    failovers: DashMap<String, Vec<FailoverEvent>>,
    pending_failovers: DashMap<String, PendingFailover>,
    snapshots: DashMap<String, Vec<ReplicationSnapshot>>,
    schema_changes: DashMap<String, Vec<SchemaChange>>,
    monitors: DashMap<String, MonitorHandle>,
}

/// Cross-region replication engine.
///
/// Cloning is cheap and shares the underlying state.
#[derive(Clone)]
pub struct ReplicationEngine {
    inner: Arc<EngineInner>,
}

impl ReplicationEngine {
    /// Create an engine with the given configuration and collaborators.
    pub fn new(
        config: EngineConfig,
        telemetry: Arc<dyn TelemetrySource>,
        ddl_applier: Arc<dyn DdlApplier>,
    ) -> EngineResult<Self> {
        config
            .validate()
            .map_err(|e| EngineError::InvalidConfiguration(e.to_string()))?;

        let retention = config.metrics_retention;
        Ok(Self {
            inner: Arc::new(EngineInner {
                config,
                clock: Arc::new(SystemClock),
                telemetry,
                ddl_applier,
                conflict_hook: None,
                metrics: Arc::new(DashMapMetricsStore::new(retention)),
                regions: DashMap::new(),
                groups: DashMap::new(),
                health: DashMap::new(),
                conflicts: DashMap::new(),
                failovers: DashMap::new(),
                pending_failovers: DashMap::new(),
                snapshots: DashMap::new(),
                schema_changes: DashMap::new(),
                monitors: DashMap::new(),
            }),
        })
    }

    /// Install an external conflict resolution hook.
    ///
    /// Only meaningful before groups start recording conflicts.
    pub fn with_conflict_hook(mut self, hook: Arc<dyn ConflictHook>) -> Self {
        let inner = Arc::get_mut(&mut self.inner);
        match inner {
            Some(inner) => inner.conflict_hook = Some(hook),
            None => tracing::warn!("conflict hook ignored: engine already shared"),
        }
        self
    }

    /// Replace the wall clock (tests use a manual clock).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        let inner = Arc::get_mut(&mut self.inner);
        match inner {
            Some(inner) => inner.clock = clock,
            None => tracing::warn!("clock ignored: engine already shared"),
        }
        self
    }

    // ===== Region registry =====

    /// Register a region definition.
    ///
    /// When the caller supplies no latency estimate, one is derived from a
    /// lookup table of well-known region identifiers. Duplicate ids are
    /// rejected; regions are immutable once registered.
    pub fn register_region(&self, mut region: Region) -> EngineResult<Region> {
        if region.id.is_empty() {
            return Err(EngineError::InvalidConfiguration(
                "region id must not be empty".to_string(),
            ));
        }
        if region.estimated_latency_ms == 0 {
            region.estimated_latency_ms = Region::default_latency_ms(&region.id);
        }

        match self.inner.regions.entry(region.id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(EngineError::InvalidConfiguration(
                format!("region already registered: {}", region.id),
            )),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                tracing::info!(
                    "registered region {} provider={} latency={}ms",
                    region.id,
                    region.provider,
                    region.estimated_latency_ms
                );
                slot.insert(region.clone());
                Ok(region)
            }
        }
    }

    /// Look up a region by id.
    pub fn get_region(&self, id: &str) -> EngineResult<Region> {
        self.inner
            .regions
            .get(id)
            .map(|r| r.clone())
            .ok_or_else(|| EngineError::RegionNotFound(id.to_string()))
    }

    /// All registered regions.
    pub fn list_regions(&self) -> Vec<Region> {
        let mut regions: Vec<Region> = self.inner.regions.iter().map(|r| r.clone()).collect();
        regions.sort_by(|a, b| a.id.cmp(&b.id));
        regions
    }

    // ===== Group lifecycle =====

    /// Create a replication group and start its monitor.
    pub fn create_group(&self, spec: GroupSpec) -> EngineResult<ReplicationGroup> {
        self.validate_spec(&spec)?;

        let group = ReplicationGroup::from_spec(spec);
        match self.inner.groups.entry(group.id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(EngineError::InvalidConfiguration(format!(
                    "group already exists: {}",
                    group.id
                )))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(group.clone());
            }
        }

        self.start_monitor(&group.id);
        tracing::info!(
            "created group {} topology={} primary={} replicas={:?}",
            group.id,
            group.topology,
            group.primary_region_id,
            group.replica_region_ids
        );
        Ok(group)
    }

    fn validate_spec(&self, spec: &GroupSpec) -> EngineResult<()> {
        if spec.id.is_empty() {
            return Err(EngineError::InvalidConfiguration(
                "group id must not be empty".to_string(),
            ));
        }
        if !self.inner.regions.contains_key(&spec.primary_region_id) {
            return Err(EngineError::InvalidConfiguration(format!(
                "unknown primary region: {}",
                spec.primary_region_id
            )));
        }
        for replica in &spec.replica_region_ids {
            if !self.inner.regions.contains_key(replica) {
                return Err(EngineError::InvalidConfiguration(format!(
                    "unknown replica region: {}",
                    replica
                )));
            }
        }
        if spec
            .replica_region_ids
            .contains(&spec.primary_region_id)
        {
            return Err(EngineError::InvalidConfiguration(format!(
                "primary region {} also listed as replica",
                spec.primary_region_id
            )));
        }
        let mut seen = std::collections::HashSet::new();
        for replica in &spec.replica_region_ids {
            if !seen.insert(replica) {
                return Err(EngineError::InvalidConfiguration(format!(
                    "duplicate replica region: {}",
                    replica
                )));
            }
        }
        if spec.topology == Topology::MultiMaster && spec.conflict_strategy == ConflictStrategy::None
        {
            return Err(EngineError::InvalidConfiguration(
                "multi_master topology requires a conflict strategy".to_string(),
            ));
        }
        Ok(())
    }

    /// Merge allowed mutable fields into a group.
    ///
    /// `status` is derived by health evaluation and cannot be written here;
    /// [`GroupUpdate`] carries no such field.
    pub fn update_group(&self, id: &str, update: GroupUpdate) -> EngineResult<ReplicationGroup> {
        let mut group = self
            .inner
            .groups
            .get_mut(id)
            .ok_or_else(|| EngineError::GroupNotFound(id.to_string()))?;
        group.apply_update(update);
        Ok(group.clone())
    }

    /// Look up a group by id.
    pub fn get_group(&self, id: &str) -> EngineResult<ReplicationGroup> {
        self.inner
            .groups
            .get(id)
            .map(|g| g.clone())
            .ok_or_else(|| EngineError::GroupNotFound(id.to_string()))
    }

    /// All groups.
    pub fn list_groups(&self) -> Vec<ReplicationGroup> {
        let mut groups: Vec<ReplicationGroup> =
            self.inner.groups.iter().map(|g| g.clone()).collect();
        groups.sort_by(|a, b| a.id.cmp(&b.id));
        groups
    }

    // ===== Monitoring =====

    fn start_monitor(&self, group_id: &str) {
        let engine = self.clone();
        let gid = group_id.to_string();
        let handle = spawn_monitor(
            group_id.to_string(),
            self.inner.config.tick_interval,
            move || {
                let engine = engine.clone();
                let gid = gid.clone();
                async move {
                    if let Err(e) = engine.tick_group(&gid).await {
                        tracing::warn!("monitor tick for {} failed: {}", gid, e);
                    }
                }
            },
        );
        self.inner.monitors.insert(group_id.to_string(), handle);
    }

    /// Whether a group's monitor is currently running.
    pub fn is_monitoring(&self, group_id: &str) -> bool {
        self.inner
            .monitors
            .get(group_id)
            .map(|m| m.is_running())
            .unwrap_or(false)
    }

    /// Stop a group's monitor.
    ///
    /// Idempotent; once this returns, no further tick fires for the group.
    pub async fn stop_monitoring(&self, group_id: &str) -> EngineResult<()> {
        if !self.inner.groups.contains_key(group_id) {
            return Err(EngineError::GroupNotFound(group_id.to_string()));
        }
        if let Some((_, monitor)) = self.inner.monitors.remove(group_id) {
            monitor.stop().await;
            tracing::info!("stopped monitoring group {}", group_id);
        }
        Ok(())
    }

    /// Stop every group monitor and cancel scheduled failover completions.
    pub async fn shutdown(&self) {
        let group_ids: Vec<String> = self
            .inner
            .monitors
            .iter()
            .map(|m| m.key().clone())
            .collect();
        for group_id in group_ids {
            if let Some((_, monitor)) = self.inner.monitors.remove(&group_id) {
                monitor.stop().await;
            }
        }
        for entry in self.inner.pending_failovers.iter() {
            entry.value().handle.abort();
        }
        self.inner.pending_failovers.clear();
        tracing::info!("replication engine shut down");
    }

    /// Run one monitoring pass for a group: collect a sample from every
    /// region, evaluate health over the complete set, and trigger failover
    /// for automatic-mode groups left offline.
    pub async fn tick_group(&self, group_id: &str) -> EngineResult<HealthStatus> {
        let group = self.get_group(group_id)?;
        let now = self.inner.clock.now_ms();

        // Per-region reads are independent and run concurrently, each under
        // the collection timeout so one slow region cannot stall the tick.
        let collection_timeout = self.inner.config.collection_timeout;
        let reads = group.all_region_ids().into_iter().map(|region_id| {
            let telemetry = self.inner.telemetry.clone();
            let gid = group.id.clone();
            let is_primary = region_id == group.primary_region_id;
            async move {
                let outcome =
                    tokio::time::timeout(collection_timeout, telemetry.sample(&gid, &region_id))
                        .await;
                let sample = match outcome {
                    Ok(Ok(mut sample)) => {
                        // Lag is measured against the primary, which by
                        // definition has none.
                        if is_primary {
                            sample.lag_ms = 0;
                        }
                        Some(sample)
                    }
                    Ok(Err(e)) => {
                        tracing::warn!("telemetry for {}/{} failed: {}", gid, region_id, e);
                        None
                    }
                    Err(_) => {
                        tracing::warn!("telemetry for {}/{} timed out", gid, region_id);
                        None
                    }
                };
                (region_id, sample)
            }
        });
        let collected = futures::future::join_all(reads).await;

        for (region_id, sample) in &collected {
            if let Some(sample) = sample {
                self.inner.metrics.append(ReplicationMetrics {
                    group_id: group.id.clone(),
                    region_id: region_id.clone(),
                    sampled_at_ms: now,
                    lag_ms: sample.lag_ms,
                    writes_per_sec: sample.writes_per_sec,
                    reads_per_sec: sample.reads_per_sec,
                    bytes_per_sec: sample.bytes_per_sec,
                    conflicts_per_min: self.conflicts_per_min(&group.id, region_id, now),
                    error_rate: sample.error_rate,
                    pending_ops: sample.pending_ops,
                });
            }
        }

        // Evaluate over the full region set of this tick; a region whose
        // read failed falls back to its last retained sample, which the
        // staleness window ages into offline.
        let latest: Vec<(String, Option<ReplicationMetrics>)> = group
            .all_region_ids()
            .into_iter()
            .map(|region_id| {
                let latest = self.inner.metrics.latest(&group.id, &region_id);
                (region_id, latest)
            })
            .collect();

        let open_conflicts = self.open_conflicts(&group.id, now);
        let staleness_ms = self.inner.config.staleness_window.as_millis() as u64;
        let health =
            HealthEvaluator::evaluate(&group, &latest, open_conflicts, now, staleness_ms);

        if let Some(mut stored) = self.inner.groups.get_mut(&group.id) {
            stored.status = health.overall;
        }
        self.inner.health.insert(group.id.clone(), health.clone());

        // An automatic-mode group must never be left offline without an
        // attempted recovery.
        if health.failover_pending && group.failover_mode == FailoverMode::Automatic {
            match self
                .trigger_failover(&group.id, FailoverTrigger::HealthCheck, None)
                .await?
            {
                FailoverOutcome::Promoted(event) => {
                    tracing::warn!(
                        "automatic failover for {}: {} -> {}",
                        group.id,
                        event.previous_primary,
                        event.new_primary
                    );
                }
                FailoverOutcome::NoEligibleCandidate { reason, .. } => {
                    tracing::warn!("automatic failover for {} not possible: {}", group.id, reason);
                }
            }
        }

        Ok(health)
    }

    /// Latest health evaluation for a group, if any tick has run.
    pub fn latest_health(&self, group_id: &str) -> Option<HealthStatus> {
        self.inner.health.get(group_id).map(|h| h.clone())
    }

    /// Retained sample history for one (group, region) pair, oldest first.
    pub fn metrics_history(&self, group_id: &str, region_id: &str) -> Vec<ReplicationMetrics> {
        self.inner.metrics.history(group_id, region_id)
    }

    fn conflicts_per_min(&self, group_id: &str, region_id: &str, now_ms: u64) -> f64 {
        self.inner
            .conflicts
            .get(group_id)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| {
                        (r.region_a == region_id || r.region_b == region_id)
                            && now_ms.saturating_sub(r.recorded_at_ms) <= OPEN_CONFLICT_WINDOW_MS
                    })
                    .count() as f64
            })
            .unwrap_or(0.0)
    }

    fn open_conflicts(&self, group_id: &str, now_ms: u64) -> u64 {
        self.inner
            .conflicts
            .get(group_id)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| now_ms.saturating_sub(r.recorded_at_ms) <= OPEN_CONFLICT_WINDOW_MS)
                    .count() as u64
            })
            .unwrap_or(0)
    }

    // ===== Failover =====

    /// Promote the best replica of a group to primary.
    ///
    /// The candidate is the primary-eligible replica with the lowest
    /// currently observed lag; ties keep the earlier replica-list entry, and
    /// replicas with no retained sample are skipped. Lag is the best
    /// available proxy for "least likely to lose data" even though it cannot
    /// rule out concurrent writes during a partition.
    ///
    /// A second trigger while a prior failover is still completing
    /// supersedes it: the earlier event is finalized immediately with its
    /// elapsed time and the new failover proceeds.
    pub async fn trigger_failover(
        &self,
        group_id: &str,
        trigger: FailoverTrigger,
        notes: Option<String>,
    ) -> EngineResult<FailoverOutcome> {
        let group = self.get_group(group_id)?;
        let now = self.inner.clock.now_ms();

        let mut best: Option<(String, u64)> = None;
        for replica_id in &group.replica_region_ids {
            let eligible = self
                .inner
                .regions
                .get(replica_id)
                .map(|r| r.primary_eligible)
                .unwrap_or(false);
            if !eligible {
                continue;
            }
            // A replica that has never been sampled cannot be judged safe to
            // promote; skip it until telemetry arrives.
            let lag = match self.inner.metrics.latest(&group.id, replica_id) {
                Some(sample) => sample.lag_ms,
                None => continue,
            };
            let better = match &best {
                None => true,
                Some((_, best_lag)) => lag < *best_lag,
            };
            if better {
                best = Some((replica_id.clone(), lag));
            }
        }

        let (winner, winner_lag) = match best {
            Some(best) => best,
            None => {
                tracing::warn!("failover for {}: no primary-eligible replica", group.id);
                return Ok(FailoverOutcome::NoEligibleCandidate {
                    group_id: group.id.clone(),
                    reason: "no primary-eligible replica with observed telemetry".to_string(),
                });
            }
        };

        if let Some((_, pending)) = self.inner.pending_failovers.remove(&group.id) {
            pending.handle.abort();
            self.finalize_failover(&group.id, &pending.event_id);
            tracing::info!(
                "failover for {} supersedes in-flight event {}",
                group.id,
                pending.event_id
            );
        }

        // Swap under the entry lock: readers never observe a group with zero
        // or duplicate primaries.
        let previous_primary = {
            let mut stored = self
                .inner
                .groups
                .get_mut(&group.id)
                .ok_or_else(|| EngineError::GroupNotFound(group.id.clone()))?;
            let previous = stored.primary_region_id.clone();
            stored.replica_region_ids.retain(|r| r != &winner);
            stored.replica_region_ids.push(previous.clone());
            stored.primary_region_id = winner.clone();
            previous
        };

        let rpo_ms = winner_lag;
        let writes_per_sec = self
            .inner
            .metrics
            .latest(&group.id, &previous_primary)
            .map(|s| s.writes_per_sec)
            .or_else(|| {
                self.inner
                    .metrics
                    .latest(&group.id, &winner)
                    .map(|s| s.writes_per_sec)
            })
            .unwrap_or(0.0);
        let data_loss_records = ((rpo_ms as f64 / 1000.0) * writes_per_sec).ceil() as u64;

        let event = FailoverEvent {
            id: Uuid::new_v4().to_string(),
            group_id: group.id.clone(),
            trigger,
            previous_primary: previous_primary.clone(),
            new_primary: winner.clone(),
            rto_ms: self.inner.config.failover_rto.as_millis() as u64,
            rpo_ms,
            data_loss_records,
            notes,
            triggered_at_ms: now,
            completed: false,
            completed_at_ms: None,
        };
        self.inner
            .failovers
            .entry(group.id.clone())
            .or_default()
            .push(event.clone());

        tracing::warn!(
            "failover triggered for {} ({}): {} -> {} rpo={}ms est_loss={}",
            group.id,
            trigger,
            previous_primary,
            winner,
            rpo_ms,
            data_loss_records
        );

        // Completion models the gap between "decision made" and "traffic
        // fully cut over"; it is cancellable by a superseding trigger.
        let engine = self.clone();
        let gid = group.id.clone();
        let event_id = event.id.clone();
        let rto = self.inner.config.failover_rto;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(rto).await;
            engine.inner.pending_failovers.remove(&gid);
            engine.finalize_failover(&gid, &event_id);
        });
        self.inner.pending_failovers.insert(
            group.id.clone(),
            PendingFailover {
                event_id: event.id.clone(),
                handle,
            },
        );

        Ok(FailoverOutcome::Promoted(event))
    }

    /// Mark a failover event completed, once.
    fn finalize_failover(&self, group_id: &str, event_id: &str) {
        let now = self.inner.clock.now_ms();
        if let Some(mut events) = self.inner.failovers.get_mut(group_id) {
            if let Some(event) = events.iter_mut().find(|e| e.id == event_id) {
                if !event.completed {
                    event.completed = true;
                    event.completed_at_ms = Some(now);
                    event.rto_ms = now.saturating_sub(event.triggered_at_ms);
                    tracing::info!(
                        "failover {} for {} completed rto={}ms",
                        event_id,
                        group_id,
                        event.rto_ms
                    );
                }
            }
        }
    }

    /// Failover history for a group, oldest first.
    pub fn failover_history(&self, group_id: &str) -> Vec<FailoverEvent> {
        self.inner
            .failovers
            .get(group_id)
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    // ===== Conflict resolution =====

    /// Resolve a write conflict under the group's configured strategy and
    /// append it to the audit trail. Every resolution is recorded, no
    /// exceptions: the history is the primary tool for diagnosing data
    /// divergence after the fact.
    pub fn record_conflict(&self, input: ConflictInput) -> EngineResult<ConflictRecord> {
        let group = self.get_group(&input.group_id)?;

        let resolution = ConflictResolver::resolve(
            group.conflict_strategy,
            &input.value_a,
            input.ts_a_ms,
            &input.value_b,
            input.ts_b_ms,
            self.inner.conflict_hook.as_deref(),
        );

        let record = ConflictRecord {
            id: Uuid::new_v4().to_string(),
            group_id: input.group_id,
            table: input.table,
            primary_key: input.primary_key,
            region_a: input.region_a,
            value_a: input.value_a,
            ts_a_ms: input.ts_a_ms,
            region_b: input.region_b,
            value_b: input.value_b,
            ts_b_ms: input.ts_b_ms,
            strategy: group.conflict_strategy,
            resolved_value: resolution.value,
            resolved_automatically: resolution.automatic,
            recorded_at_ms: self.inner.clock.now_ms(),
        };

        tracing::debug!(
            "conflict on {}/{} in {} resolved via {}",
            record.table,
            record.primary_key,
            record.group_id,
            record.strategy
        );

        self.inner
            .conflicts
            .entry(record.group_id.clone())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    /// Conflict audit trail for a group, oldest first.
    pub fn conflict_history(&self, group_id: &str) -> Vec<ConflictRecord> {
        self.inner
            .conflicts
            .get(group_id)
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    // ===== Schema propagation =====

    /// Apply a DDL statement to every region of a group.
    ///
    /// The change is `Applied` only when zero regions fail; schema divergence
    /// is treated as equally dangerous no matter how many regions diverge.
    pub async fn propagate_schema_change(
        &self,
        group_id: &str,
        table: &str,
        change_type: SchemaChangeType,
        ddl: &str,
    ) -> EngineResult<SchemaChange> {
        let group = self.get_group(group_id)?;

        let applications = group.all_region_ids().into_iter().map(|region_id| {
            let applier = self.inner.ddl_applier.clone();
            let ddl = ddl.to_string();
            async move {
                let result = applier.apply(&region_id, &ddl).await;
                (region_id, result)
            }
        });
        let results = futures::future::join_all(applications).await;

        let mut succeeded_regions = Vec::new();
        let mut failed_regions = Vec::new();
        for (region_id, result) in results {
            match result {
                Ok(()) => succeeded_regions.push(region_id),
                Err(e) => {
                    tracing::warn!("schema change failed in {}: {}", region_id, e);
                    failed_regions.push(region_id);
                }
            }
        }

        let status = if failed_regions.is_empty() {
            SchemaStatus::Applied
        } else {
            SchemaStatus::Failed
        };

        let change = SchemaChange {
            id: Uuid::new_v4().to_string(),
            group_id: group.id.clone(),
            table: table.to_string(),
            change_type,
            ddl: ddl.to_string(),
            succeeded_regions,
            failed_regions,
            status,
            applied_at_ms: self.inner.clock.now_ms(),
        };

        tracing::info!(
            "schema change {} on {}/{} status={}",
            change.id,
            change.group_id,
            change.table,
            change.status
        );

        self.inner
            .schema_changes
            .entry(group.id)
            .or_default()
            .push(change.clone());
        Ok(change)
    }

    /// Schema change history for a group, oldest first.
    pub fn schema_history(&self, group_id: &str) -> Vec<SchemaChange> {
        self.inner
            .schema_changes
            .get(group_id)
            .map(|changes| changes.clone())
            .unwrap_or_default()
    }

    // ===== Snapshots =====

    /// Capture a point-in-time consistent snapshot of a table subset.
    ///
    /// The snapshot is ready immediately; its consistency point sits
    /// slightly before the creation timestamp, and it expires after the
    /// configured retention horizon.
    pub fn create_snapshot(
        &self,
        group_id: &str,
        tables: Vec<String>,
    ) -> EngineResult<ReplicationSnapshot> {
        let group = self.get_group(group_id)?;
        if tables.is_empty() {
            return Err(EngineError::InvalidConfiguration(
                "snapshot requires at least one table".to_string(),
            ));
        }

        let now = self.inner.clock.now_ms();
        let consistent_at_ms =
            now.saturating_sub(self.inner.config.snapshot_consistency_skew.as_millis() as u64);

        let mut table_checksums = BTreeMap::new();
        for table in &tables {
            let checksum = crc32fast::hash(
                format!("{}/{}/{}", group.id, table, consistent_at_ms).as_bytes(),
            );
            table_checksums.insert(table.clone(), checksum);
        }

        let snapshot = ReplicationSnapshot {
            id: Uuid::new_v4().to_string(),
            group_id: group.id.clone(),
            created_at_ms: now,
            consistent_at_ms,
            size_bytes: tables.len() as u64 * SNAPSHOT_TABLE_SIZE_EST,
            tables,
            table_checksums,
            expires_at_ms: now + self.inner.config.snapshot_retention.as_millis() as u64,
        };

        tracing::info!(
            "snapshot {} for {} captured {} tables",
            snapshot.id,
            snapshot.group_id,
            snapshot.tables.len()
        );

        self.inner
            .snapshots
            .entry(group.id)
            .or_default()
            .push(snapshot.clone());
        Ok(snapshot)
    }

    /// Snapshots taken for a group, oldest first.
    pub fn snapshots(&self, group_id: &str) -> Vec<ReplicationSnapshot> {
        self.inner
            .snapshots
            .get(group_id)
            .map(|snapshots| snapshots.clone())
            .unwrap_or_default()
    }

    /// The wall clock used by this engine.
    pub fn now_ms(&self) -> u64 {
        self.inner.clock.now_ms()
    }
}
