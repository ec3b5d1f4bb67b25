//! Health Evaluator Service
//!
//! Pure domain logic for classifying a group's regions from their most
//! recent telemetry samples. This service has NO external dependencies.

use crate::domain::entities::{HealthStatus, RegionHealth, ReplicationGroup, ReplicationMetrics};
use crate::domain::value_objects::{FailoverMode, HealthState};

/// Health evaluator for replication groups.
///
/// Classification per region, from the most recent sample only:
/// - no sample within the staleness window => offline
/// - lag > 2x the group's SLA             => degraded
/// - lag > the group's SLA                => lagging
/// - otherwise                            => healthy
///
/// The group-level status is the worst of the per-region statuses, all
/// computed from the same evaluation pass.
pub struct HealthEvaluator;

impl HealthEvaluator {
    /// Classify one region from its latest sample.
    pub fn classify_region(
        region_id: &str,
        latest: Option<&ReplicationMetrics>,
        sla_max_lag_ms: u64,
        now_ms: u64,
        staleness_window_ms: u64,
    ) -> RegionHealth {
        let (status, lag_ms, last_seen_ms) = match latest {
            None => (HealthState::Offline, 0, None),
            Some(sample) => {
                let age = now_ms.saturating_sub(sample.sampled_at_ms);
                let status = if age > staleness_window_ms {
                    HealthState::Offline
                } else if sample.lag_ms > sla_max_lag_ms.saturating_mul(2) {
                    HealthState::Degraded
                } else if sample.lag_ms > sla_max_lag_ms {
                    HealthState::Lagging
                } else {
                    HealthState::Healthy
                };
                (status, sample.lag_ms, Some(sample.sampled_at_ms))
            }
        };

        RegionHealth {
            region_id: region_id.to_string(),
            status,
            lag_ms,
            last_seen_ms,
        }
    }

    /// Evaluate a group from the latest sample of every region.
    ///
    /// `latest_samples` must carry one entry per region of the group (primary
    /// first), with `None` where no sample has ever been observed, so the
    /// aggregate never mixes regions from different ticks.
    pub fn evaluate(
        group: &ReplicationGroup,
        latest_samples: &[(String, Option<ReplicationMetrics>)],
        open_conflicts: u64,
        now_ms: u64,
        staleness_window_ms: u64,
    ) -> HealthStatus {
        let regions: Vec<RegionHealth> = latest_samples
            .iter()
            .map(|(region_id, latest)| {
                Self::classify_region(
                    region_id,
                    latest.as_ref(),
                    group.sla_max_lag_ms,
                    now_ms,
                    staleness_window_ms,
                )
            })
            .collect();

        let overall = regions
            .iter()
            .map(|r| r.status)
            .max()
            .unwrap_or(HealthState::Healthy);

        // Breach detection is independent of the discrete buckets so callers
        // can tell "technically healthy but at risk" from hard breaches.
        let max_observed_lag = latest_samples
            .iter()
            .filter_map(|(_, latest)| latest.as_ref().map(|s| s.lag_ms))
            .max()
            .unwrap_or(0);
        let sla_breached = max_observed_lag > group.sla_max_lag_ms;

        let any_offline = regions.iter().any(|r| r.status == HealthState::Offline);
        let failover_pending = any_offline && group.failover_mode != FailoverMode::Manual;

        HealthStatus {
            group_id: group.id.clone(),
            overall,
            regions,
            sla_breached,
            split_brain_suspected: false,
            open_conflicts,
            failover_pending,
            evaluated_at_ms: now_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::GroupSpec;
    use crate::domain::value_objects::{ConflictStrategy, ConsistencyLevel, Topology};

    const STALENESS_MS: u64 = 30_000;

    fn group_with(mode: FailoverMode, sla: u64) -> ReplicationGroup {
        ReplicationGroup::from_spec(GroupSpec {
            id: "orders".to_string(),
            tenant_id: "acme".to_string(),
            topology: Topology::PrimaryReplica,
            primary_region_id: "us-east".to_string(),
            replica_region_ids: vec!["us-west".to_string()],
            conflict_strategy: ConflictStrategy::LastWriteWins,
            consistency: ConsistencyLevel::BoundedStaleness,
            failover_mode: mode,
            sla_max_lag_ms: sla,
            included_tables: vec![],
            excluded_tables: vec![],
        })
    }

    fn sample(region_id: &str, lag_ms: u64, sampled_at_ms: u64) -> ReplicationMetrics {
        ReplicationMetrics {
            group_id: "orders".to_string(),
            region_id: region_id.to_string(),
            sampled_at_ms,
            lag_ms,
            writes_per_sec: 100.0,
            reads_per_sec: 500.0,
            bytes_per_sec: 1024.0,
            conflicts_per_min: 0.0,
            error_rate: 0.0,
            pending_ops: 0,
        }
    }

    // ===== Region Classification Tests =====

    #[test]
    fn test_classify_no_sample_is_offline() {
        let health = HealthEvaluator::classify_region("us-west", None, 200, 1000, STALENESS_MS);
        assert_eq!(health.status, HealthState::Offline);
        assert_eq!(health.last_seen_ms, None);
    }

    #[test]
    fn test_classify_stale_sample_is_offline() {
        let s = sample("us-west", 10, 1000);
        let now = 1000 + STALENESS_MS + 1;
        let health = HealthEvaluator::classify_region("us-west", Some(&s), 200, now, STALENESS_MS);
        assert_eq!(health.status, HealthState::Offline);
        assert_eq!(health.last_seen_ms, Some(1000));
    }

    #[test]
    fn test_classify_lag_buckets() {
        let now = 10_000;
        let cases = vec![
            (0, HealthState::Healthy),
            (200, HealthState::Healthy),
            (201, HealthState::Lagging),
            (400, HealthState::Lagging),
            (401, HealthState::Degraded),
            (10_000, HealthState::Degraded),
        ];

        for (lag, expected) in cases {
            let s = sample("us-west", lag, now);
            let health =
                HealthEvaluator::classify_region("us-west", Some(&s), 200, now, STALENESS_MS);
            assert_eq!(health.status, expected, "lag={}", lag);
        }
    }

    // ===== Group Evaluation Tests =====

    #[test]
    fn test_overall_is_worst_case() {
        let group = group_with(FailoverMode::Manual, 200);
        let now = 10_000;

        let samples = vec![
            ("us-east".to_string(), Some(sample("us-east", 0, now))),
            ("us-west".to_string(), Some(sample("us-west", 450, now))),
        ];

        let health = HealthEvaluator::evaluate(&group, &samples, 0, now, STALENESS_MS);
        assert_eq!(health.overall, HealthState::Degraded);
    }

    #[test]
    fn test_all_healthy_group_healthy() {
        let group = group_with(FailoverMode::Manual, 200);
        let now = 10_000;

        let samples = vec![
            ("us-east".to_string(), Some(sample("us-east", 0, now))),
            ("us-west".to_string(), Some(sample("us-west", 50, now))),
        ];

        let health = HealthEvaluator::evaluate(&group, &samples, 0, now, STALENESS_MS);
        assert_eq!(health.overall, HealthState::Healthy);
        assert!(!health.sla_breached);
        assert!(!health.failover_pending);
    }

    #[test]
    fn test_sla_breach_with_lagging_status() {
        let group = group_with(FailoverMode::Manual, 100);
        let now = 10_000;

        let samples = vec![
            ("us-east".to_string(), Some(sample("us-east", 0, now))),
            ("us-west".to_string(), Some(sample("us-west", 150, now))),
        ];

        let health = HealthEvaluator::evaluate(&group, &samples, 0, now, STALENESS_MS);
        assert!(health.sla_breached);
        assert!(health.overall >= HealthState::Lagging);
    }

    #[test]
    fn test_offline_region_raises_failover_pending() {
        let group = group_with(FailoverMode::Automatic, 200);
        let now = 10_000;

        let samples = vec![
            ("us-east".to_string(), None),
            ("us-west".to_string(), Some(sample("us-west", 50, now))),
        ];

        let health = HealthEvaluator::evaluate(&group, &samples, 0, now, STALENESS_MS);
        assert_eq!(health.overall, HealthState::Offline);
        assert!(health.failover_pending);
    }

    #[test]
    fn test_manual_mode_never_pending() {
        let group = group_with(FailoverMode::Manual, 200);
        let now = 10_000;

        let samples = vec![
            ("us-east".to_string(), None),
            ("us-west".to_string(), None),
        ];

        let health = HealthEvaluator::evaluate(&group, &samples, 0, now, STALENESS_MS);
        assert_eq!(health.overall, HealthState::Offline);
        assert!(!health.failover_pending);
    }

    #[test]
    fn test_semi_automatic_mode_raises_pending() {
        let group = group_with(FailoverMode::SemiAutomatic, 200);
        let now = 10_000;

        let samples = vec![
            ("us-east".to_string(), Some(sample("us-east", 0, now))),
            ("us-west".to_string(), None),
        ];

        let health = HealthEvaluator::evaluate(&group, &samples, 0, now, STALENESS_MS);
        assert!(health.failover_pending);
    }

    #[test]
    fn test_split_brain_reserved_false() {
        let group = group_with(FailoverMode::Automatic, 200);
        let samples = vec![("us-east".to_string(), None), ("us-west".to_string(), None)];

        let health = HealthEvaluator::evaluate(&group, &samples, 0, 1000, STALENESS_MS);
        assert!(!health.split_brain_suspected);
    }

    #[test]
    fn test_open_conflicts_passed_through() {
        let group = group_with(FailoverMode::Manual, 200);
        let now = 10_000;
        let samples = vec![("us-east".to_string(), Some(sample("us-east", 0, now)))];

        let health = HealthEvaluator::evaluate(&group, &samples, 7, now, STALENESS_MS);
        assert_eq!(health.open_conflicts, 7);
    }
}
