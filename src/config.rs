//! Engine Configuration
//!
//! Timing and retention knobs for the replication engine. Values can be set
//! programmatically via the builder or loaded from `GEOSYNC_*` environment
//! variables in the composition root.

use std::time::Duration;

/// Configuration for the replication engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Interval between monitoring ticks per group (default: 5s)
    pub tick_interval: Duration,

    /// Timeout for a single region telemetry read. Must be shorter than the
    /// tick interval so one slow region cannot stall the monitor loop
    /// (default: 2s).
    pub collection_timeout: Duration,

    /// A region with no sample newer than this window is considered offline
    /// (default: 30s).
    pub staleness_window: Duration,

    /// Maximum number of metric samples retained per (group, region) pair.
    /// Oldest samples are evicted first (default: 1000).
    pub metrics_retention: usize,

    /// Estimated time for a failover to fully cut traffic over. The failover
    /// event is finalized after this interval elapses (default: 5s).
    pub failover_rto: Duration,

    /// How long snapshots remain readable before expiring (default: 7 days)
    pub snapshot_retention: Duration,

    /// Interval by which a snapshot's consistency point precedes its
    /// creation timestamp (default: 50ms).
    pub snapshot_consistency_skew: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(5),
            collection_timeout: Duration::from_secs(2),
            staleness_window: Duration::from_secs(30),
            metrics_retention: 1000,
            failover_rto: Duration::from_secs(5),
            snapshot_retention: Duration::from_secs(7 * 24 * 3600),
            snapshot_consistency_skew: Duration::from_millis(50),
        }
    }
}

impl EngineConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the monitoring tick interval.
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Set the per-region collection timeout.
    pub fn collection_timeout(mut self, timeout: Duration) -> Self {
        self.collection_timeout = timeout;
        self
    }

    /// Set the offline staleness window.
    pub fn staleness_window(mut self, window: Duration) -> Self {
        self.staleness_window = window;
        self
    }

    /// Set the per-(group, region) sample retention cap.
    pub fn metrics_retention(mut self, cap: usize) -> Self {
        self.metrics_retention = cap;
        self
    }

    /// Set the failover recovery-time interval.
    pub fn failover_rto(mut self, rto: Duration) -> Self {
        self.failover_rto = rto;
        self
    }

    /// Set the snapshot retention horizon.
    pub fn snapshot_retention(mut self, retention: Duration) -> Self {
        self.snapshot_retention = retention;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval.is_zero() {
            return Err(ConfigError::ZeroTickInterval);
        }
        if self.collection_timeout >= self.tick_interval {
            return Err(ConfigError::CollectionTimeoutTooLong);
        }
        if self.metrics_retention == 0 {
            return Err(ConfigError::ZeroMetricsRetention);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("tick_interval must be non-zero")]
    ZeroTickInterval,
    #[error("collection_timeout must be shorter than tick_interval")]
    CollectionTimeoutTooLong,
    #[error("metrics_retention must be non-zero")]
    ZeroMetricsRetention,
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .unwrap_or_default()
        .parse()
        .unwrap_or(default)
}

/// Load engine configuration from the environment.
pub fn load_config() -> anyhow::Result<EngineConfig> {
    let config = EngineConfig::new()
        .tick_interval(Duration::from_millis(env_u64("GEOSYNC_TICK_INTERVAL_MS", 5000)))
        .collection_timeout(Duration::from_millis(env_u64(
            "GEOSYNC_COLLECTION_TIMEOUT_MS",
            2000,
        )))
        .staleness_window(Duration::from_millis(env_u64(
            "GEOSYNC_STALENESS_WINDOW_MS",
            30_000,
        )))
        .metrics_retention(env_u64("GEOSYNC_METRICS_RETENTION", 1000) as usize)
        .failover_rto(Duration::from_millis(env_u64("GEOSYNC_FAILOVER_RTO_MS", 5000)))
        .snapshot_retention(Duration::from_secs(env_u64(
            "GEOSYNC_SNAPSHOT_RETENTION_SECS",
            7 * 24 * 3600,
        )));

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.tick_interval, Duration::from_secs(5));
        assert_eq!(config.collection_timeout, Duration::from_secs(2));
        assert_eq!(config.staleness_window, Duration::from_secs(30));
        assert_eq!(config.metrics_retention, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = EngineConfig::new()
            .tick_interval(Duration::from_millis(100))
            .collection_timeout(Duration::from_millis(40))
            .staleness_window(Duration::from_millis(500))
            .metrics_retention(10);

        assert_eq!(config.tick_interval, Duration::from_millis(100));
        assert_eq!(config.collection_timeout, Duration::from_millis(40));
        assert_eq!(config.staleness_window, Duration::from_millis(500));
        assert_eq!(config.metrics_retention, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_tick() {
        let config = EngineConfig::new().tick_interval(Duration::ZERO);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroTickInterval)
        ));
    }

    #[test]
    fn test_validate_collection_timeout_too_long() {
        let config = EngineConfig::new()
            .tick_interval(Duration::from_secs(1))
            .collection_timeout(Duration::from_secs(2));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::CollectionTimeoutTooLong)
        ));
    }

    #[test]
    fn test_validate_zero_retention() {
        let config = EngineConfig::new().metrics_retention(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroMetricsRetention)
        ));
    }
}
