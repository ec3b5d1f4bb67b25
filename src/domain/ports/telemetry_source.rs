//! Telemetry Source Port
//!
//! Defines the interface to the per-region data-shipping primitive that
//! reports replication progress. The engine coordinates propagation; it never
//! measures it itself.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One raw telemetry reading for a (group, region) pair.
///
/// A legitimate all-zero sample is distinct from a failed read: failures are
/// reported through [`TelemetryError`], never as zeroed samples.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub lag_ms: u64,
    pub writes_per_sec: f64,
    pub reads_per_sec: f64,
    pub bytes_per_sec: f64,
    pub error_rate: f64,
    pub pending_ops: u64,
}

/// Why a telemetry read produced no sample.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TelemetryError {
    #[error("telemetry read timed out")]
    Timeout,
    #[error("region unreachable: {0}")]
    Unreachable(String),
}

/// Source of per-region replication telemetry.
///
/// This is an outbound port; implementations may poll a WAL shipper, a
/// managed database API, or (in tests and demos) a simulator.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Read the current telemetry for one region of a group.
    async fn sample(&self, group_id: &str, region_id: &str)
        -> Result<TelemetrySample, TelemetryError>;
}
