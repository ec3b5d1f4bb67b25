//! Simulated Telemetry Source
//!
//! A stand-in for a real per-region data-shipping primitive, producing
//! jittered telemetry around a configurable base lag. Used by the demo
//! binary and by tests that don't script exact samples.

use crate::domain::ports::{TelemetryError, TelemetrySample, TelemetrySource};
use async_trait::async_trait;
use rand::Rng;

/// Telemetry simulator with uniform jitter.
pub struct SimulatedTelemetrySource {
    base_lag_ms: u64,
    jitter_ms: u64,
}

impl SimulatedTelemetrySource {
    /// Create a simulator centered on `base_lag_ms` with +/- `jitter_ms`.
    pub fn new(base_lag_ms: u64, jitter_ms: u64) -> Self {
        Self {
            base_lag_ms,
            jitter_ms,
        }
    }
}

impl Default for SimulatedTelemetrySource {
    fn default() -> Self {
        Self::new(50, 30)
    }
}

#[async_trait]
impl TelemetrySource for SimulatedTelemetrySource {
    async fn sample(
        &self,
        _group_id: &str,
        _region_id: &str,
    ) -> Result<TelemetrySample, TelemetryError> {
        let mut rng = rand::thread_rng();

        let jitter = if self.jitter_ms == 0 {
            0
        } else {
            rng.gen_range(0..=self.jitter_ms * 2)
        };
        let lag_ms = (self.base_lag_ms + jitter).saturating_sub(self.jitter_ms);

        Ok(TelemetrySample {
            lag_ms,
            writes_per_sec: rng.gen_range(50.0..500.0),
            reads_per_sec: rng.gen_range(200.0..2000.0),
            bytes_per_sec: rng.gen_range(10_000.0..1_000_000.0),
            error_rate: rng.gen_range(0.0..0.01),
            pending_ops: rng.gen_range(0..100),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lag_stays_within_jitter_band() {
        let source = SimulatedTelemetrySource::new(100, 20);

        for _ in 0..50 {
            let sample = source.sample("orders", "us-west").await.unwrap();
            assert!(sample.lag_ms >= 80, "lag {} below band", sample.lag_ms);
            assert!(sample.lag_ms <= 120, "lag {} above band", sample.lag_ms);
        }
    }

    #[tokio::test]
    async fn test_zero_jitter_is_exact() {
        let source = SimulatedTelemetrySource::new(42, 0);
        let sample = source.sample("orders", "us-west").await.unwrap();
        assert_eq!(sample.lag_ms, 42);
    }
}
