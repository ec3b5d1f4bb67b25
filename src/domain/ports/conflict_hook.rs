//! Conflict Hook Port
//!
//! Optional external resolution for groups configured with the custom
//! conflict strategy. When no hook is installed, custom resolution falls
//! back to last-write-wins.

use serde_json::Value;

/// External conflict resolution callback.
pub trait ConflictHook: Send + Sync {
    /// Produce the resolved value for two competing writes.
    fn resolve(&self, value_a: &Value, value_b: &Value, ts_a_ms: u64, ts_b_ms: u64) -> Value;
}
