//! Engine Error Taxonomy
//!
//! Configuration and lookup errors are surfaced synchronously to callers of
//! mutating operations. Telemetry and propagation failures are never raised
//! through this type; they are folded into status fields so monitoring keeps
//! running in degraded mode.

/// Errors returned by the replication engine's mutating operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// A region id was referenced that is not in the registry.
    #[error("region not found: {0}")]
    RegionNotFound(String),

    /// A replication group id was referenced that does not exist.
    #[error("replication group not found: {0}")]
    GroupNotFound(String),

    /// The supplied configuration is inconsistent (duplicate ids, primary
    /// listed as replica, topology/strategy mismatch, ...).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Convenience alias used throughout the engine.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::RegionNotFound("mars-1".to_string());
        assert_eq!(format!("{}", err), "region not found: mars-1");

        let err = EngineError::GroupNotFound("g1".to_string());
        assert_eq!(format!("{}", err), "replication group not found: g1");

        let err = EngineError::InvalidConfiguration("primary in replica list".to_string());
        assert_eq!(
            format!("{}", err),
            "invalid configuration: primary in replica list"
        );
    }

    #[test]
    fn test_error_eq() {
        assert_eq!(
            EngineError::GroupNotFound("g1".to_string()),
            EngineError::GroupNotFound("g1".to_string())
        );
        assert_ne!(
            EngineError::GroupNotFound("g1".to_string()),
            EngineError::RegionNotFound("g1".to_string())
        );
    }
}
