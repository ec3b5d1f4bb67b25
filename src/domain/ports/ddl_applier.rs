//! DDL Applier Port
//!
//! Defines the interface for applying a schema change statement in a single
//! region. Schema propagation fans this out across a group's regions.

use async_trait::async_trait;

/// A DDL statement failed to apply in one region.
#[derive(Debug, Clone, thiserror::Error)]
#[error("ddl failed in {region_id}: {reason}")]
pub struct DdlError {
    pub region_id: String,
    pub reason: String,
}

/// Applies DDL statements region by region.
#[async_trait]
pub trait DdlApplier: Send + Sync {
    /// Apply a DDL statement in the given region.
    async fn apply(&self, region_id: &str, ddl: &str) -> Result<(), DdlError>;
}
