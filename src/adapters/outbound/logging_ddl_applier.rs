//! Logging DDL Applier
//!
//! A DdlApplier that records statements via tracing and always succeeds.
//! Used by the demo binary; real deployments plug in a driver for their
//! regional databases.

use crate::domain::ports::{DdlApplier, DdlError};
use async_trait::async_trait;

/// DDL applier that only logs.
#[derive(Debug, Clone, Default)]
pub struct LoggingDdlApplier;

#[async_trait]
impl DdlApplier for LoggingDdlApplier {
    async fn apply(&self, region_id: &str, ddl: &str) -> Result<(), DdlError> {
        tracing::info!("applying ddl in {}: {}", region_id, ddl);
        Ok(())
    }
}
