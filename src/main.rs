//! geoSync - Cross-Region Replication Engine
//!
//! This is the composition root that wires together the engine with the
//! simulated collaborators and runs it until interrupted.

use geosync::adapters::outbound::{LoggingDdlApplier, SimulatedTelemetrySource};
use geosync::domain::entities::{GroupSpec, Region};
use geosync::domain::value_objects::{
    ConflictStrategy, ConsistencyLevel, FailoverMode, Topology,
};
use geosync::{load_config, ReplicationEngine};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let config = load_config()?;

    // Setup logging
    let log_level = if std::env::var("DEBUG").is_ok() {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    tracing::info!(
        "starting geoSync tick={}ms staleness={}ms",
        config.tick_interval.as_millis(),
        config.staleness_window.as_millis()
    );

    // ===== COMPOSITION ROOT =====
    // Real deployments plug in drivers for their WAL shippers and regional
    // databases; the demo runs against simulated collaborators.

    let telemetry = Arc::new(SimulatedTelemetrySource::new(60, 40));
    let ddl_applier = Arc::new(LoggingDdlApplier);

    let engine = ReplicationEngine::new(config, telemetry, ddl_applier)?;

    for (id, name) in [
        ("us-east", "US East"),
        ("us-west", "US West"),
        ("eu-west", "EU West"),
    ] {
        engine.register_region(Region {
            id: id.to_string(),
            name: name.to_string(),
            provider: "aws".to_string(),
            endpoint: format!("{}.example.net:5432", id),
            primary_eligible: true,
            priority: 1,
            compliance_zone: "global".to_string(),
            estimated_latency_ms: 0,
        })?;
    }

    engine.create_group(GroupSpec {
        id: "demo".to_string(),
        tenant_id: "demo-tenant".to_string(),
        topology: Topology::PrimaryReplica,
        primary_region_id: "us-east".to_string(),
        replica_region_ids: vec!["us-west".to_string(), "eu-west".to_string()],
        conflict_strategy: ConflictStrategy::LastWriteWins,
        consistency: ConsistencyLevel::BoundedStaleness,
        failover_mode: FailoverMode::Automatic,
        sla_max_lag_ms: 200,
        included_tables: vec![],
        excluded_tables: vec![],
    })?;

    // Periodically report the latest health evaluation until interrupted.
    let reporter = engine.clone();
    let report = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(10));
        loop {
            ticker.tick().await;
            if let Some(health) = reporter.latest_health("demo") {
                tracing::info!(
                    "group demo status={} sla_breached={} regions={}",
                    health.overall,
                    health.sla_breached,
                    health.regions.len()
                );
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("received Ctrl+C, shutting down");
    report.abort();
    engine.shutdown().await;

    Ok(())
}
