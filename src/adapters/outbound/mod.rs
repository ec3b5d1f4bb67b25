mod dashmap_metrics_store;
mod logging_ddl_applier;
mod simulated_telemetry_source;

pub use dashmap_metrics_store::DashMapMetricsStore;
pub use logging_ddl_applier::LoggingDdlApplier;
pub use simulated_telemetry_source::SimulatedTelemetrySource;
