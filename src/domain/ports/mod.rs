mod clock;
mod conflict_hook;
mod ddl_applier;
mod metrics_store;
mod telemetry_source;

pub use clock::{Clock, SystemClock};
pub use conflict_hook::ConflictHook;
pub use ddl_applier::{DdlApplier, DdlError};
pub use metrics_store::MetricsStore;
pub use telemetry_source::{TelemetryError, TelemetrySample, TelemetrySource};
