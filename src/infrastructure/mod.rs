pub mod monitor;

pub use monitor::{spawn_monitor, MonitorHandle};
