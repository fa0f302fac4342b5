//! Everything that touches the managed proxy: its PID file, its signals,
//! its logs, its diagnostic pages and its state directories.
//!
//! [`LifecycleController`] composes the pieces into the start, stop,
//! restart, reconfigure and reset operations. Each operation only reports
//! success after the readiness goals prove the transition finished.

mod access_log;
mod controller;
mod diagnostics;
mod environment;
mod error;
mod health_reporter;
mod instance_state;
mod launcher;
mod log_event;
mod log_file;
mod marker_counts;
mod memory_checker_log;
mod readiness;
mod rotation;
mod supervisor;

#[cfg(test)]
mod tests;

pub use access_log::{count_records, read_records};
pub use controller::LifecycleController;
pub use diagnostics::{DiagnosticsClient, count_active_requests, count_kid_sections};
pub use environment::{ExecutionEnvironment, MemoryCheckerEnvironment};
pub use error::{InstanceError, Result as InstanceResult};
pub use health_reporter::{ACCESS_RECORDS_FIELD, HealthReporter};
pub use instance_state::InstanceState;
pub use launcher::{LaunchedProcess, Launcher};
pub use log_event::LogEvent;
pub use marker_counts::MarkerCounts;
pub use memory_checker_log::{MemoryCheckerFindings, scan_memory_checker_log};
pub use readiness::ReadinessPoller;
pub use rotation::rotate_dir;
pub use supervisor::{Instance, Liveness, ProcessSupervisor, shutdown_signal};

/// Address the proxy's listening ports are polled on.
const PROXY_HOST: &str = "127.0.0.1";
/// Diagnostic pages live under this path on every listening port.
const DIAGNOSTICS_PATH: &str = "/squid-internal-mgr/";
const DIAGNOSTICS_TIMEOUT_SECS: u64 = 10;
