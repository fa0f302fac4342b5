//! Option names recognized on the wire, in their case-folded form.

pub const LISTENING_PORTS: &str = "listening-ports";
pub const SHUTDOWN_MANNER: &str = "shutdown-manner";
pub const WORKER_COUNT: &str = "worker-count";
pub const DISKER_COUNT: &str = "disker-count";
pub const MEMORY_CHECKER_USE: &str = "memory-checker-use";
pub const REQUEST_PATH: &str = "request-path";
pub const ACTIVE_REQUESTS_COUNT: &str = "active-requests-count";

/// Upper bound for worker and disker counts. The proxy refuses larger SMP
/// configurations anyway.
pub const MAX_PROCESS_COUNT: u32 = 128;
