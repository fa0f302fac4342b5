use crate::{
    CoreResult, DISKER_COUNT, LISTENING_PORTS, MAX_PROCESS_COUNT, MEMORY_CHECKER_USE, RawOptions,
    SHUTDOWN_MANNER, ShutdownManner, WORKER_COUNT,
};

/// Options accepted by `POST /reset`.
///
/// Absent fields fall back to the daemon's configured defaults when the
/// controller builds the new deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetOptions {
    pub listening_ports: Option<Vec<u16>>,
    pub shutdown_manner: Option<ShutdownManner>,
    pub workers: Option<u32>,
    pub diskers: Option<u32>,
    pub memory_checker: Option<bool>,
}

impl ResetOptions {
    pub const NAMES: &'static [&'static str] = &[
        LISTENING_PORTS,
        SHUTDOWN_MANNER,
        WORKER_COUNT,
        DISKER_COUNT,
        MEMORY_CHECKER_USE,
    ];

    #[track_caller]
    pub fn from_raw(raw: &RawOptions) -> CoreResult<Self> {
        Ok(Self {
            listening_ports: raw.ports(LISTENING_PORTS)?,
            shutdown_manner: raw.get(SHUTDOWN_MANNER).map(str::parse).transpose()?,
            workers: raw.count(WORKER_COUNT, 1..=MAX_PROCESS_COUNT)?,
            diskers: raw.count(DISKER_COUNT, 0..=MAX_PROCESS_COUNT)?,
            memory_checker: raw.flag(MEMORY_CHECKER_USE)?,
        })
    }
}
