use crate::{CoreResult, DISKER_COUNT, MAX_PROCESS_COUNT, RawOptions, WORKER_COUNT};

/// Options accepted by `GET /reconfigure`.
///
/// The counts describe the configuration the proxy is about to reread, so
/// they replace the deployment's counts for this and later operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconfigureOptions {
    pub workers: Option<u32>,
    pub diskers: Option<u32>,
}

impl ReconfigureOptions {
    pub const NAMES: &'static [&'static str] = &[WORKER_COUNT, DISKER_COUNT];

    #[track_caller]
    pub fn from_raw(raw: &RawOptions) -> CoreResult<Self> {
        Ok(Self {
            workers: raw.count(WORKER_COUNT, 1..=MAX_PROCESS_COUNT)?,
            diskers: raw.count(DISKER_COUNT, 0..=MAX_PROCESS_COUNT)?,
        })
    }
}
