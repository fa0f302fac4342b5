use crate::{CoreResult, RawOptions, SHUTDOWN_MANNER, ShutdownManner};

/// Options accepted by `GET /stop`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopOptions {
    pub shutdown_manner: Option<ShutdownManner>,
}

impl StopOptions {
    pub const NAMES: &'static [&'static str] = &[SHUTDOWN_MANNER];

    #[track_caller]
    pub fn from_raw(raw: &RawOptions) -> CoreResult<Self> {
        Ok(Self {
            shutdown_manner: raw.get(SHUTDOWN_MANNER).map(str::parse).transpose()?,
        })
    }
}
