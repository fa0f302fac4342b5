use crate::{ACTIVE_REQUESTS_COUNT, CoreResult, REQUEST_PATH, RawOptions};

/// Options accepted by `GET /waitActiveRequests`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaitActiveRequestsOptions {
    /// Only transactions whose URI contains this text are counted
    pub request_path: Option<String>,
    /// The count to wait for
    pub active_requests: u32,
}

impl WaitActiveRequestsOptions {
    pub const NAMES: &'static [&'static str] = &[REQUEST_PATH, ACTIVE_REQUESTS_COUNT];

    #[track_caller]
    pub fn from_raw(raw: &RawOptions) -> CoreResult<Self> {
        Ok(Self {
            request_path: raw
                .get(REQUEST_PATH)
                .filter(|path| !path.is_empty())
                .map(String::from),
            active_requests: raw.count(ACTIVE_REQUESTS_COUNT, 0..=u32::MAX)?.unwrap_or(0),
        })
    }
}
