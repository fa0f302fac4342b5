use crate::{CoreError, CoreResult};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One transaction from the proxy's access log (native log format).
///
/// ```text
/// 1286536308.779    180 192.168.0.224 TCP_MISS/200 411 GET http://example.com/ - HIER_DIRECT/93.184.216.34 text/html
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessRecord {
    pub timestamp: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub client: String,
    pub result_code: String,
    pub status: u16,
    pub bytes: u64,
    pub method: String,
    pub url: String,
    pub raw: String,
}

impl AccessRecord {
    /// Parse a native-format access log line.
    ///
    /// Trailing fields (user, hierarchy, content type) are kept only in `raw`.
    #[track_caller]
    pub fn parse(line: &str) -> CoreResult<Self> {
        let mut fields = line.split_whitespace();
        let mut next = |name: &str| {
            fields
                .next()
                .ok_or_else(|| CoreError::malformed_access_record(format!("missing {name}")))
        };

        let timestamp_field = next("timestamp")?;
        let elapsed_field = next("elapsed time")?;
        let client = next("client address")?.to_string();
        let code_field = next("result code")?;
        let bytes_field = next("size")?;
        let method = next("method")?.to_string();
        let url = next("URL")?.to_string();

        let timestamp = parse_timestamp(timestamp_field)?;
        let elapsed_ms = elapsed_field.parse().map_err(|_| {
            CoreError::malformed_access_record(format!("bad elapsed time {elapsed_field}"))
        })?;
        let (result_code, status) = code_field.split_once('/').ok_or_else(|| {
            CoreError::malformed_access_record(format!("bad result code {code_field}"))
        })?;
        let status = status
            .parse()
            .map_err(|_| CoreError::malformed_access_record(format!("bad status {status}")))?;
        let bytes = bytes_field
            .parse()
            .map_err(|_| CoreError::malformed_access_record(format!("bad size {bytes_field}")))?;

        Ok(Self {
            timestamp,
            elapsed_ms,
            client,
            result_code: result_code.to_string(),
            status,
            bytes,
            method,
            url,
            raw: line.to_string(),
        })
    }
}

#[track_caller]
fn parse_timestamp(field: &str) -> CoreResult<DateTime<Utc>> {
    let (secs, millis) = field.split_once('.').unwrap_or((field, "0"));
    let secs: i64 = secs
        .parse()
        .map_err(|_| CoreError::malformed_access_record(format!("bad timestamp {field}")))?;
    let millis: u32 = millis
        .parse()
        .map_err(|_| CoreError::malformed_access_record(format!("bad timestamp {field}")))?;

    DateTime::from_timestamp(secs, millis.saturating_mul(1_000_000))
        .ok_or_else(|| CoreError::malformed_access_record(format!("timestamp out of range {field}")))
}
