use crate::{InstanceError, InstanceResult, log_file::read_log};

use rcd_core::AccessRecord;

use std::panic::Location;
use std::path::Path;

use error_location::ErrorLocation;

/// Complete lines of a log; a final line the proxy is still writing is left out.
fn complete_lines(text: &str) -> impl Iterator<Item = &str> {
    let complete = match text.rfind('\n') {
        Some(end) => &text[..end],
        None => "",
    };
    complete.lines().filter(|line| !line.trim().is_empty())
}

/// Number of transactions the access log records.
pub async fn count_records(path: &Path) -> InstanceResult<usize> {
    Ok(read_log(path)
        .await?
        .map_or(0, |text| complete_lines(&text).count()))
}

/// Every transaction the access log records, oldest first.
pub async fn read_records(path: &Path) -> InstanceResult<Vec<AccessRecord>> {
    let Some(text) = read_log(path).await? else {
        return Ok(Vec::new());
    };

    complete_lines(&text)
        .map(|line| {
            AccessRecord::parse(line).map_err(|source| InstanceError::AccessRecord {
                path: path.to_path_buf(),
                source,
                location: ErrorLocation::from(Location::caller()),
            })
        })
        .collect()
}
