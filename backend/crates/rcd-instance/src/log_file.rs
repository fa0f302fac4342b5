use crate::{InstanceError, InstanceResult};

use std::io::ErrorKind;
use std::path::Path;

/// Read a log the proxy (or its wrapper) writes. A log that does not exist
/// yet reads as `None`; bytes that are not UTF-8 are replaced.
pub(crate) async fn read_log(path: &Path) -> InstanceResult<Option<String>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(InstanceError::file(path, e)),
    }
}
