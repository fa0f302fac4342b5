use crate::{InstanceError, InstanceResult, LogEvent, log_file::read_log};

use std::panic::Location;
use std::path::Path;

use error_location::ErrorLocation;

/// Counts of the main log lines that prove a (re)configuration finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkerCounts {
    pub reconfiguring: u64,
    pub accepting: u64,
}

impl MarkerCounts {
    pub const RECONFIGURING: &'static str = "reconfiguring";
    pub const ACCEPTING: &'static str = "accepting connections";

    pub fn count(text: &str) -> Self {
        let mut counts = Self::default();
        for line in text.lines() {
            match LogEvent::classify(line) {
                Some(LogEvent::Reconfiguring) => counts.reconfiguring += 1,
                Some(LogEvent::AcceptingConnections) => counts.accepting += 1,
                _ => {}
            }
        }
        counts
    }

    /// Count the markers in a log file; a missing file has none.
    pub async fn sample(path: &Path) -> InstanceResult<Self> {
        Ok(read_log(path)
            .await?
            .map(|text| Self::count(&text))
            .unwrap_or_default())
    }

    /// Fail when either count went down since `previous`. Logs only grow
    /// between rotations, so a decrease means the log was replaced.
    #[track_caller]
    pub fn ensure_not_below(&self, previous: &Self) -> InstanceResult<()> {
        for (marker, previous, current) in [
            (Self::RECONFIGURING, previous.reconfiguring, self.reconfiguring),
            (Self::ACCEPTING, previous.accepting, self.accepting),
        ] {
            if current < previous {
                return Err(InstanceError::CountsRegressed {
                    marker,
                    previous,
                    current,
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }
        Ok(())
    }

    /// Growth since `baseline`. Call [`MarkerCounts::ensure_not_below`] first.
    pub fn since(&self, baseline: &Self) -> Self {
        Self {
            reconfiguring: self.reconfiguring.saturating_sub(baseline.reconfiguring),
            accepting: self.accepting.saturating_sub(baseline.accepting),
        }
    }
}
