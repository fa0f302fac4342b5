use crate::{CoreError, CoreResult};

use std::fmt;
use std::panic::Location;
use std::str::FromStr;

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

/// How forcefully a running instance is asked to exit.
///
/// Each manner maps to one signal severity. The default is the most
/// forceful one, so a test that does not care about shutdown semantics
/// never waits on a slow graceful exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShutdownManner {
    /// Let the proxy finish in-flight transactions (SIGTERM)
    Gracefully,
    /// Skip the shutdown lifetime (SIGINT)
    Urgently,
    /// Kill the whole process group (SIGKILL)
    #[default]
    Immediately,
}

impl ShutdownManner {
    pub const ALL: [ShutdownManner; 3] = [Self::Gracefully, Self::Urgently, Self::Immediately];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gracefully => "gracefully",
            Self::Urgently => "urgently",
            Self::Immediately => "immediately",
        }
    }

    /// Whether the signal goes to the whole process group rather than the leader.
    pub fn targets_process_group(&self) -> bool {
        matches!(self, Self::Immediately)
    }
}

impl fmt::Display for ShutdownManner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShutdownManner {
    type Err = CoreError;

    #[track_caller]
    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gracefully" => Ok(Self::Gracefully),
            "urgently" => Ok(Self::Urgently),
            "immediately" => Ok(Self::Immediately),
            _ => Err(CoreError::InvalidShutdownManner {
                value: s.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}
