use std::panic::Location;
use std::path::PathBuf;
use std::time::Duration;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstanceError {
    #[error("Cannot {operation}: the proxy is not running {location}")]
    NotRunning {
        operation: &'static str,
        location: ErrorLocation,
    },

    #[error("Cannot {operation}: the proxy is already running as pid {pid} {location}")]
    AlreadyRunning {
        operation: &'static str,
        pid: i32,
        location: ErrorLocation,
    },

    #[error("Cannot {requested}: another lifecycle operation is in progress {location}")]
    OperationInProgress {
        requested: &'static str,
        location: ErrorLocation,
    },

    #[error("Malformed PID file {path}: '{content}' {location}")]
    MalformedPidFile {
        path: PathBuf,
        content: String,
        location: ErrorLocation,
    },

    #[error("Cannot read PID file {path}: {source} {location}")]
    PidFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Cannot remove stale PID file {path}: {source} {location}")]
    StalePidFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("PID file {path} still names pid {pid} after removing it as stale {location}")]
    StalePidPersists {
        path: PathBuf,
        pid: i32,
        location: ErrorLocation,
    },

    #[error("Cannot send {signal} to pid {pid}: the process is not alive {location}")]
    NotAlive {
        pid: i32,
        signal: String,
        location: ErrorLocation,
    },

    #[error("Failed to send {signal} to pid {pid}: {source} {location}")]
    Signal {
        pid: i32,
        signal: String,
        #[source]
        source: nix::Error,
        location: ErrorLocation,
    },

    #[error("Executable '{name}' not found {location}")]
    BinaryNotFound {
        name: String,
        location: ErrorLocation,
    },

    #[error("Failed to launch {program}: {source} {location}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Cache initialization failed ({status}): {stderr} {location}")]
    CacheInitialization {
        status: String,
        stderr: String,
        location: ErrorLocation,
    },

    #[error("Timed out after {waited:?} waiting for {description} {location}")]
    ReadinessTimeout {
        description: String,
        waited: Duration,
        location: ErrorLocation,
    },

    #[error("Cancelled while waiting for {description} {location}")]
    Cancelled {
        description: String,
        location: ErrorLocation,
    },

    #[error("Diagnostic page '{page}' unavailable: {message} {location}")]
    DiagnosticsUnavailable {
        page: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Count of '{marker}' log lines went down from {previous} to {current} {location}")]
    CountsRegressed {
        marker: &'static str,
        previous: u64,
        current: u64,
        location: ErrorLocation,
    },

    #[error(
        "Reconfiguration produced {observed} '{marker}' log lines, expected {expected} {location}"
    )]
    ReconfigurationOvershoot {
        marker: &'static str,
        expected: u64,
        observed: u64,
        location: ErrorLocation,
    },

    #[error("Diagnostic page shows {observed} kid sections, expected {expected} {location}")]
    KidSectionsOvershoot {
        expected: u64,
        observed: u64,
        location: ErrorLocation,
    },

    #[error("Malformed access record in {path}: {source} {location}")]
    AccessRecord {
        path: PathBuf,
        #[source]
        source: rcd_core::CoreError,
        location: ErrorLocation,
    },

    #[error("IO error on {path}: {source} {location}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("IO error: {source} {location}")]
    Io {
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },
}

impl InstanceError {
    #[track_caller]
    pub fn not_running(operation: &'static str) -> Self {
        Self::NotRunning {
            operation,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn file<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn diagnostics_unavailable<P: Into<String>, M: Into<String>>(page: P, message: M) -> Self {
        Self::DiagnosticsUnavailable {
            page: page.into(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Whether the error says something about the managed proxy rather than
    /// about the daemon itself.
    pub fn is_instance_failure(&self) -> bool {
        matches!(
            self,
            Self::CountsRegressed { .. }
                | Self::ReconfigurationOvershoot { .. }
                | Self::KidSectionsOvershoot { .. }
                | Self::CacheInitialization { .. }
                | Self::DiagnosticsUnavailable { .. }
        )
    }
}

impl From<std::io::Error> for InstanceError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, InstanceError>;
