use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

/// Anything wrong with a request as received. Always reported back to the
/// client; never retried.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Malformed request line '{line}' {location}")]
    MalformedRequestLine {
        line: String,
        location: ErrorLocation,
    },

    #[error("Malformed header '{line}' {location}")]
    MalformedHeader {
        line: String,
        location: ErrorLocation,
    },

    #[error("Request head exceeds {limit} {what} {location}")]
    HeadTooLarge {
        what: &'static str,
        limit: usize,
        location: ErrorLocation,
    },

    #[error("Connection closed before the request head ended {location}")]
    TruncatedHead { location: ErrorLocation },

    #[error("Missing required {header} header {location}")]
    MissingVersion {
        header: &'static str,
        location: ErrorLocation,
    },

    #[error("Unsupported protocol version '{found}', expected '{expected}' {location}")]
    VersionMismatch {
        found: String,
        expected: &'static str,
        location: ErrorLocation,
    },

    #[error("Unknown command {method} {path} {location}")]
    UnknownCommand {
        method: String,
        path: String,
        location: ErrorLocation,
    },

    #[error("Option '{option}' is not recognized by {command} {location}")]
    UnknownOption {
        command: &'static str,
        option: String,
        location: ErrorLocation,
    },

    #[error("Option '{option}' given more than once {location}")]
    DuplicateOption {
        option: String,
        location: ErrorLocation,
    },

    #[error("Invalid option: {source} {location}")]
    InvalidOption {
        #[source]
        source: rcd_core::CoreError,
        location: ErrorLocation,
    },

    #[error("Invalid Content-Length '{value}' {location}")]
    InvalidContentLength {
        value: String,
        location: ErrorLocation,
    },

    #[error("{command} requires a body {location}")]
    MissingBody {
        command: &'static str,
        location: ErrorLocation,
    },

    #[error("{command} does not accept a body {location}")]
    UnexpectedBody {
        command: &'static str,
        location: ErrorLocation,
    },

    #[error("Declared body of {declared} bytes exceeds {limit} {location}")]
    BodyTooLarge {
        declared: usize,
        limit: usize,
        location: ErrorLocation,
    },

    #[error("Truncated request: body has {received} of {expected} declared bytes {location}")]
    TruncatedBody {
        expected: usize,
        received: usize,
        location: ErrorLocation,
    },

    #[error("Request body is not UTF-8 text {location}")]
    MalformedBody { location: ErrorLocation },

    #[error("IO error: {source} {location}")]
    Io {
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },
}

impl ProtocolError {
    #[track_caller]
    pub fn malformed_request_line<S: Into<String>>(line: S) -> Self {
        Self::MalformedRequestLine {
            line: line.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn malformed_header<S: Into<String>>(line: S) -> Self {
        Self::MalformedHeader {
            line: line.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for ProtocolError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<rcd_core::CoreError> for ProtocolError {
    #[track_caller]
    fn from(source: rcd_core::CoreError) -> Self {
        Self::InvalidOption {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
