use std::panic::Location;
use std::result::Result as StdResult;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid value for option {option}: {message} {location}")]
    InvalidOption {
        option: &'static str,
        message: String,
        location: ErrorLocation,
    },

    #[error("Invalid shutdown manner: {value} {location}")]
    InvalidShutdownManner {
        value: String,
        location: ErrorLocation,
    },

    #[error("Malformed access record: {message} {location}")]
    MalformedAccessRecord {
        message: String,
        location: ErrorLocation,
    },
}

impl CoreError {
    #[track_caller]
    pub fn invalid_option<S: Into<String>>(option: &'static str, message: S) -> Self {
        Self::InvalidOption {
            option,
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn malformed_access_record<S: Into<String>>(message: S) -> Self {
        Self::MalformedAccessRecord {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = StdResult<T, CoreError>;
