use rcd_config::ConfigError;
use rcd_instance::InstanceError;
use rcd_protocol::ProtocolError;

use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Config error: {source}")]
    Config {
        #[source]
        source: ConfigError,
        location: ErrorLocation,
    },

    #[error("{source}")]
    Protocol {
        #[source]
        source: ProtocolError,
        location: ErrorLocation,
    },

    #[error("{source}")]
    Instance {
        #[source]
        source: InstanceError,
        location: ErrorLocation,
    },

    #[error("Cannot serialize {what}: {source} {location}")]
    Serialization {
        what: &'static str,
        #[source]
        source: serde_json::Error,
        location: ErrorLocation,
    },

    #[error("Cannot bind control listener to {addr}: {source} {location}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Command handler for {command} panicked {location}")]
    HandlerPanicked {
        command: &'static str,
        location: ErrorLocation,
    },

    #[error("Command {command} ignored cancellation and was aborted {location}")]
    HandlerAborted {
        command: &'static str,
        location: ErrorLocation,
    },

    #[error("Logger error: {message} {location}")]
    Logger {
        message: String,
        location: ErrorLocation,
    },

    #[error("IO error: {source} {location}")]
    Io {
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },
}

impl ServerError {
    #[track_caller]
    pub fn logger<S: Into<String>>(message: S) -> Self {
        Self::Logger {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn serialization(what: &'static str, source: serde_json::Error) -> Self {
        Self::Serialization {
            what,
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ConfigError> for ServerError {
    #[track_caller]
    fn from(source: ConfigError) -> Self {
        Self::Config {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ProtocolError> for ServerError {
    #[track_caller]
    fn from(source: ProtocolError) -> Self {
        Self::Protocol {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<InstanceError> for ServerError {
    #[track_caller]
    fn from(source: InstanceError) -> Self {
        Self::Instance {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for ServerError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
