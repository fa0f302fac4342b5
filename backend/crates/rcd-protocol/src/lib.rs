//! Wire format spoken between functional tests and the daemon.
//!
//! Every exchange is one minimal HTTP/1 request and response on a fresh
//! connection. Requests carry the protocol version and their options as
//! headers; `POST /reset` also carries the proxy configuration as its body.

mod command;
mod error;
mod request;
mod response;

#[cfg(test)]
mod tests;

pub use command::{Command, CommandKind};
pub use error::{ProtocolError, Result as ProtocolResult};
pub use request::{Request, read_request};
pub use response::Response;

/// Header naming the protocol version the client speaks.
pub const VERSION_HEADER: &str = "x-rcd-version";
/// The one version this build understands.
pub const SUPPORTED_VERSION: &str = "1";
/// Headers with this prefix carry command options.
pub const OPTION_PREFIX: &str = "x-rcd-option-";
/// Status of every failed command.
pub const FAILURE_STATUS: u16 = 555;
pub const FAILURE_REASON: &str = "Command Failed";

const MAX_LINE_BYTES: usize = 8 * 1024;
const MAX_HEADER_COUNT: usize = 100;
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;
