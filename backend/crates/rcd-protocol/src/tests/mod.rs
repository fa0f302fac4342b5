
use crate::{ProtocolResult, Request, read_request};

/// Parse a request from literal wire bytes.
async fn parse(wire: &str) -> ProtocolResult<Request> {
    let mut input = wire.as_bytes();
    read_request(&mut input).await
}
