use crate::{
    Command, CommandKind, MAX_BODY_BYTES, MAX_HEADER_COUNT, MAX_LINE_BYTES, OPTION_PREFIX,
    ProtocolError, ProtocolResult, SUPPORTED_VERSION, VERSION_HEADER,
};

use rcd_core::{
    RawOptions, ReconfigureOptions, ResetOptions, StopOptions, WaitActiveRequestsOptions,
};

use std::panic::Location;

use error_location::ErrorLocation;
use http::Method;
use log::debug;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

const CONTENT_LENGTH: &str = "content-length";

/// A request whose head has been validated and whose body has been read.
///
/// Option names are already checked against the command's vocabulary;
/// their values are checked by [`Request::into_command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub kind: CommandKind,
    pub options: RawOptions,
    pub body: Option<String>,
}

impl Request {
    /// Convert raw option values into the command's typed options.
    pub fn into_command(self) -> ProtocolResult<Command> {
        let options = &self.options;
        let command = match self.kind {
            CommandKind::Reset => Command::Reset {
                options: ResetOptions::from_raw(options)?,
                configuration: self.body.unwrap_or_default(),
            },
            CommandKind::Check => Command::Check,
            CommandKind::Stop => Command::Stop(StopOptions::from_raw(options)?),
            CommandKind::Restart => Command::Restart,
            CommandKind::Reconfigure => {
                Command::Reconfigure(ReconfigureOptions::from_raw(options)?)
            }
            CommandKind::FinishCaching => Command::FinishCaching,
            CommandKind::WaitActiveRequests => {
                Command::WaitActiveRequests(WaitActiveRequestsOptions::from_raw(options)?)
            }
            CommandKind::GetAccessRecords => Command::GetAccessRecords,
            CommandKind::ExecutionEnvironment => Command::ExecutionEnvironment,
        };
        Ok(command)
    }
}

/// Read one request from a connection.
///
/// The request line and each header line are bounded; the body, when the
/// command takes one, is read to exactly its declared length.
pub async fn read_request<R>(reader: &mut R) -> ProtocolResult<Request>
where
    R: AsyncBufRead + Unpin,
{
    let request_line = read_line(reader, "request line bytes")
        .await?
        .ok_or_else(truncated_head)?;
    let (method, target) = parse_request_line(&request_line)?;

    let mut version = None;
    let mut content_length = None;
    let mut option_headers = Vec::new();
    let mut header_count = 0;

    loop {
        let line = read_line(reader, "header line bytes")
            .await?
            .ok_or_else(truncated_head)?;
        if line.is_empty() {
            break;
        }

        header_count += 1;
        if header_count > MAX_HEADER_COUNT {
            return Err(ProtocolError::HeadTooLarge {
                what: "headers",
                limit: MAX_HEADER_COUNT,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let (name, value) = parse_header(&line)?;
        if name == VERSION_HEADER {
            version = Some(value.to_string());
        } else if name == CONTENT_LENGTH {
            content_length = Some(parse_content_length(value)?);
        } else if let Some(option) = name.strip_prefix(OPTION_PREFIX) {
            option_headers.push((option.to_string(), value.to_string()));
        }
    }

    match version {
        None => {
            return Err(ProtocolError::MissingVersion {
                header: VERSION_HEADER,
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Some(found) if found != SUPPORTED_VERSION => {
            return Err(ProtocolError::VersionMismatch {
                found,
                expected: SUPPORTED_VERSION,
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Some(_) => {}
    }

    let kind = CommandKind::resolve(&method, &target).ok_or_else(|| {
        ProtocolError::UnknownCommand {
            method: method.to_string(),
            path: target.clone(),
            location: ErrorLocation::from(Location::caller()),
        }
    })?;

    let mut options = RawOptions::new();
    for (name, value) in option_headers {
        if !kind.accepts_option(&name) {
            return Err(ProtocolError::UnknownOption {
                command: kind.name(),
                option: name,
                location: ErrorLocation::from(Location::caller()),
            });
        }
        if options.insert(&name, &value).is_some() {
            return Err(ProtocolError::DuplicateOption {
                option: name,
                location: ErrorLocation::from(Location::caller()),
            });
        }
    }

    let body = read_body(reader, kind, content_length).await?;

    debug!(
        "Parsed {} request with {} option(s)",
        kind.name(),
        options.len()
    );

    Ok(Request {
        kind,
        options,
        body,
    })
}

/// Read one CRLF- or LF-terminated line without its terminator.
/// `None` means the peer closed the connection before sending anything.
async fn read_line<R>(reader: &mut R, what: &'static str) -> ProtocolResult<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let mut limited = (&mut *reader).take(MAX_LINE_BYTES as u64 + 1);
    let read = limited.read_until(b'\n', &mut buf).await?;

    if read == 0 {
        return Ok(None);
    }

    if buf.last() != Some(&b'\n') {
        if buf.len() > MAX_LINE_BYTES {
            return Err(ProtocolError::HeadTooLarge {
                what,
                limit: MAX_LINE_BYTES,
                location: ErrorLocation::from(Location::caller()),
            });
        }
        return Err(truncated_head());
    }

    buf.pop();
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }

    String::from_utf8(buf)
        .map(Some)
        .map_err(|e| ProtocolError::malformed_header(String::from_utf8_lossy(e.as_bytes())))
}

fn parse_request_line(line: &str) -> ProtocolResult<(Method, String)> {
    let mut parts = line.split_whitespace();
    let (Some(method), Some(target), Some(version), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ProtocolError::malformed_request_line(line));
    };

    if !version.starts_with("HTTP/1.") {
        return Err(ProtocolError::malformed_request_line(line));
    }

    let method = Method::from_bytes(method.as_bytes())
        .map_err(|_| ProtocolError::malformed_request_line(line))?;

    Ok((method, target.to_string()))
}

/// Split a header line, folding the name to lowercase.
fn parse_header(line: &str) -> ProtocolResult<(String, &str)> {
    let (name, value) = line
        .split_once(':')
        .ok_or_else(|| ProtocolError::malformed_header(line))?;

    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(ProtocolError::malformed_header(line));
    }

    Ok((name.to_ascii_lowercase(), value.trim()))
}

#[track_caller]
fn parse_content_length(value: &str) -> ProtocolResult<usize> {
    value
        .parse()
        .map_err(|_| ProtocolError::InvalidContentLength {
            value: value.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
}

async fn read_body<R>(
    reader: &mut R,
    kind: CommandKind,
    content_length: Option<usize>,
) -> ProtocolResult<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    if !kind.takes_body() {
        return match content_length {
            Some(length) if length > 0 => Err(ProtocolError::UnexpectedBody {
                command: kind.name(),
                location: ErrorLocation::from(Location::caller()),
            }),
            _ => Ok(None),
        };
    }

    let expected = content_length.ok_or_else(|| ProtocolError::MissingBody {
        command: kind.name(),
        location: ErrorLocation::from(Location::caller()),
    })?;

    if expected > MAX_BODY_BYTES {
        return Err(ProtocolError::BodyTooLarge {
            declared: expected,
            limit: MAX_BODY_BYTES,
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let mut body = Vec::with_capacity(expected);
    (&mut *reader)
        .take(expected as u64)
        .read_to_end(&mut body)
        .await?;

    if body.len() < expected {
        return Err(ProtocolError::TruncatedBody {
            expected,
            received: body.len(),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    String::from_utf8(body)
        .map(Some)
        .map_err(|_| ProtocolError::MalformedBody {
            location: ErrorLocation::from(Location::caller()),
        })
}

#[track_caller]
fn truncated_head() -> ProtocolError {
    ProtocolError::TruncatedHead {
        location: ErrorLocation::from(Location::caller()),
    }
}
