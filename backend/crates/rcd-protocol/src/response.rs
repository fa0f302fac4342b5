use crate::{FAILURE_REASON, FAILURE_STATUS, ProtocolResult};

use rcd_core::HealthReport;

use http::StatusCode;
use log::error;
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// What the daemon sends back. Every connection gets exactly one.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// The command completed; `answer` is command specific.
    Success {
        health: HealthReport,
        answer: Option<Value>,
    },
    /// The command failed at some step; nothing partial is reported.
    Failure { message: String },
}

#[derive(Serialize)]
struct SuccessBody<'a> {
    health: &'a HealthReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    answer: Option<&'a Value>,
}

impl Response {
    pub fn success(health: HealthReport, answer: Option<Value>) -> Self {
        Self::Success { health, answer }
    }

    pub fn failure<S: Into<String>>(message: S) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn status(&self) -> u16 {
        match self {
            Self::Success { .. } => StatusCode::OK.as_u16(),
            Self::Failure { .. } => FAILURE_STATUS,
        }
    }

    /// Serialize the complete HTTP/1.1 response.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Success { health, answer } => {
                let body = SuccessBody {
                    health,
                    answer: answer.as_ref(),
                };
                match serde_json::to_vec(&body) {
                    Ok(json) => encode(StatusCode::OK.as_u16(), "OK", "application/json", &json),
                    Err(e) => {
                        error!("Cannot encode success response: {e}");
                        Self::failure(format!("Cannot encode response: {e}")).to_bytes()
                    }
                }
            }
            Self::Failure { message } => encode(
                FAILURE_STATUS,
                FAILURE_REASON,
                "text/plain; charset=utf-8",
                message.as_bytes(),
            ),
        }
    }

    pub async fn write_to<W>(&self, writer: &mut W) -> ProtocolResult<()>
    where
        W: AsyncWrite + Unpin,
    {
        writer.write_all(&self.to_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }
}

fn encode(status: u16, reason: &str, content_type: &str, body: &[u8]) -> Vec<u8> {
    let head = format!(
        "HTTP/1.1 {status} {reason}\r\n\
         Content-Type: {content_type}\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n",
        body.len()
    );

    let mut bytes = Vec::with_capacity(head.len() + body.len());
    bytes.extend_from_slice(head.as_bytes());
    bytes.extend_from_slice(body);
    bytes
}
