use crate::error::{Result as ServerErrorResult, ServerError};

use rcd_instance::LifecycleController;
use rcd_protocol::{Command, Request, Response, SUPPORTED_VERSION};

use std::panic::Location;
use std::sync::Arc;
use std::time::Duration;

use error_location::ErrorLocation;
use log::{debug, error, info, warn};
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// How long a cancelled handler gets to return before it is aborted. Kept
/// below the worker's grace so the failure still reaches the client.
pub const HANDLER_GRACE: Duration = Duration::from_millis(500);

/// Aborts the wrapped task when dropped.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Runs parsed commands against the lifecycle controller.
///
/// Every command either succeeds completely, answering with a fresh health
/// report, or fails with the error text. Nothing in between is reported.
#[derive(Clone)]
pub struct Dispatcher {
    controller: Arc<LifecycleController>,
}

impl Dispatcher {
    pub fn new(controller: Arc<LifecycleController>) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> &Arc<LifecycleController> {
        &self.controller
    }

    /// Execute one request. Panics inside the handler become failures too.
    ///
    /// Once `cancel` fires the handler gets [`HANDLER_GRACE`] to return its
    /// own error; after that it is aborted. Dropping this future aborts the
    /// handler as well, so no detached handler outlives its connection.
    pub async fn dispatch(&self, request: Request, cancel: CancellationToken) -> Response {
        let name = request.kind.name();
        let dispatcher = self.clone();
        let handler_cancel = cancel.clone();
        let mut handler = AbortOnDrop(tokio::spawn(async move {
            dispatcher.execute(request, &handler_cancel).await
        }));

        let joined = tokio::select! {
            joined = &mut handler.0 => Some(joined),
            _ = cancel.cancelled() => None,
        };
        let joined = match joined {
            Some(joined) => joined,
            None => match tokio::time::timeout(HANDLER_GRACE, &mut handler.0).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!("{name} ignored cancellation, aborting it");
                    handler.0.abort();
                    let _ = (&mut handler.0).await;
                    return Self::failure(
                        name,
                        ServerError::HandlerAborted {
                            command: name,
                            location: ErrorLocation::from(Location::caller()),
                        },
                    );
                }
            },
        };

        let result = match joined {
            Ok(result) => result,
            Err(e) => {
                error!("Handler for {name} died: {e}");
                Err(ServerError::HandlerPanicked {
                    command: name,
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        };

        match result {
            Ok(response) => {
                info!("{name} succeeded");
                response
            }
            Err(e) => Self::failure(name, e),
        }
    }

    fn failure(name: &str, e: ServerError) -> Response {
        match &e {
            ServerError::Instance { source, .. } if source.is_instance_failure() => {
                error!("{name} failed: {e}")
            }
            _ => warn!("{name} failed: {e}"),
        }
        Response::failure(e.to_string())
    }

    async fn execute(
        &self,
        request: Request,
        cancel: &CancellationToken,
    ) -> ServerErrorResult<Response> {
        let command = request.into_command()?;
        let kind = command.kind();
        if kind.is_lifecycle() {
            info!("Executing {} (state: {})", kind.name(), self.controller.state());
        } else {
            debug!("Executing {}", kind.name());
        }

        let answer = self.run(command, cancel).await?;
        let health = self.controller.check().await?;

        Ok(Response::success(health, answer))
    }

    async fn run(
        &self,
        command: Command,
        cancel: &CancellationToken,
    ) -> ServerErrorResult<Option<Value>> {
        let controller = &self.controller;

        match command {
            Command::Reset {
                options,
                configuration,
            } => {
                controller.reset(&options, &configuration, cancel).await?;
                Ok(None)
            }
            Command::Check => Ok(None),
            Command::Stop(options) => {
                controller.stop(&options, cancel).await?;
                Ok(None)
            }
            Command::Restart => {
                controller.restart(cancel).await?;
                Ok(None)
            }
            Command::Reconfigure(options) => {
                controller.reconfigure(&options, cancel).await?;
                Ok(None)
            }
            Command::FinishCaching => {
                controller.finish_caching(cancel).await?;
                Ok(None)
            }
            Command::WaitActiveRequests(options) => {
                let count = controller.wait_active_requests(&options, cancel).await?;
                Ok(Some(Value::from(count)))
            }
            Command::GetAccessRecords => {
                let records = controller.access_records().await?;
                serde_json::to_value(records)
                    .map(Some)
                    .map_err(|e| ServerError::serialization("access records", e))
            }
            Command::ExecutionEnvironment => {
                let environment = controller.execution_environment(SUPPORTED_VERSION).await;
                serde_json::to_value(environment)
                    .map(Some)
                    .map_err(|e| ServerError::serialization("execution environment", e))
            }
        }
    }
}
