use crate::error::{Result as ServerErrorResult, ServerError};
use crate::{Dispatcher, ShutdownCoordinator, WATCHDOG_GRACE, spawn_worker};

use std::net::SocketAddr;
use std::panic::Location;
use std::time::Duration;

use error_location::ErrorLocation;
use log::{info, warn};
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Accepts control connections one at a time and hands each to a worker.
pub struct Listener {
    listener: TcpListener,
    dispatcher: Dispatcher,
    watchdog: Duration,
    shutdown: ShutdownCoordinator,
}

impl Listener {
    pub async fn bind(
        addr: &str,
        dispatcher: Dispatcher,
        watchdog: Duration,
        shutdown: ShutdownCoordinator,
    ) -> ServerErrorResult<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.to_string(),
                source,
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(Self {
            listener,
            dispatcher,
            watchdog,
            shutdown,
        })
    }

    pub fn local_addr(&self) -> ServerErrorResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until shutdown is requested. Workers still running at that
    /// point are cancelled and given the grace period to answer.
    pub async fn run(self) -> ServerErrorResult<()> {
        let mut guard = self.shutdown.subscribe_guard();
        let root = CancellationToken::new();
        let mut workers = JoinSet::new();

        info!("Ready to accept control connections");
        loop {
            tokio::select! {
                _ = guard.wait() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        info!("Control connection from {peer}");
                        let worker =
                            spawn_worker(stream, self.dispatcher.clone(), &root, self.watchdog);
                        workers.spawn(async move {
                            let _ = worker.await;
                        });
                    }
                    Err(e) => warn!("Failed to accept control connection: {e}"),
                },
            }

            while workers.try_join_next().is_some() {}
        }

        if !workers.is_empty() {
            info!("Cancelling {} in-flight command(s)", workers.len());
        }
        root.cancel();
        let drain = async { while workers.join_next().await.is_some() {} };
        if tokio::time::timeout(WATCHDOG_GRACE * 2, drain).await.is_err() {
            warn!("In-flight commands did not finish, abandoning them");
        }

        info!("Control listener stopped");
        Ok(())
    }
}
