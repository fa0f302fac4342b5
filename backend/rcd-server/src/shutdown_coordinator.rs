use crate::ShutdownGuard;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{error, info};
use tokio::sync::broadcast;

/// Graceful shutdown coordinator
#[derive(Clone)]
pub struct ShutdownCoordinator {
    shutdown_tx: broadcast::Sender<()>,
    triggered: Arc<AtomicBool>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            shutdown_tx,
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Trigger shutdown (call this from signal handler)
    pub fn shutdown(&self) {
        if self.triggered.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("Shutdown requested, stopping the control listener");
        let _ = self.shutdown_tx.send(());
    }

    pub fn is_shutdown(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    pub fn subscribe_guard(&self) -> ShutdownGuard {
        ShutdownGuard::new(self)
    }

    /// Trigger shutdown on SIGINT or SIGTERM. The managed proxy is left alone.
    pub fn listen_for_signals(&self) {
        let coordinator = self.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
                    coordinator.shutdown();
                }
                Err(e) => error!("Failed to listen for SIGINT: {}", e),
            }
        });

        let coordinator = self.clone();
        tokio::spawn(async move {
            use tokio::signal::unix::{SignalKind, signal};

            match signal(SignalKind::terminate()) {
                Ok(mut terminate) => {
                    if terminate.recv().await.is_some() {
                        info!("Received SIGTERM, initiating graceful shutdown");
                        coordinator.shutdown();
                    }
                }
                Err(e) => error!("Failed to listen for SIGTERM: {}", e),
            }
        });
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
