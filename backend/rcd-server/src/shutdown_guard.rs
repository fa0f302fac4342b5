use crate::ShutdownCoordinator;

use tokio::sync::broadcast;

/// Helper for gracefully handling shutdown in async tasks
pub struct ShutdownGuard {
    shutdown_rx: broadcast::Receiver<()>,
    coordinator: ShutdownCoordinator,
}

impl ShutdownGuard {
    pub fn new(coordinator: &ShutdownCoordinator) -> Self {
        Self {
            shutdown_rx: coordinator.subscribe(),
            coordinator: coordinator.clone(),
        }
    }

    /// Wait for shutdown signal. Returns at once if shutdown was already
    /// triggered before this guard subscribed.
    pub async fn wait(&mut self) {
        if self.coordinator.is_shutdown() {
            return;
        }
        let _ = self.shutdown_rx.recv().await;
    }
}
