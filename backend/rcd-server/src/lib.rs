//! Control daemon: accepts protocol connections and drives the managed
//! proxy through the lifecycle controller.

pub mod dispatcher;
pub mod error;
pub mod listener;
pub mod logger;
pub mod shutdown_coordinator;
pub mod shutdown_guard;
pub mod worker;

#[cfg(test)]
mod tests;

pub use dispatcher::{Dispatcher, HANDLER_GRACE};
pub use error::{Result as ServerResult, ServerError};
pub use listener::Listener;
pub use shutdown_coordinator::ShutdownCoordinator;
pub use shutdown_guard::ShutdownGuard;
pub use worker::{WATCHDOG_GRACE, serve_connection, spawn_worker};
