use rcd_config::Config;
use rcd_instance::LifecycleController;
use rcd_server::{Dispatcher, Listener, ShutdownCoordinator, logger};

use std::error::Error;
use std::sync::Arc;

use log::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load and validate configuration
    let config = Config::load()?;
    config.validate()?;

    let log_file_path = config.logging.file.as_deref().map(|file| config.resolve(file));

    // Initialize logger (before any other logging)
    logger::initialize(config.logging.level, log_file_path, config.logging.colored)?;

    info!("Starting rcd v{}", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    let controller = Arc::new(LifecycleController::new(config.clone())?);
    let state = controller.boot().await?;
    info!("Managed proxy is {state}");

    let shutdown = ShutdownCoordinator::new();
    shutdown.listen_for_signals();

    let listener = Listener::bind(
        &config.bind_addr(),
        Dispatcher::new(controller),
        config.watchdog(),
        shutdown,
    )
    .await?;
    info!("Control listener bound to {}", listener.local_addr()?);

    listener.run().await?;

    info!("rcd stopped");
    Ok(())
}
