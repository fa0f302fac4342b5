
use crate::Dispatcher;

use rcd_config::Config;
use rcd_instance::LifecycleController;
use rcd_protocol::{Request, read_request};

use std::path::Path;
use std::sync::Arc;

/// Dispatcher over a controller rooted at `dir`. No proxy is ever launched:
/// the binary does not exist.
pub(crate) fn test_dispatcher(dir: &Path) -> Dispatcher {
    let mut config = Config::load_from(dir).unwrap();
    config.readiness.poll_interval_ms = 20;
    config.proxy.binary = String::from("rcd-test-no-such-proxy");
    config.memory_checker.binary = String::from("rcd-test-no-such-memory-checker");
    Dispatcher::new(Arc::new(LifecycleController::new(config).unwrap()))
}

pub(crate) async fn parse(wire: &str) -> Request {
    let mut reader = wire.as_bytes();
    read_request(&mut reader).await.unwrap()
}
