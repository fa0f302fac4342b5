pub mod error;
pub mod models;
pub mod options;

#[cfg(test)]
mod tests;

pub use error::{CoreError, Result as CoreResult};
pub use models::access_record::AccessRecord;
pub use models::deployment::Deployment;
pub use models::health_report::HealthReport;
pub use models::shutdown_manner::ShutdownManner;
pub use options::option_name::{
    ACTIVE_REQUESTS_COUNT, DISKER_COUNT, LISTENING_PORTS, MAX_PROCESS_COUNT, MEMORY_CHECKER_USE,
    REQUEST_PATH, SHUTDOWN_MANNER, WORKER_COUNT,
};
pub use options::raw_options::RawOptions;
pub use options::reconfigure_options::ReconfigureOptions;
pub use options::reset_options::ResetOptions;
pub use options::stop_options::StopOptions;
pub use options::wait_active_requests_options::WaitActiveRequestsOptions;
