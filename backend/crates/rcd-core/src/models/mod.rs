pub mod access_record;
pub mod deployment;
pub mod health_report;
pub mod shutdown_manner;
