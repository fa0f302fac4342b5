mod access_record;
mod deployment;
mod health_report;
mod shutdown_manner;
