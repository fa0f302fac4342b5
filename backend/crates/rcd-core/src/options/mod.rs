pub mod option_name;
pub mod raw_options;
pub mod reconfigure_options;
pub mod reset_options;
pub mod stop_options;
pub mod wait_active_requests_options;
