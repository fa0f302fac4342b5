mod raw_options;
mod reconfigure_options;
mod reset_options;
mod stop_options;
mod wait_active_requests_options;
