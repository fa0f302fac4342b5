//! Queries against the proxy's built-in diagnostic pages.

use crate::{DIAGNOSTICS_PATH, DIAGNOSTICS_TIMEOUT_SECS, InstanceError, InstanceResult, LogEvent};

use std::time::Duration;

use log::debug;

/// Number of kid sections an aggregated diagnostic page shows.
pub fn count_kid_sections(page: &str) -> u64 {
    page.lines()
        .filter(|line| LogEvent::classify(line) == Some(LogEvent::KidSectionClosed))
        .count() as u64
}

/// Number of transactions on the `active_requests` page whose URI contains
/// `filter`. Diagnostic requests, including the one that fetched the
/// page, are not counted.
pub fn count_active_requests(page: &str, filter: Option<&str>) -> u32 {
    page.lines()
        .filter_map(|line| line.trim_start().strip_prefix("uri "))
        .map(str::trim)
        .filter(|uri| !uri.contains(DIAGNOSTICS_PATH))
        .filter(|uri| filter.is_none_or(|filter| uri.contains(filter)))
        .count() as u32
}

/// HTTP client for `http://<host>:<port>/squid-internal-mgr/<page>`.
#[derive(Debug, Clone)]
pub struct DiagnosticsClient {
    client: reqwest::Client,
    host: String,
}

impl DiagnosticsClient {
    pub fn new(host: &str) -> InstanceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DIAGNOSTICS_TIMEOUT_SECS))
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| InstanceError::diagnostics_unavailable("*", e.to_string()))?;

        Ok(Self {
            client,
            host: host.to_string(),
        })
    }

    pub fn page_url(&self, port: u16, page: &str) -> String {
        format!("http://{}:{port}{DIAGNOSTICS_PATH}{page}", self.host)
    }

    /// Fetch a page through the given listening port.
    pub async fn page(&self, port: u16, page: &str) -> InstanceResult<String> {
        let url = self.page_url(port, page);
        debug!("Fetching {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| InstanceError::diagnostics_unavailable(page, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(InstanceError::diagnostics_unavailable(
                page,
                format!("HTTP {status}"),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| InstanceError::diagnostics_unavailable(page, e.to_string()))
    }

    pub async fn kid_sections(&self, port: u16, page: &str) -> InstanceResult<u64> {
        Ok(count_kid_sections(&self.page(port, page).await?))
    }

    pub async fn active_requests(&self, port: u16, filter: Option<&str>) -> InstanceResult<u32> {
        Ok(count_active_requests(
            &self.page(port, "active_requests").await?,
            filter,
        ))
    }
}
