use serde::Serialize;

/// Answer of the `executionEnvironment` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionEnvironment {
    pub daemon_version: String,
    pub protocol_version: String,
    /// Resolved proxy executable, absent when it cannot be found
    pub proxy_binary: Option<String>,
    /// What the proxy prints for `-v`
    pub proxy_version: Option<String>,
    pub memory_checker: MemoryCheckerEnvironment,
    pub os: String,
    pub arch: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryCheckerEnvironment {
    pub name: String,
    pub binary: Option<String>,
    pub available: bool,
}
