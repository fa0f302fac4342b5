use serde::Serialize;
use serde_json::{Map, Value};

/// Problems found in the managed instance's logs.
///
/// Built fresh for every response. An empty `problems` list means the
/// instance looked clean at the time of the check.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HealthReport {
    pub problems: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HealthReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_problem<S: Into<String>>(&mut self, problem: S) {
        self.problems.push(problem.into());
    }

    pub fn set_extra<V: Into<Value>>(&mut self, key: &str, value: V) {
        self.extra.insert(key.to_string(), value.into());
    }

    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }
}
