use crate::{CoreError, CoreResult};

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Option values as they arrived, keyed by case-folded name.
///
/// Only the protocol layer builds these; the typed option structs consume
/// them and perform format and range checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOptions {
    values: BTreeMap<String, String>,
}

impl RawOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, folding the name to lowercase. Returns the previous
    /// value when the name was already present.
    pub fn insert(&mut self, name: &str, value: &str) -> Option<String> {
        self.values
            .insert(name.to_ascii_lowercase(), value.trim().to_string())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Parse an unsigned count within `bounds`.
    #[track_caller]
    pub fn count(
        &self,
        name: &'static str,
        bounds: RangeInclusive<u32>,
    ) -> CoreResult<Option<u32>> {
        let Some(value) = self.get(name) else {
            return Ok(None);
        };

        let count: u32 = value
            .parse()
            .map_err(|_| CoreError::invalid_option(name, format!("'{value}' is not a count")))?;

        if count < *bounds.start() {
            return Err(CoreError::invalid_option(
                name,
                format!("must be at least {}, got {count}", bounds.start()),
            ));
        }
        if count > *bounds.end() {
            return Err(CoreError::invalid_option(
                name,
                format!("must be at most {}, got {count}", bounds.end()),
            ));
        }

        Ok(Some(count))
    }

    /// Parse a boolean word such as "yes", "no", "true", "off".
    #[track_caller]
    pub fn flag(&self, name: &'static str) -> CoreResult<Option<bool>> {
        let Some(value) = self.get(name) else {
            return Ok(None);
        };

        match value.to_ascii_lowercase().as_str() {
            "1" | "yes" | "true" | "on" => Ok(Some(true)),
            "0" | "no" | "false" | "off" => Ok(Some(false)),
            _ => Err(CoreError::invalid_option(
                name,
                format!("'{value}' is not a boolean word"),
            )),
        }
    }

    /// Parse a comma- or space-separated list of TCP ports.
    #[track_caller]
    pub fn ports(&self, name: &'static str) -> CoreResult<Option<Vec<u16>>> {
        let Some(value) = self.get(name) else {
            return Ok(None);
        };

        let mut ports = Vec::new();
        for item in value
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|item| !item.is_empty())
        {
            let port: u16 = item
                .parse()
                .map_err(|_| CoreError::invalid_option(name, format!("'{item}' is not a port")))?;
            if port == 0 {
                return Err(CoreError::invalid_option(name, "port 0 cannot be listened on"));
            }
            if !ports.contains(&port) {
                ports.push(port);
            }
        }

        if ports.is_empty() {
            return Err(CoreError::invalid_option(name, "no ports given"));
        }

        Ok(Some(ports))
    }
}
