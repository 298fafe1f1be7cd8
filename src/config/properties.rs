//! Java-style `.properties` support.
//!
//! # Responsibilities
//! - Parse `key=value`, `key: value` and `key value` lines
//! - Skip `#` / `!` comments and blank lines; join `\` continuations
//! - Map the camelCase keys onto [`FrameworkConfig`]
//!
//! # Design Decisions
//! - Unknown keys are ignored so shared property files keep working
//! - Later duplicates override earlier ones
//! - No unicode escapes; values are taken verbatim after trimming

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::config::schema::{FrameworkConfig, LogFormat};

/// Error for a property whose value has the wrong shape.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("property `{key}` has invalid value `{value}`: expected {expected}")]
pub struct PropertyError {
    pub key: String,
    pub value: String,
    pub expected: &'static str,
}

/// Parsed key-value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    values: BTreeMap<String, String>,
}

impl Properties {
    pub fn parse(input: &str) -> Self {
        let mut values = BTreeMap::new();
        let mut pending = String::new();

        for raw in input.lines() {
            let line = raw.trim_start();
            if pending.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
                continue;
            }

            match line.strip_suffix('\\') {
                Some(head) => {
                    pending.push_str(head);
                    continue;
                }
                None => pending.push_str(line),
            }

            let logical = std::mem::take(&mut pending);
            if let Some((key, value)) = split_pair(&logical) {
                values.insert(key.to_string(), value.to_string());
            }
        }

        if let Some((key, value)) = split_pair(&pending) {
            values.insert(key.to_string(), value.to_string());
        }

        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build a configuration, starting from defaults.
    pub fn to_config(&self) -> Result<FrameworkConfig, PropertyError> {
        let mut config = FrameworkConfig::default();

        if let Some(v) = self.get("scanPackage") {
            config.scan_package = v.to_string();
        }
        if let Some(v) = self.get("contextPath") {
            config.context_path = v.to_string();
        }
        if let Some(v) = self.get("bindAddress") {
            config.listener.bind_address = v.to_string();
        }
        if let Some(v) = self.parsed::<u64>("requestTimeoutSecs", "an integer")? {
            config.timeouts.request_secs = v;
        }
        if let Some(v) = self.parsed::<usize>("maxBodyBytes", "an integer")? {
            config.limits.max_body_bytes = v;
        }
        if let Some(v) = self.get("logFormat") {
            config.observability.log_format = match v.to_ascii_lowercase().as_str() {
                "pretty" => LogFormat::Pretty,
                "json" => LogFormat::Json,
                _ => return Err(self.invalid("logFormat", v, "`pretty` or `json`")),
            };
        }
        if let Some(v) = self.get("logFilter") {
            config.observability.log_filter = v.to_string();
        }
        if let Some(v) = self.parsed::<bool>("metricsEnabled", "`true` or `false`")? {
            config.observability.metrics_enabled = v;
        }
        if let Some(v) = self.get("metricsAddress") {
            config.observability.metrics_address = v.to_string();
        }

        Ok(config)
    }

    fn parsed<T: FromStr>(&self, key: &str, expected: &'static str) -> Result<Option<T>, PropertyError> {
        match self.get(key) {
            Some(v) => v
                .parse()
                .map(Some)
                .map_err(|_| self.invalid(key, v, expected)),
            None => Ok(None),
        }
    }

    fn invalid(&self, key: &str, value: &str, expected: &'static str) -> PropertyError {
        PropertyError {
            key: key.to_string(),
            value: value.to_string(),
            expected,
        }
    }
}

fn split_pair(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let idx = line
        .find(|c: char| c == '=' || c == ':' || c.is_whitespace())
        .unwrap_or(line.len());
    let key = line[..idx].trim_end();
    let mut rest = line[idx..].trim_start();
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start();
    }
    Some((key, rest.trim_end()))
}
