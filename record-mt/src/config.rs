//! Runtime configuration
//!
//! Everything process-wide lives here: the endpoint template, the client id
//! sent with each request, the request timeout and the engine's concurrency
//! bound. Record data never does.
//!
//! | Variable | Default |
//! |---|---|
//! | `RECORD_MT_ENDPOINT` | [`DEFAULT_ENDPOINT`] |
//! | `RECORD_MT_CLIENT_ID` | `gtx` |
//! | `RECORD_MT_TIMEOUT_SECS` | `30` |
//! | `RECORD_MT_MAX_CONCURRENCY` | `8` |

use crate::error::{TranslateError, TranslateResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Semaphore;

/// Public endpoint of the free Google Translate web client
pub const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single?client={client}&sl={sl}&tl={tl}&dt=t&q={q}";

pub const DEFAULT_CLIENT_ID: &str = "gtx";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// URL template with `{client}`, `{sl}`, `{tl}` and `{q}` placeholders
    pub endpoint: String,
    pub client_id: String,
    pub timeout_secs: u64,
    pub max_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl Config {
    /// Load from `RECORD_MT_*` environment variables, falling back to defaults
    pub fn from_env() -> TranslateResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> TranslateResult<Self> {
        let mut config = Config::default();

        if let Some(endpoint) = lookup("RECORD_MT_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Some(client_id) = lookup("RECORD_MT_CLIENT_ID") {
            config.client_id = client_id;
        }
        if let Some(value) = lookup("RECORD_MT_TIMEOUT_SECS") {
            config.timeout_secs = parse_number("RECORD_MT_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = lookup("RECORD_MT_MAX_CONCURRENCY") {
            config.max_concurrency = parse_number("RECORD_MT_MAX_CONCURRENCY", &value)?;
        }

        Ok(config)
    }

    pub fn client(&self) -> ClientConfig {
        ClientConfig {
            endpoint: self.endpoint.clone(),
            client_id: self.client_id.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn engine(&self) -> EngineConfig {
        EngineConfig::new(self.max_concurrency)
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> TranslateResult<T> {
    value.trim().parse().map_err(|_| {
        TranslateError::Config(format!("{} must be a non-negative integer, got `{}`", name, value))
    })
}

/// Settings for the HTTP translation provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub endpoint: String,
    pub client_id: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Config::default().client()
    }
}

/// Settings for the batch engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    max_concurrency: usize,
}

impl EngineConfig {
    /// A bound of zero is raised to one; anything above what a semaphore
    /// can hold is lowered to [`Semaphore::MAX_PERMITS`]
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.clamp(1, Semaphore::MAX_PERMITS),
        }
    }

    /// Most translation calls a batch keeps in flight at once
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig::new(DEFAULT_MAX_CONCURRENCY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_variables() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.client_id, "gtx");
        assert_eq!(config.engine().max_concurrency(), 8);
        assert_eq!(config.client().timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_variables_override_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("RECORD_MT_ENDPOINT", "http://localhost:9/t?sl={sl}&tl={tl}&q={q}"),
            ("RECORD_MT_CLIENT_ID", "test"),
            ("RECORD_MT_TIMEOUT_SECS", "5"),
            ("RECORD_MT_MAX_CONCURRENCY", " 2 "),
        ]))
        .unwrap();
        assert_eq!(config.endpoint, "http://localhost:9/t?sl={sl}&tl={tl}&q={q}");
        assert_eq!(config.client_id, "test");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.max_concurrency, 2);
    }

    #[test]
    fn test_bad_number_is_config_error() {
        let result = Config::from_lookup(lookup_from(&[("RECORD_MT_MAX_CONCURRENCY", "many")]));
        match result {
            Err(TranslateError::Config(msg)) => assert!(msg.contains("RECORD_MT_MAX_CONCURRENCY")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_concurrency_is_raised_to_one() {
        assert_eq!(EngineConfig::new(0).max_concurrency(), 1);
    }

    #[test]
    fn test_huge_concurrency_is_clamped() {
        let config = Config::from_lookup(lookup_from(&[(
            "RECORD_MT_MAX_CONCURRENCY",
            &usize::MAX.to_string(),
        )]))
        .unwrap();
        assert_eq!(config.engine().max_concurrency(), Semaphore::MAX_PERMITS);
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"max_concurrency": 3}"#).unwrap();
        assert_eq!(config.max_concurrency, 3);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }
}
