//! Configuration module for the resale estimator
//!
//! Reads runtime settings from the environment. Numeric constants live in
//! utils/constants.rs; nothing here hardcodes a bound or a list.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;

use crate::models::catalog::OptionCatalog;
use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{DEFAULT_HOST, DEFAULT_MODEL_PATH, DEFAULT_PORT};

/// Environment variable naming the model artifact
pub const ENV_MODEL_PATH: &str = "RESALE_MODEL_PATH";
/// Environment variable naming an option catalog JSON file
pub const ENV_OPTIONS_PATH: &str = "RESALE_OPTIONS_PATH";
pub const ENV_HOST: &str = "RESALE_HOST";
pub const ENV_PORT: &str = "RESALE_PORT";
/// Set to `true` when a reverse proxy supplies `x-forwarded-for`
pub const ENV_TRUST_PROXY: &str = "RESALE_TRUST_PROXY";

/// Runtime configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Serialized model artifact
    pub model_path: PathBuf,
    /// Optional replacement for the built-in option lists
    pub options_path: Option<PathBuf>,
    /// API bind host
    pub host: String,
    /// API bind port
    pub port: u16,
    /// Key rate limits on proxy headers instead of the socket peer
    pub trust_proxy: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            options_path: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            trust_proxy: false,
        }
    }
}

impl AppConfig {
    /// Build configuration from environment variables.
    ///
    /// Hosting platforms set `PORT`; `RESALE_PORT` is the local-dev fallback.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (testable without touching the process env).
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let model_path = lookup(ENV_MODEL_PATH)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.model_path);

        let options_path = lookup(ENV_OPTIONS_PATH)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let host = lookup(ENV_HOST).unwrap_or(defaults.host);

        let port = match lookup("PORT").or_else(|| lookup(ENV_PORT)) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                AppError::config(format!("Port '{}' is not a valid port number", raw))
            })?,
            None => defaults.port,
        };

        let trust_proxy = match lookup(ENV_TRUST_PROXY) {
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                _ => {
                    return Err(AppError::config(format!(
                        "{} must be true or false, got '{}'",
                        ENV_TRUST_PROXY, raw
                    )))
                }
            },
            None => defaults.trust_proxy,
        };

        Ok(Self {
            model_path,
            options_path,
            host,
            port,
            trust_proxy,
        })
    }

    /// Socket address the API binds to
    pub fn bind_addr(&self) -> AppResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| AppError::config(format!("Invalid bind address {}:{}", self.host, self.port)))
    }

    /// Option catalog from `options_path`, or the built-in lists
    pub fn load_catalog(&self) -> AppResult<OptionCatalog> {
        match &self.options_path {
            Some(path) => OptionCatalog::load(path),
            None => {
                info!("Using built-in option catalog");
                Ok(OptionCatalog::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_env_empty() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.model_path, PathBuf::from("best_model.json"));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_platform_port_wins() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("PORT", "9000"), ("RESALE_PORT", "7000")]))
                .unwrap();
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_invalid_port_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("RESALE_PORT", "not-a-port")])).unwrap_err();
        assert!(err.code.is_fatal_to_process());
    }

    #[test]
    fn test_trust_proxy_flag() {
        assert!(!AppConfig::from_lookup(lookup_from(&[])).unwrap().trust_proxy);

        let config = AppConfig::from_lookup(lookup_from(&[("RESALE_TRUST_PROXY", "TRUE")])).unwrap();
        assert!(config.trust_proxy);

        let err = AppConfig::from_lookup(lookup_from(&[("RESALE_TRUST_PROXY", "maybe")])).unwrap_err();
        assert!(err.code.is_fatal_to_process());
    }

    #[test]
    fn test_paths_and_bind_addr() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("RESALE_MODEL_PATH", "/models/hdb.json"),
            ("RESALE_OPTIONS_PATH", "/models/options.json"),
            ("RESALE_HOST", "127.0.0.1"),
        ]))
        .unwrap();
        assert_eq!(config.model_path, PathBuf::from("/models/hdb.json"));
        assert_eq!(config.options_path, Some(PathBuf::from("/models/options.json")));
        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:8080");
    }
}
