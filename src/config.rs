use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use crate::cache::CachePolicy;
use crate::error::{AppError, Result};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "nvidia/nemotron-nano-9b-v2:free";

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    /// Absent key is not fatal: the service starts and reports unhealthy.
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    pub llm_model: String,
    pub llm_timeout: Duration,
    pub cache_policy: CachePolicy,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let openrouter_api_key = lookup("OPENROUTER_API_KEY").filter(|k| !k.trim().is_empty());
        let openrouter_base_url = lookup("OPENROUTER_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let llm_model = lookup("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let timeout_secs = parse_var(&lookup, "LLM_TIMEOUT_SECS", 60u64)?;
        if timeout_secs == 0 {
            return Err(AppError::ConfigError("LLM_TIMEOUT_SECS must be positive".to_string()));
        }

        let capacity = parse_var(&lookup, "CACHE_CAPACITY", 0usize)?;
        let cache_policy = if capacity == 0 {
            CachePolicy::Unbounded
        } else {
            CachePolicy::Lru { capacity }
        };

        // Load server configuration with defaults
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_var(&lookup, "PORT", 8001u16)?;
        let ip = IpAddr::from_str(&host)
            .map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            openrouter_api_key,
            openrouter_base_url,
            llm_model,
            llm_timeout: Duration::from_secs(timeout_secs),
            cache_policy,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| AppError::ConfigError(format!("Invalid {}: {}", key, e))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server_addr.port(), 8001);
        assert!(config.openrouter_api_key.is_none());
        assert_eq!(config.llm_model, DEFAULT_MODEL);
        assert_eq!(config.llm_timeout, Duration::from_secs(60));
        assert_eq!(config.cache_policy, CachePolicy::Unbounded);
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let config = config_from(&[("OPENROUTER_API_KEY", "  ")]).unwrap();
        assert!(config.openrouter_api_key.is_none());
    }

    #[test]
    fn cache_capacity_selects_lru() {
        let config = config_from(&[("CACHE_CAPACITY", "128")]).unwrap();
        assert_eq!(config.cache_policy, CachePolicy::Lru { capacity: 128 });
    }

    #[test]
    fn invalid_port_is_a_config_error() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = config_from(&[("LLM_TIMEOUT_SECS", "0")]).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }
}
