use std::fs;
use std::time::Duration;

use camino::Utf8PathBuf;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::OntoError;
use crate::throttle;

pub const DEFAULT_BASE_URL: &str = "https://data.bioontology.org";
pub const DEFAULT_CACHE_TTL_MINS: u64 = 240;
pub const MAX_CACHE_TTL_MINS: u64 = 365 * 24 * 60;
pub const DEFAULT_CACHE_MAX_SIZE: u64 = 300_000;
pub const DEFAULT_RATE_LIMIT: f64 = 15.0;
pub const DEFAULT_STATS_INTERVAL_MS: u64 = 5 * 60 * 1000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const CONFIG_FILE_NAME: &str = "onto-resolve.json";

pub const ENV_API_KEY: &str = "BIOPORTAL_API_KEY";
pub const ENV_BASE_URL: &str = "BIOPORTAL_BASE_URL";
pub const ENV_CACHE_TTL_MINS: &str = "ONTO_CACHE_TTL_MINS";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub cache_ttl_mins: Option<u64>,
    #[serde(default)]
    pub cache_max_size: Option<u64>,
    #[serde(default)]
    pub rate_limit: Option<f64>,
    #[serde(default)]
    pub stats_interval_ms: Option<u64>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub api_key: String,
    pub cache_ttl: Duration,
    pub cache_max_size: u64,
    pub rate_limit: f64,
    pub stats_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_MINS * 60),
            cache_max_size: DEFAULT_CACHE_MAX_SIZE,
            rate_limit: DEFAULT_RATE_LIMIT,
            stats_interval: Duration::from_millis(DEFAULT_STATS_INTERVAL_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, OntoError> {
        let config_path = match path {
            Some(path) => Some(Utf8PathBuf::from(path)),
            None => default_config_path(),
        };

        let mut config = match config_path {
            Some(config_path) => {
                let content = fs::read_to_string(&config_path)
                    .map_err(|_| OntoError::ConfigRead(config_path.clone().into_std_path_buf()))?;
                serde_json::from_str::<ClientConfig>(&content)
                    .map_err(|err| OntoError::ConfigParse(err.to_string()))?
            }
            None => ClientConfig::default(),
        };

        Self::apply_env(&mut config, |name| std::env::var(name).ok())?;
        Self::resolve_config(config)
    }

    pub fn apply_env<F>(config: &mut ClientConfig, lookup: F) -> Result<(), OntoError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_key) = lookup(ENV_API_KEY).filter(|v| !v.trim().is_empty()) {
            config.api_key = Some(api_key.trim().to_string());
        }
        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            config.base_url = Some(base_url.trim().to_string());
        }
        if let Some(ttl) = lookup(ENV_CACHE_TTL_MINS).filter(|v| !v.trim().is_empty()) {
            let ttl = ttl.trim().parse::<u64>().map_err(|_| {
                OntoError::InvalidConfig(format!("{ENV_CACHE_TTL_MINS} must be whole minutes, got '{ttl}'"))
            })?;
            config.cache_ttl_mins = Some(ttl);
        }
        Ok(())
    }

    pub fn resolve_config(config: ClientConfig) -> Result<ResolvedConfig, OntoError> {
        let defaults = ResolvedConfig::default();

        let base_url = config
            .base_url
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(OntoError::InvalidConfig(format!(
                "base_url must be an http(s) URL, got '{base_url}'"
            )));
        }

        let cache_max_size = config.cache_max_size.unwrap_or(defaults.cache_max_size);
        if cache_max_size == 0 {
            return Err(OntoError::InvalidConfig(
                "cache_max_size must be at least 1".to_string(),
            ));
        }

        let rate_limit = config.rate_limit.unwrap_or(defaults.rate_limit);
        throttle::validate_rate(rate_limit)?;

        let cache_ttl = match config.cache_ttl_mins {
            Some(mins) if mins > MAX_CACHE_TTL_MINS => {
                return Err(OntoError::InvalidConfig(format!(
                    "cache_ttl_mins must be at most {MAX_CACHE_TTL_MINS} (one year), got {mins}"
                )));
            }
            Some(mins) => Duration::from_secs(mins * 60),
            None => defaults.cache_ttl,
        };

        Ok(ResolvedConfig {
            base_url,
            api_key: config.api_key.unwrap_or_default(),
            cache_ttl,
            cache_max_size,
            rate_limit,
            stats_interval: config
                .stats_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.stats_interval),
            request_timeout: config
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        })
    }
}

fn default_config_path() -> Option<Utf8PathBuf> {
    let local = Utf8PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }
    ProjectDirs::from("org", "kira", "onto-resolver")
        .and_then(|dirs| Utf8PathBuf::from_path_buf(dirs.config_dir().join(CONFIG_FILE_NAME)).ok())
        .filter(|path| path.exists())
}
