use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Remote catalog API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// API root (default: https://api.rawg.io/api)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// RAWG API key
    pub api_key: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.rawg.io/api".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Local collection storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
    /// Key the collection blob is stored under
    #[serde(default = "default_collection_key")]
    pub collection_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            collection_key: default_collection_key(),
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("gamedex.db")
}

fn default_collection_key() -> String {
    "game_collection".to_string()
}

/// Search-as-you-type configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before searching
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Shorter input clears results without a request
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            min_query_len: default_min_query_len(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    1000
}

fn default_min_query_len() -> usize {
    2
}

/// Sanitized config for display (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub api: SanitizedApiConfig,
    pub storage: StorageConfig,
    pub search: SearchConfig,
}

/// Sanitized API config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedApiConfig {
    pub base_url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            api: SanitizedApiConfig {
                base_url: config.api.base_url.clone(),
                api_key_configured: !config.api.api_key.is_empty(),
                timeout_secs: config.api.timeout_secs,
            },
            storage: config.storage.clone(),
            search: config.search.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_defaults() {
        let toml = r#"
[api]
api_key = "k"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.api.base_url, "https://api.rawg.io/api");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.storage.path.to_str().unwrap(), "gamedex.db");
        assert_eq!(config.storage.collection_key, "game_collection");
        assert_eq!(config.search.debounce(), Duration::from_secs(1));
        assert_eq!(config.search.min_query_len, 2);
    }

    #[test]
    fn test_deserialize_missing_api_key_fails() {
        let toml = r#"
[api]
base_url = "http://localhost:8000"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_sanitized_config_hides_key() {
        let config = Config {
            api: ApiConfig {
                base_url: default_base_url(),
                api_key: "secret-key".to_string(),
                timeout_secs: 12,
            },
            storage: StorageConfig::default(),
            search: SearchConfig::default(),
        };

        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.api.api_key_configured);
        assert_eq!(sanitized.api.timeout_secs, 12);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret-key"));
    }
}
