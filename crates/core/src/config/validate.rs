use reqwest::Url;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - API key is present and the base URL parses
/// - Request timeout is not 0
/// - Minimum search length is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.api.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "api.api_key cannot be empty".to_string(),
        ));
    }

    if let Err(e) = Url::parse(&config.api.base_url) {
        return Err(ConfigError::ValidationError(format!(
            "api.base_url is not a valid URL: {}",
            e
        )));
    }

    if config.api.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "api.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.search.min_query_len == 0 {
        return Err(ConfigError::ValidationError(
            "search.min_query_len cannot be 0".to_string(),
        ));
    }

    Ok(())
}
