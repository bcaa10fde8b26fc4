//! Configuration management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Semantic Scholar API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Rate limiting settings
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

/// Semantic Scholar API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Graph API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key (optional, for higher rate limits)
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: std::env::var("SEMANTIC_SCHOLAR_API_KEY").ok(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.semanticscholar.org/graph/v1".to_string()
}

/// Token-bucket settings for the outbound request gate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum stored tokens
    #[serde(default = "default_capacity")]
    pub capacity: f64,

    /// Tokens added per second
    #[serde(default = "default_fill_rate")]
    pub fill_rate: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            fill_rate: default_fill_rate(),
        }
    }
}

fn default_capacity() -> f64 {
    1.0
}

fn default_fill_rate() -> f64 {
    1.0
}

/// Load configuration from a file, layered under `LITSIFT_*` environment
/// variables.
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(config::Environment::with_prefix("LITSIFT"))
        .build()?;

    settings.try_deserialize()
}

/// Default location of the user config file, if one exists.
pub fn find_config_file() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join("litsift").join("config.toml");
    path.exists().then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://api.semanticscholar.org/graph/v1");
        assert_eq!(config.rate_limit.capacity, 1.0);
        assert_eq!(config.rate_limit.fill_rate, 1.0);
    }
}
