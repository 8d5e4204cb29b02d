//! Configuration management for the AgriTriFusion server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with ATF_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Image classifier service (crop + ripeness stage)
    #[serde(default)]
    pub classifier: Option<RemoteModelConfig>,

    /// Nutrient priority model service
    #[serde(default)]
    pub nutrient_model: Option<RemoteModelConfig>,

    /// Fertilizer rules configuration
    pub fertilizer: FertilizerConfig,

    /// Uploaded image limits
    pub images: ImageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

/// An externally hosted model reached over HTTP
#[derive(Debug, Deserialize, Clone)]
pub struct RemoteModelConfig {
    /// Prediction endpoint
    pub endpoint: String,

    /// API key sent as `x-api-key`
    #[serde(default)]
    pub api_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct FertilizerConfig {
    /// CSV file with crop,stage,recommended_fertilizer,dose,reason rows
    pub rules_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImageConfig {
    /// Images narrower than this get a quality warning
    pub min_width: u32,

    /// Images shorter than this get a quality warning
    pub min_height: u32,

    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: usize,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("ATF_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 8501)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("fertilizer.rules_path", "data/fertilizer_rules.csv")?
            .set_default("images.min_width", 100)?
            .set_default("images.min_height", 100)?
            .set_default("images.max_upload_bytes", 10 * 1024 * 1024)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (ATF_ prefix)
            .add_source(
                Environment::with_prefix("ATF")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8501,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            min_width: 100,
            min_height: 100,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            classifier: None,
            nutrient_model: None,
            fertilizer: FertilizerConfig {
                rules_path: "data/fertilizer_rules.csv".to_string(),
            },
            images: ImageConfig::default(),
        }
    }
}
