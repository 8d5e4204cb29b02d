//! External model services

pub mod nutrient_priority;
pub mod stage_classifier;

pub use nutrient_priority::NutrientPriorityClient;
pub use stage_classifier::StageClassifierClient;

use reqwest::Client;

use crate::config::RemoteModelConfig;
use crate::error::{AppError, AppResult};

/// Build an HTTP client honouring the configured timeout
fn http_client(config: &RemoteModelConfig) -> AppResult<Client> {
    Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))
}
