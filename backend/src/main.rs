//! AgriTriFusion - Backend Server
//!
//! Crop ripeness, fertilizer and harvest timing assistance for smallholder
//! growers of tomato, banana, mango and papaya.

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod external;
mod handlers;
mod routes;
mod services;

pub use config::Config;

use error::AppResult;
use external::{NutrientPriorityClient, StageClassifierClient};
use services::{FertilizerRules, FertilizerService, HarvestPredictor};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub harvest: Arc<HarvestPredictor>,
    pub fertilizer: Arc<FertilizerService>,
    pub classifier: Option<StageClassifierClient>,
}

impl AppState {
    /// Build services and external clients from configuration
    pub fn from_config(config: Config) -> AppResult<Self> {
        let classifier = config
            .classifier
            .as_ref()
            .map(StageClassifierClient::new)
            .transpose()?;
        let nutrient_client = config
            .nutrient_model
            .as_ref()
            .map(NutrientPriorityClient::new)
            .transpose()?;
        let rules = FertilizerRules::load(&config.fertilizer.rules_path)?;

        Ok(Self {
            harvest: Arc::new(HarvestPredictor::default()),
            fertilizer: Arc::new(FertilizerService::new(rules, nutrient_client)),
            classifier,
            config: Arc::new(config),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agri_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting AgriTriFusion Server");
    tracing::info!("Environment: {}", config.environment);

    match &config.classifier {
        Some(c) => tracing::info!("Stage classifier at {}", c.endpoint),
        None => tracing::warn!("No stage classifier configured; crop and stage must be supplied"),
    }
    if config.nutrient_model.is_none() {
        tracing::info!("No nutrient priority model configured");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    // Create application state
    let state = AppState::from_config(config)?;

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = state.config.images.max_upload_bytes;

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "AgriTriFusion API v1.0"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
