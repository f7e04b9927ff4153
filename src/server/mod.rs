// HTTP server
//
// Stateless: the only shared state is the refinement controller. Clients
// carry their own artifacts and versions between calls.

pub mod error;
mod handlers;
pub mod types;

pub use error::ApiError;
pub use handlers::{
    automation_playwright, enrich_requirements, export_csv, export_excel, export_jira, export_json,
    generate_test_cases, health_check, import_json, parse_requirements,
};

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{Config, ServerConfig};
use crate::providers::create_generation_provider;
use crate::refinement::RefinementController;

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<RefinementController>,
}

impl AppState {
    pub fn new(controller: RefinementController) -> Self {
        Self {
            controller: Arc::new(controller),
        }
    }
}

/// Routes only, without middleware (tests drive this directly)
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/requirements/parse", post(parse_requirements))
        .route("/requirements/enrich", post(enrich_requirements))
        .route("/testcases/generate", post(generate_test_cases))
        .route("/export/csv", post(export_csv))
        .route("/export/excel", post(export_excel))
        .route("/export/json", post(export_json))
        .route("/export/jira", post(export_jira))
        .route("/import/json", post(import_json))
        .route("/automation/playwright", post(automation_playwright))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Full application: routes plus CORS, body limit and request tracing
pub fn build_app(state: AppState, server: &ServerConfig) -> Router {
    create_router(state)
        .layer(cors_layer(&server.cors_origins))
        .layer(DefaultBodyLimit::max(server.body_limit_bytes))
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server and run until it fails
pub async fn serve(config: Config) -> Result<()> {
    let addr: SocketAddr = config
        .server
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address: {}", config.server.bind_address))?;

    let provider = create_generation_provider(&config).context("Failed to create generation provider")?;
    let controller = RefinementController::new(provider, &config.refinement);
    tracing::info!(
        provider = %config.provider.kind,
        model = %config.provider.effective_model(),
        iteration_cap = controller.iteration_cap(),
        "Refinement controller ready"
    );

    let app = build_app(AppState::new(controller), &config.server);

    tracing::info!("Starting testgen server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
