//! services/viewer/src/bin/viewer.rs

use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use viewer_lib::{
    adapters::{LocalDocumentAdapter, MockTranslationAdapter},
    config::Config,
    error::ApiError,
    settings::SettingsStore,
    web::{get_theme_handler, put_theme_handler, rest::ApiDoc, state::AppState, ws_handler},
};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting viewer...");

    // --- 2. Load Persisted Settings ---
    let settings = Arc::new(SettingsStore::load(&config.settings_path, config.default_theme).await);
    info!(
        "Settings at {} (theme: {}).",
        settings.path().display(),
        settings.theme().await
    );

    // --- 3. Initialize Service Adapters ---
    let documents = Arc::new(LocalDocumentAdapter::new());
    let translator = Arc::new(MockTranslationAdapter::new(config.mock_latency));
    info!(
        "Using mock translation provider ({} ms latency, target '{}').",
        config.mock_latency.as_millis(),
        config.target_language
    );

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        settings,
        documents,
        translator,
    });

    let origin = config
        .allowed_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("Invalid ALLOWED_ORIGIN: {}", e)))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    let api_router = Router::new()
        .route("/ws", get(ws_handler))
        .route(
            "/settings/theme",
            get(get_theme_handler).put(put_theme_handler),
        )
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
