//! services/viewer/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::ApiError;
use crate::settings::Theme;
use crate::web::state::AppState;
use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        get_theme_handler,
        put_theme_handler,
    ),
    components(
        schemas(ThemePayload, Theme)
    ),
    tags(
        (name = "Translation Viewer API", description = "Settings endpoints for the side-by-side document translation viewer.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The persisted colour theme preference.
#[derive(Serialize, Deserialize, ToSchema, Debug, PartialEq, Eq)]
pub struct ThemePayload {
    pub theme: Theme,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Read the current theme preference.
#[utoipa::path(
    get,
    path = "/settings/theme",
    responses(
        (status = 200, description = "The current theme", body = ThemePayload)
    )
)]
pub async fn get_theme_handler(State(app_state): State<Arc<AppState>>) -> Json<ThemePayload> {
    let theme = app_state.settings.theme().await;
    Json(ThemePayload { theme })
}

/// Persist a new theme preference.
#[utoipa::path(
    put,
    path = "/settings/theme",
    request_body = ThemePayload,
    responses(
        (status = 200, description = "Theme saved", body = ThemePayload),
        (status = 422, description = "Unknown theme"),
        (status = 500, description = "Settings could not be written")
    )
)]
pub async fn put_theme_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<ThemePayload>,
) -> Result<Json<ThemePayload>, ApiError> {
    app_state.settings.set_theme(payload.theme).await?;
    Ok(Json(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{LocalDocumentAdapter, MockTranslationAdapter};
    use crate::config::Config;
    use crate::settings::SettingsStore;
    use axum::{http::StatusCode, response::IntoResponse};
    use std::path::Path;
    use std::time::Duration;

    async fn app_state(settings_path: &Path) -> Arc<AppState> {
        Arc::new(AppState {
            config: Arc::new(Config::from_lookup(|_| None).unwrap()),
            settings: Arc::new(SettingsStore::load(settings_path, Theme::Light).await),
            documents: Arc::new(LocalDocumentAdapter::new()),
            translator: Arc::new(MockTranslationAdapter::new(Duration::from_millis(1))),
        })
    }

    #[tokio::test]
    async fn theme_is_saved_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let state = app_state(&dir.path().join("settings.json")).await;

        let Json(saved) = put_theme_handler(
            State(state.clone()),
            Json(ThemePayload { theme: Theme::Dark }),
        )
        .await
        .unwrap();
        assert_eq!(saved.theme, Theme::Dark);

        let Json(current) = get_theme_handler(State(state)).await;
        assert_eq!(current.theme, Theme::Dark);
    }

    #[tokio::test]
    async fn unwritable_settings_answer_with_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let state = app_state(&dir.path().join("missing").join("settings.json")).await;

        let err = put_theme_handler(
            State(state.clone()),
            Json(ThemePayload { theme: Theme::Dark }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Settings(_)));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let Json(current) = get_theme_handler(State(state)).await;
        assert_eq!(current.theme, Theme::Light);
    }
}
