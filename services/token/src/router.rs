//! Axum Router Configuration
//!
//! This module defines the HTTP routing for the token service, including the
//! OpenAPI documentation routes.

use crate::{
    handlers,
    models::{ErrorResponse, HealthResponse, TokenRequest, TokenResponse},
    state::AppState,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::mint_token, handlers::health),
    components(schemas(TokenRequest, TokenResponse, HealthResponse, ErrorResponse)),
    tags(
        (name = "Nevira Token Service", description = "Room access credential minting for the Nevira assistant")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/token", post(handlers::mint_token))
        .route("/health", get(handlers::health))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
