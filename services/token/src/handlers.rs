//! Axum Handlers for the Token Service
//!
//! This module contains the logic for the credential minting and health
//! endpoints. It uses `utoipa` doc comments to generate OpenAPI documentation.

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    minting,
    models::{ErrorResponse, HealthResponse, TokenRequest, TokenResponse},
    state::AppState,
};

pub enum ApiError {
    BadRequest(String),
    RoomFull(String),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
            ApiError::RoomFull(message) => {
                (StatusCode::FORBIDDEN, Json(ErrorResponse { message })).into_response()
            }
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                let message = "An internal server error occurred.".to_string();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse { message }),
                )
                    .into_response()
            }
        }
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::InternalServerError(err.into())
    }
}

/// Mint a short-lived room access token for one client identity.
#[utoipa::path(
    post,
    path = "/token",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token minted successfully", body = TokenResponse),
        (status = 400, description = "Identity missing", body = ErrorResponse),
        (status = 403, description = "Room occupancy cap reached", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn mint_token(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TokenRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.identity.trim().is_empty() {
        return Err(ApiError::BadRequest("identity is required".to_string()));
    }

    let occupants = match state.directory.participant_count(&payload.room_name).await {
        Ok(count) => count,
        Err(e) => {
            // The room may simply not exist yet; treat it as empty.
            warn!(room = %payload.room_name, error = ?e, "Membership query failed; treating room as empty");
            0
        }
    };
    if occupants >= state.config.max_participants {
        return Err(ApiError::RoomFull(format!(
            "Room '{}' is full ({} of {} participants)",
            payload.room_name, occupants, state.config.max_participants
        )));
    }

    let token = minting::mint_token(
        &state.config.api_key,
        &state.config.api_secret,
        &payload.identity,
        &payload.room_name,
        state.config.token_ttl_secs,
    )?;

    info!(identity = %payload.identity, room = %payload.room_name, "Minted access token");
    Ok((
        StatusCode::OK,
        Json(TokenResponse {
            token,
            room_name: payload.room_name,
        }),
    ))
}

/// Liveness and configuration check.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
        configured: state.config.room_service_url.is_some(),
    })
}
