use axum::{extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared_types::{ApiJson, MessageResponse};
use crate::app_state::AppState;
use crate::domain::MarketError;

/// Body of `POST /api/register`. Missing fields are reported by the
/// service as a validation failure rather than a parse failure.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub user_id: Uuid,
}

#[tracing::instrument(skip(state, request), fields(username = %request.username))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, axum::Json<MessageResponse>), MarketError> {
    // ---
    state
        .auth()
        .register(&request.username, &request.email, &request.password)
        .await?;

    state.metrics().record_user_registered();

    Ok((
        StatusCode::CREATED,
        axum::Json(MessageResponse::new("User registered successfully")),
    ))
}

// Lookup by email, suppress the password from tracing input parameters
#[tracing::instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<axum::Json<LoginResponse>, MarketError> {
    // ---
    let outcome = state.auth().login(&request.email, &request.password).await?;

    Ok(axum::Json(LoginResponse {
        token: outcome.token,
        username: outcome.user.username,
        user_id: outcome.user.id,
    }))
}
