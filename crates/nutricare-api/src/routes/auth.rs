use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use nutricare_auth::flows;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub id_token: String,
    pub refresh_token: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let tokens = flows::login(
        &state.cognito,
        &state.config.cognito_client_id,
        &req.username,
        &req.password,
    )
    .await?;
    Ok(Json(LoginResponse {
        access_token: tokens.access_token,
        id_token: tokens.id_token,
        refresh_token: tokens.refresh_token,
    }))
}

#[derive(Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub user_confirmed: bool,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<SignupResponse>, ApiError> {
    let result = flows::signup(
        &state.cognito,
        &state.config.cognito_client_id,
        &req.username,
        &req.password,
        &req.email,
    )
    .await?;
    Ok(Json(SignupResponse {
        user_confirmed: result.user_confirmed,
    }))
}

#[derive(Deserialize)]
pub struct ConfirmRequest {
    pub username: String,
    pub code: String,
}

pub async fn confirm_signup(
    State(state): State<AppState>,
    Json(req): Json<ConfirmRequest>,
) -> Result<Json<()>, ApiError> {
    flows::confirm_signup(
        &state.cognito,
        &state.config.cognito_client_id,
        &req.username,
        &req.code,
    )
    .await?;
    Ok(Json(()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub access_token: String,
}

pub async fn logout(
    State(state): State<AppState>,
    Json(req): Json<LogoutRequest>,
) -> Result<Json<()>, ApiError> {
    flows::logout(&state.cognito, &req.access_token).await?;
    Ok(Json(()))
}
