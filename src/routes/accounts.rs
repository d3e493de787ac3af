use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::models::{LoginRequest, NewUserDto, RegisterRequest};
use crate::services::account_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub async fn register(
    State(state): State<AppState>,
    AppJson(data): AppJson<RegisterRequest>,
) -> Result<Json<NewUserDto>, AppError> {
    info!("POST /account/register - Registering {}", data.user_name);
    let user = account_service::register(state.users.as_ref(), &state.tokens, data)
        .await
        .map_err(|e| {
            error!("Failed to register user: {}", e);
            e
        })?;
    Ok(Json(user))
}

pub async fn login(
    State(state): State<AppState>,
    AppJson(data): AppJson<LoginRequest>,
) -> Result<Json<NewUserDto>, AppError> {
    info!("POST /account/login - Login attempt for {}", data.user_name);
    let user_name = data.user_name.clone();
    let user = account_service::login(state.users.as_ref(), &state.tokens, data)
        .await
        .map_err(|e| {
            warn!("Login failed for {}: {}", user_name, e);
            e
        })?;
    Ok(Json(user))
}
