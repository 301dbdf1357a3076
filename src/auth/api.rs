//! Authentication API Endpoints
//! Mission: Provide register, login and logout endpoints

use crate::app::AppState;
use crate::auth::{
    middleware::bearer_token,
    models::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserResponse},
};
use crate::error::ApiError;
use crate::extract::ApiJson;
use axum::{extract::State, http::HeaderMap, Json};
use serde_json::{json, Value};
use tracing::info;

/// Register endpoint - POST /users/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    info!("📝 Registration attempt: {}", payload.name);

    let user = state
        .auth
        .register(&payload.name, &payload.email, &payload.pass)?;

    Ok(Json(RegisterResponse {
        msg: "The new user has been registered",
        registered_user: UserResponse::from_user(&user),
    }))
}

/// Login endpoint - POST /users/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let issued = state.auth.login(&payload.email, &payload.pass)?;

    Ok(Json(LoginResponse {
        msg: "Login successful!",
        token: issued.token,
        expires_in: issued.expires_in,
    }))
}

/// Logout endpoint - GET /users/logout
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let token = bearer_token(&headers)?;
    state.auth.logout(token)?;

    Ok(Json(json!({ "msg": "User has been logged out" })))
}
