use axum::{extract::State, http::StatusCode, Json};
use service::auth::domain::{AuthSession, LoginInput, RegisterInput};

use crate::errors::{ApiJson, JsonApiError};
use crate::state::ServerState;

#[utoipa::path(
    post, path = "/auth/register", tag = "auth",
    request_body = crate::openapi::RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = crate::openapi::AuthResponseDoc),
        (status = 400, description = "Invalid body or user already exists", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn register(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<RegisterInput>,
) -> Result<(StatusCode, Json<AuthSession>), JsonApiError> {
    let session = state.auth.register(input).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[utoipa::path(
    post, path = "/auth/login", tag = "auth",
    request_body = crate::openapi::LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = crate::openapi::AuthResponseDoc),
        (status = 400, description = "Invalid body", body = crate::openapi::ErrorDoc),
        (status = 401, description = "Invalid credentials", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn login(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<LoginInput>,
) -> Result<Json<AuthSession>, JsonApiError> {
    Ok(Json(state.auth.login(input).await?))
}
