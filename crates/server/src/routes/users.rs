use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use models::listing;
use models::user::Role;
use serde::Deserialize;
use service::auth::domain::AuthUser;
use service::errors::ServiceError;
use service::views::{UserProfile, UserStats};
use tracing::info;
use uuid::Uuid;

use crate::errors::{ApiJson, JsonApiError};
use crate::state::ServerState;

#[derive(Debug, Deserialize)]
pub struct RoleUpdate {
    #[serde(default)]
    pub role: String,
}

#[utoipa::path(
    get, path = "/api/users/profile", tag = "users",
    responses(
        (status = 200, description = "Caller's profile", body = crate::openapi::UserProfileDoc),
        (status = 404, description = "User not found", body = crate::openapi::ErrorDoc)
    ),
    security(("bearer_auth" = []))
)]
pub async fn profile(
    State(state): State<ServerState>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<UserProfile>, JsonApiError> {
    Ok(Json(state.users.get_user_by_id(caller.id).await?))
}

#[utoipa::path(
    put, path = "/api/users/profile", tag = "users",
    request_body = crate::openapi::RoleUpdateRequest,
    responses(
        (status = 200, description = "Updated profile", body = crate::openapi::UserProfileDoc),
        (status = 400, description = "Unknown role", body = crate::openapi::ErrorDoc)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    State(state): State<ServerState>,
    Extension(caller): Extension<AuthUser>,
    ApiJson(body): ApiJson<RoleUpdate>,
) -> Result<Json<UserProfile>, JsonApiError> {
    let role = Role::parse(&body.role).map_err(|_| ServiceError::invalid("role", "Role must be USER or ADMIN"))?;
    Ok(Json(state.users.update_user_role(caller.id, role).await?))
}

#[utoipa::path(
    get, path = "/api/users/listings", tag = "users",
    responses((status = 200, description = "Caller's listings, newest first", body = [crate::openapi::ListingDoc])),
    security(("bearer_auth" = []))
)]
pub async fn listings(
    State(state): State<ServerState>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<Vec<listing::Model>>, JsonApiError> {
    Ok(Json(state.users.get_user_listings(caller.id).await?))
}

#[utoipa::path(
    get, path = "/api/users/stats", tag = "admin",
    responses(
        (status = 200, description = "Platform counters", body = crate::openapi::UserStatsDoc),
        (status = 403, description = "Not an admin", body = crate::openapi::ErrorDoc)
    ),
    security(("bearer_auth" = []))
)]
pub async fn stats(State(state): State<ServerState>) -> Result<Json<UserStats>, JsonApiError> {
    Ok(Json(state.users.get_user_stats().await?))
}

#[utoipa::path(
    get, path = "/api/users", tag = "admin",
    responses(
        (status = 200, description = "All users, newest first", body = [crate::openapi::UserProfileDoc]),
        (status = 403, description = "Not an admin", body = crate::openapi::ErrorDoc)
    ),
    security(("bearer_auth" = []))
)]
pub async fn all(State(state): State<ServerState>) -> Result<Json<Vec<UserProfile>>, JsonApiError> {
    Ok(Json(state.users.get_all_users().await?))
}

#[utoipa::path(
    delete, path = "/api/users/{id}", tag = "admin",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User and everything referencing it removed"),
        (status = 403, description = "Not an admin", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete(
    State(state): State<ServerState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    state.users.delete_user_cascade(id).await?;
    info!(admin_id = %caller.id, user_id = %id, "admin deleted user");
    Ok(StatusCode::NO_CONTENT)
}
