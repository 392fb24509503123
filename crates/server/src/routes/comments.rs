use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use service::auth::domain::AuthUser;
use service::comment_service::{CommentPayload, CreateCommentInput};
use service::views::CommentWithAuthor;
use uuid::Uuid;

use crate::errors::{ApiJson, JsonApiError};
use crate::state::ServerState;

#[utoipa::path(
    post, path = "/api/comments", tag = "comments",
    request_body = crate::openapi::CreateCommentRequest,
    responses(
        (status = 201, description = "Created", body = crate::openapi::CommentDoc),
        (status = 400, description = "Validation failed", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Listing not found", body = crate::openapi::ErrorDoc)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create(
    State(state): State<ServerState>,
    Extension(caller): Extension<AuthUser>,
    ApiJson(payload): ApiJson<CommentPayload>,
) -> Result<(StatusCode, Json<CommentWithAuthor>), JsonApiError> {
    let input = CreateCommentInput::try_from(payload)?;
    let created = state.comments.create_comment(input, caller.id).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `id` is the listing id here.
#[utoipa::path(
    get, path = "/api/comments/{id}", tag = "comments",
    params(("id" = Uuid, Path, description = "Listing ID")),
    responses((status = 200, description = "Comments, newest first", body = [crate::openapi::CommentDoc]))
)]
pub async fn for_listing(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<Json<Vec<CommentWithAuthor>>, JsonApiError> {
    Ok(Json(state.comments.get_comments(id).await?))
}

#[utoipa::path(
    delete, path = "/api/comments/{id}", tag = "comments",
    params(("id" = Uuid, Path, description = "Comment ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the author", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete(
    State(state): State<ServerState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    state.comments.delete_comment(id, caller.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
