//! Bearer-token and admin-role middleware.

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use models::user::Role;
use service::auth::domain::AuthUser;
use tracing::warn;

use crate::errors::JsonApiError;
use crate::state::ServerState;

/// Missing token → 401; a token that fails to verify → 400.
/// On success the caller's `AuthUser` is placed in request extensions.
pub async fn require_auth(State(state): State<ServerState>, mut req: Request, next: Next) -> Result<Response, JsonApiError> {
    let path = req.uri().path().to_string();
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .map(|v| v.to_str().unwrap_or_default().trim().to_string());

    let token = match header_value.as_deref() {
        None | Some("") | Some("Bearer") => {
            warn!(path = %path, "missing bearer token");
            return Err(JsonApiError::new(StatusCode::UNAUTHORIZED, "Access token required", None));
        }
        Some(h) => match h.strip_prefix("Bearer ") {
            Some(t) => t.trim().to_string(),
            None => {
                warn!(path = %path, "invalid Authorization format (expect Bearer)");
                return Err(JsonApiError::bad_request("Invalid token"));
            }
        },
    };

    let caller = state.auth.verify_token(&token).map_err(|e| {
        warn!(path = %path, code = e.code(), error = %e, "token validation failed");
        JsonApiError::bad_request("Invalid token")
    })?;
    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}

/// Must run inside `require_auth`. The role is re-read from the store so a demotion applies immediately.
pub async fn require_admin(State(state): State<ServerState>, req: Request, next: Next) -> Result<Response, JsonApiError> {
    let Some(caller) = req.extensions().get::<AuthUser>().copied() else {
        return Err(JsonApiError::new(StatusCode::UNAUTHORIZED, "Access token required", None));
    };
    match state.users.current_role(caller.id).await? {
        Some(Role::Admin) => Ok(next.run(req).await),
        _ => {
            warn!(user_id = %caller.id, "admin access denied");
            Err(JsonApiError::new(StatusCode::FORBIDDEN, "Admin access required", None))
        }
    }
}
