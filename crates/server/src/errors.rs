use std::sync::atomic::{AtomicBool, Ordering};

use axum::async_trait;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use service::errors::{FieldError, ServiceError};
use tracing::error;

static EXPOSE_DETAILS: AtomicBool = AtomicBool::new(true);

/// Whether 500 responses carry the underlying error text. Off in production.
pub fn set_expose_details(expose: bool) {
    EXPOSE_DETAILS.store(expose, Ordering::Relaxed);
}

/// The single error responder used by every handler: `{"error": ..., "details"?: [...], "detail"?: ...}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Vec<FieldError>>,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, detail: Option<String>) -> Self {
        Self { status, error: error.into(), details: None, detail }
    }

    pub fn bad_request(error: impl Into<String>) -> Self { Self::new(StatusCode::BAD_REQUEST, error, None) }

    pub fn validation(details: Vec<FieldError>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, error: "Validation failed".into(), details: Some(details), detail: None }
    }

    fn body(&self, expose: bool) -> Value {
        let mut body = json!({ "error": self.error });
        if let Some(details) = &self.details {
            body["details"] = json!(details);
        }
        if let Some(detail) = self.detail.as_ref().filter(|_| expose || !self.status.is_server_error()) {
            body["detail"] = json!(detail);
        }
        body
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(fields) => Self::validation(fields),
            ServiceError::Unauthorized(msg) => Self::new(StatusCode::UNAUTHORIZED, msg, None),
            ServiceError::Forbidden(msg) => Self::new(StatusCode::FORBIDDEN, msg, None),
            ServiceError::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, msg, None),
            ServiceError::Conflict(msg) => Self::new(StatusCode::BAD_REQUEST, msg, None),
            ServiceError::Db(msg) | ServiceError::Internal(msg) => {
                error!(error = %msg, "request failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", Some(msg))
            }
        }
    }
}

impl From<service::auth::errors::AuthError> for JsonApiError {
    fn from(e: service::auth::errors::AuthError) -> Self { ServiceError::from(e).into() }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = self.body(EXPOSE_DETAILS.load(Ordering::Relaxed));
        (self.status, Json(body)).into_response()
    }
}

/// `Json` whose rejection is a 400 `JsonApiError` instead of axum's plain-text reply.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(JsonApiError::new(
                StatusCode::BAD_REQUEST,
                "Invalid request body",
                Some(rejection.body_text()),
            )),
        }
    }
}
