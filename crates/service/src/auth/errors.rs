use thiserror::Error;

use crate::errors::{FieldError, ServiceError};

/// Business errors for auth workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("user already exists")]
    Conflict,
    #[error("invalid credentials")]
    Unauthorized,
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("token error: {0}")]
    TokenError(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 1001,
            AuthError::Conflict => 1002,
            AuthError::Unauthorized => 1004,
            AuthError::InvalidToken(_) => 1005,
            AuthError::HashError(_) => 1101,
            AuthError::TokenError(_) => 1102,
            AuthError::Repository(_) => 1200,
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(fields) => ServiceError::Validation(fields),
            AuthError::Conflict => ServiceError::Conflict("User already exists".into()),
            AuthError::Unauthorized => ServiceError::Unauthorized("Invalid credentials".into()),
            AuthError::InvalidToken(msg) => ServiceError::Unauthorized(msg),
            AuthError::Repository(msg) => ServiceError::Db(msg),
            other @ (AuthError::HashError(_) | AuthError::TokenError(_)) => ServiceError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let all = [
            AuthError::Validation(vec![]),
            AuthError::Conflict,
            AuthError::Unauthorized,
            AuthError::InvalidToken(String::new()),
            AuthError::HashError(String::new()),
            AuthError::TokenError(String::new()),
            AuthError::Repository(String::new()),
        ];
        let mut codes: Vec<u16> = all.iter().map(AuthError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn maps_into_service_errors() {
        assert!(matches!(ServiceError::from(AuthError::Conflict), ServiceError::Conflict(_)));
        assert!(matches!(ServiceError::from(AuthError::Unauthorized), ServiceError::Unauthorized(_)));
        assert!(matches!(ServiceError::from(AuthError::HashError("x".into())), ServiceError::Internal(_)));
    }
}
