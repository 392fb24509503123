use std::sync::Arc;

use models::errors::ModelError;
use models::user::{self, Role};
use tracing::{debug, info, instrument};

use super::domain::{AuthSession, AuthUser, LoginInput, RegisterInput, SessionUser, UserRecord};
use super::errors::AuthError;
use super::password::{hash_password, verify_password, HashCost};
use super::repository::AuthRepository;
use super::token::JwtKeys;
use crate::validation::Validator;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Auth service configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub hash_cost: HashCost,
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    keys: JwtKeys,
    cost: HashCost,
}

fn email_errors(v: &mut Validator, email: &str) {
    if let Err(ModelError::Validation(msg)) = user::validate_email(email) {
        v.check(false, "email", &msg);
    }
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self {
        Self { repo, keys: JwtKeys::new(&cfg.jwt_secret, cfg.token_ttl_hours), cost: cfg.hash_cost }
    }

    /// Register a new USER account and open a session for it.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthSession, AuthError> {
        let email = input.email.trim().to_string();
        let mut v = Validator::new();
        email_errors(&mut v, &email);
        v.check(
            input.password.chars().count() >= MIN_PASSWORD_LEN,
            "password",
            "Password must be at least 6 characters long",
        );
        v.fields().map_err(AuthError::Validation)?;

        if self.repo.find_user_by_email(&email).await?.is_some() {
            debug!("email already registered");
            return Err(AuthError::Conflict);
        }
        let hash = hash_password(input.password, self.cost).await?;
        // a concurrent insert surfaces as Conflict from the repository
        let user = self.repo.create_user(&email, hash, Role::User).await?;
        info!(user_id = %user.id, email = %user.email, "user_registered");
        self.session_for(user)
    }

    /// Check credentials and issue a fresh token.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let email = input.email.trim().to_string();
        let mut v = Validator::new();
        email_errors(&mut v, &email);
        v.check(!input.password.is_empty(), "password", "Password is required");
        v.fields().map_err(AuthError::Validation)?;

        let user = self.repo
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::Unauthorized)?;
        if !verify_password(input.password, user.password_hash.clone()).await? {
            return Err(AuthError::Unauthorized);
        }
        info!(user_id = %user.id, "user_logged_in");
        self.session_for(user)
    }

    /// Decode a bearer token into the caller identity.
    pub fn verify_token(&self, token: &str) -> Result<AuthUser, AuthError> {
        self.keys.verify(token)?.auth_user()
    }

    /// Create the account unless the email is already taken. Returns whether a row was inserted.
    #[instrument(skip(self, password))]
    pub async fn ensure_account(&self, email: &str, password: &str, role: Role) -> Result<bool, AuthError> {
        if self.repo.find_user_by_email(email).await?.is_some() {
            return Ok(false);
        }
        let hash = hash_password(password.to_string(), self.cost).await?;
        match self.repo.create_user(email, hash, role).await {
            Ok(user) => {
                info!(user_id = %user.id, role = role.as_str(), "account_seeded");
                Ok(true)
            }
            Err(AuthError::Conflict) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn session_for(&self, user: UserRecord) -> Result<AuthSession, AuthError> {
        let token = self.keys.issue(user.id, user.role)?;
        Ok(AuthSession { token, user: SessionUser { id: user.id, email: user.email } })
    }
}
