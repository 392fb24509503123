use models::errors::is_unique_violation;
use models::user::{self, Role};
use sea_orm::DatabaseConnection;

use crate::auth::domain::UserRecord;
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmAuthRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn to_record(u: user::Model) -> UserRecord {
    UserRecord { id: u.id, email: u.email, role: u.role, password_hash: u.password_hash }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
        let found = user::find_by_email(&self.db, email)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(found.map(to_record))
    }

    async fn create_user(&self, email: &str, password_hash: String, role: Role) -> Result<UserRecord, AuthError> {
        match user::create(&self.db, email, password_hash, role).await {
            Ok(created) => Ok(to_record(created)),
            Err(e) if is_unique_violation(&e) => Err(AuthError::Conflict),
            Err(e) => Err(AuthError::Repository(e.to_string())),
        }
    }
}
