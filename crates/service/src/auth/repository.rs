use async_trait::async_trait;
use models::user::Role;

use super::domain::UserRecord;
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError>;
    /// Must return `AuthError::Conflict` when the email is already taken.
    async fn create_user(&self, email: &str, password_hash: String, role: Role) -> Result<UserRecord, AuthError>;
}

/// Simple in-memory mock repository for tests
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<String, UserRecord>>, // key: email
    }

    impl MockAuthRepository {
        pub fn len(&self) -> usize {
            self.users.lock().map(|u| u.len()).unwrap_or(0)
        }

        pub fn is_empty(&self) -> bool { self.len() == 0 }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
            let users = self.users.lock().map_err(|e| AuthError::Repository(e.to_string()))?;
            Ok(users.get(email).cloned())
        }

        async fn create_user(&self, email: &str, password_hash: String, role: Role) -> Result<UserRecord, AuthError> {
            let mut users = self.users.lock().map_err(|e| AuthError::Repository(e.to_string()))?;
            if users.contains_key(email) {
                return Err(AuthError::Conflict);
            }
            let user = UserRecord { id: Uuid::new_v4(), email: email.to_string(), role, password_hash };
            users.insert(email.to_string(), user.clone());
            Ok(user)
        }
    }
}
