//! Startup seeding of the default ADMIN and USER accounts.

use models::user::Role;
use tracing::{info, warn};

use crate::auth::repository::AuthRepository;
use crate::auth::AuthService;

#[derive(Debug, Clone)]
pub struct SeedAccount {
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Ensure each account exists. Failures are logged per account and never abort;
/// returns how many accounts were created.
pub async fn seed_accounts<R: AuthRepository>(auth: &AuthService<R>, accounts: &[SeedAccount]) -> usize {
    let mut created = 0;
    for account in accounts {
        match auth.ensure_account(&account.email, &account.password, account.role).await {
            Ok(true) => created += 1,
            Ok(false) => info!(email = %account.email, "seed account already present"),
            Err(e) => warn!(email = %account.email, code = e.code(), error = %e, "seed account failed"),
        }
    }
    created
}
