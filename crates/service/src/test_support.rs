#![cfg(test)]
use std::sync::Arc;

use anyhow::Result;
use migration::MigratorTrait;
use models::user::{self, Role};
use sea_orm::DatabaseConnection;

use crate::auth::password::HashCost;
use crate::auth::repo::SeaOrmAuthRepository;
use crate::auth::{AuthConfig, AuthService};
use crate::listing::CreateListingInput;

/// Fresh in-memory database with the full schema.
pub async fn get_db() -> Result<DatabaseConnection> {
    let db = models::db::connect_in_memory().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

pub async fn create_user(db: &DatabaseConnection, email: &str) -> Result<user::Model> {
    Ok(user::create(db, email, "not-a-real-hash".into(), Role::User).await?)
}

pub fn auth_service(db: &DatabaseConnection) -> AuthService<SeaOrmAuthRepository> {
    let cfg = AuthConfig {
        jwt_secret: "test-secret".into(),
        token_ttl_hours: 24,
        hash_cost: HashCost { memory_kib: 1024, iterations: 1 },
    };
    AuthService::new(Arc::new(SeaOrmAuthRepository::new(db.clone())), cfg)
}

pub fn lost_cat() -> CreateListingInput {
    CreateListingInput {
        title: "Lost cat".into(),
        description: "Grey tabby".into(),
        animal_type: "cat".into(),
        breed: None,
        location: "Springfield".into(),
        date_lost: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        contact_phone: "5551234567".into(),
        photos: vec![],
    }
}
