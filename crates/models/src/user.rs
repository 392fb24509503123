use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::{comment, favorite, listing};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Role {
    #[default]
    #[sea_orm(string_value = "USER")]
    #[serde(rename = "USER", alias = "user")]
    User,
    #[sea_orm(string_value = "ADMIN")]
    #[serde(rename = "ADMIN", alias = "admin")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ModelError> {
        match value.trim().to_ascii_uppercase().as_str() {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(ModelError::Validation(format!("unknown role: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Listings,
    Comments,
    Favorites,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Listings => Entity::has_many(listing::Entity).into(),
            Relation::Comments => Entity::has_many(comment::Entity).into(),
            Relation::Favorites => Entity::has_many(favorite::Entity).into(),
        }
    }
}

impl Related<listing::Entity> for Entity {
    fn to() -> RelationDef { Relation::Listings.def() }
}

impl Related<comment::Entity> for Entity {
    fn to() -> RelationDef { Relation::Comments.def() }
}

impl Related<favorite::Entity> for Entity {
    fn to() -> RelationDef { Relation::Favorites.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ModelError::Validation("Invalid email format".into()));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') || email.contains(char::is_whitespace) {
        return Err(ModelError::Validation("Invalid email format".into()));
    }
    Ok(())
}

pub async fn find_by_email<C: ConnectionTrait>(db: &C, email: &str) -> Result<Option<Model>, ModelError> {
    let found = Entity::find()
        .filter(Column::Email.eq(email.to_string()))
        .one(db)
        .await?;
    Ok(found)
}

/// Insert a user with an already-hashed password. A duplicate email surfaces as the raw `DbErr`
/// so callers can tell unique violations apart.
pub async fn create<C: ConnectionTrait>(db: &C, email: &str, password_hash: String, role: Role) -> Result<Model, DbErr> {
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        role: Set(role),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await
}
