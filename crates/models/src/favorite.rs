use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{listing, user};

/// A user's bookmark of a listing. Row existence means "favorited";
/// (user_id, announcement_id) is unique.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "favorites")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub announcement_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
    Listing,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
            Relation::Listing => Entity::belongs_to(listing::Entity)
                .from(Column::AnnouncementId)
                .to(listing::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl Related<listing::Entity> for Entity {
    fn to() -> RelationDef { Relation::Listing.def() }
}

impl ActiveModelBehavior for ActiveModel {}
