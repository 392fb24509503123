//! Create `favorites` join table between `users` and `listings`.
//! Uniqueness of (user_id, announcement_id) is added with the indexes.
use sea_orm_migration::{prelude::*, schema::*};

use crate::m20240101_000001_create_users::Users;
use crate::m20240101_000002_create_listings::Listings;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Favorites::Table)
                    .if_not_exists()
                    .col(uuid(Favorites::Id).primary_key())
                    .col(uuid(Favorites::UserId).not_null())
                    .col(uuid(Favorites::AnnouncementId).not_null())
                    .col(timestamp_with_time_zone(Favorites::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_favorites_user")
                            .from(Favorites::Table, Favorites::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_favorites_listing")
                            .from(Favorites::Table, Favorites::AnnouncementId)
                            .to(Listings::Table, Listings::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Favorites::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Favorites { Table, Id, UserId, AnnouncementId, CreatedAt }
