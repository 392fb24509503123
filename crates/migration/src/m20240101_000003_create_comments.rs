//! Create `comments` table with FKs to `users` and `listings`.
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
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(uuid(Comments::Id).primary_key())
                    .col(string_len(Comments::Content, 500).not_null())
                    .col(uuid(Comments::AuthorId).not_null())
                    .col(uuid(Comments::AnnouncementId).not_null())
                    .col(timestamp_with_time_zone(Comments::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_author")
                            .from(Comments::Table, Comments::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_listing")
                            .from(Comments::Table, Comments::AnnouncementId)
                            .to(Listings::Table, Listings::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Comments::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Comments { Table, Id, Content, AuthorId, AnnouncementId, CreatedAt }
