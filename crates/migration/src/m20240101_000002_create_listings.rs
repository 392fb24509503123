//! Create `listings` table with FK to `users`.
//!
//! Dependent rows are removed by the application inside a transaction, so the
//! FK restricts instead of cascading.
use sea_orm_migration::{prelude::*, schema::*};

use crate::m20240101_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Listings::Table)
                    .if_not_exists()
                    .col(uuid(Listings::Id).primary_key())
                    .col(string_len(Listings::Title, 200).not_null())
                    .col(text(Listings::Description).not_null())
                    .col(string_len(Listings::AnimalType, 64).not_null())
                    .col(
                        ColumnDef::new(Listings::Breed)
                            .string_len(128)
                            .null(),
                    )
                    .col(string_len(Listings::Location, 255).not_null())
                    .col(json_binary(Listings::Photos).not_null())
                    .col(date(Listings::DateLost).not_null())
                    .col(string_len(Listings::ContactPhone, 32).not_null())
                    .col(uuid(Listings::AuthorId).not_null())
                    .col(timestamp_with_time_zone(Listings::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Listings::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_listings_author")
                            .from(Listings::Table, Listings::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Listings::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Listings {
    Table,
    Id,
    Title,
    Description,
    AnimalType,
    Breed,
    Location,
    Photos,
    DateLost,
    ContactPhone,
    AuthorId,
    CreatedAt,
    UpdatedAt,
}
