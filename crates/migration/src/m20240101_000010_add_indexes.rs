use sea_orm_migration::prelude::*;

use crate::m20240101_000002_create_listings::Listings;
use crate::m20240101_000003_create_comments::Comments;
use crate::m20240101_000004_create_favorites::Favorites;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Favorites: one row per (user, listing)
        manager
            .create_index(
                Index::create()
                    .name("uniq_favorites_user_listing")
                    .table(Favorites::Table)
                    .col(Favorites::UserId)
                    .col(Favorites::AnnouncementId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_favorites_listing")
                    .table(Favorites::Table)
                    .col(Favorites::AnnouncementId)
                    .to_owned(),
            )
            .await?;

        // Listings: owner lookups and newest-first scans
        manager
            .create_index(
                Index::create()
                    .name("idx_listings_author")
                    .table(Listings::Table)
                    .col(Listings::AuthorId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_listings_created_at")
                    .table(Listings::Table)
                    .col(Listings::CreatedAt)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_listings_date_lost")
                    .table(Listings::Table)
                    .col(Listings::DateLost)
                    .to_owned(),
            )
            .await?;

        // Comments: per-listing and per-author lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_comments_listing")
                    .table(Comments::Table)
                    .col(Comments::AnnouncementId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_comments_author")
                    .table(Comments::Table)
                    .col(Comments::AuthorId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in ["uniq_favorites_user_listing", "idx_favorites_listing"] {
            manager
                .drop_index(Index::drop().name(name).table(Favorites::Table).to_owned())
                .await?;
        }
        for name in ["idx_listings_author", "idx_listings_created_at", "idx_listings_date_lost"] {
            manager
                .drop_index(Index::drop().name(name).table(Listings::Table).to_owned())
                .await?;
        }
        for name in ["idx_comments_listing", "idx_comments_author"] {
            manager
                .drop_index(Index::drop().name(name).table(Comments::Table).to_owned())
                .await?;
        }
        Ok(())
    }
}
