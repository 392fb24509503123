use chrono::Utc;
use models::errors::is_foreign_key_violation;
use models::listing::{self, Photos};
use models::{comment, favorite, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::domain::{CreateListingInput, FilterOptions, UpdateListingInput};
use crate::errors::ServiceError;
use crate::pagination::PageWindow;
use crate::txn;
use crate::views::{CommentWithAuthor, ListingDetail, ListingPage, ListingWithAuthor};

#[derive(Clone)]
pub struct ListingService {
    pub(super) db: DatabaseConnection,
}

/// Remove the listings and every favorite and comment referencing them.
pub(crate) async fn purge_listings<C: ConnectionTrait>(conn: &C, ids: &[Uuid]) -> Result<(), DbErr> {
    if ids.is_empty() {
        return Ok(());
    }
    favorite::Entity::delete_many()
        .filter(favorite::Column::AnnouncementId.is_in(ids.iter().copied()))
        .exec(conn)
        .await?;
    comment::Entity::delete_many()
        .filter(comment::Column::AnnouncementId.is_in(ids.iter().copied()))
        .exec(conn)
        .await?;
    listing::Entity::delete_many()
        .filter(listing::Column::Id.is_in(ids.iter().copied()))
        .exec(conn)
        .await?;
    Ok(())
}

impl ListingService {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    async fn find_owned(&self, id: Uuid, caller_id: Uuid, action: &str) -> Result<listing::Model, ServiceError> {
        let existing = listing::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Listing"))?;
        if !existing.is_owned_by(caller_id) {
            warn!(listing_id = %id, caller_id = %caller_id, action, "listing_access_denied");
            return Err(ServiceError::Forbidden(format!("Not authorized to {action} this listing")));
        }
        Ok(existing)
    }

    #[instrument(skip(self, input), fields(author_id = %author_id))]
    pub async fn create_listing(&self, input: CreateListingInput, author_id: Uuid) -> Result<listing::Model, ServiceError> {
        let now = Utc::now().into();
        let am = listing::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(input.title),
            description: Set(input.description),
            animal_type: Set(input.animal_type),
            breed: Set(input.breed),
            location: Set(input.location),
            photos: Set(Photos(input.photos)),
            date_lost: Set(input.date_lost),
            contact_phone: Set(input.contact_phone),
            author_id: Set(author_id),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = am.insert(&self.db).await.map_err(|e| {
            if is_foreign_key_violation(&e) { ServiceError::not_found("User") } else { e.into() }
        })?;
        info!(listing_id = %created.id, "listing_created");
        Ok(created)
    }

    /// Listing with author and newest-first comments.
    pub async fn get_listing_by_id(&self, id: Uuid) -> Result<ListingDetail, ServiceError> {
        let (listing, author) = listing::Entity::find_by_id(id)
            .find_also_related(user::Entity)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Listing"))?;
        let comments = comment::Entity::find()
            .filter(comment::Column::AnnouncementId.eq(id))
            .find_also_related(user::Entity)
            .order_by_desc(comment::Column::CreatedAt)
            .order_by_desc(comment::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(CommentWithAuthor::from_pair)
            .collect();
        Ok(ListingDetail { listing, author: author.map(Into::into), comments })
    }

    #[instrument(skip(self, patch))]
    pub async fn update_listing(&self, id: Uuid, patch: UpdateListingInput, caller_id: Uuid) -> Result<listing::Model, ServiceError> {
        let existing = self.find_owned(id, caller_id, "update").await?;
        let mut am: listing::ActiveModel = existing.into();
        if let Some(v) = patch.title { am.title = Set(v); }
        if let Some(v) = patch.description { am.description = Set(v); }
        if let Some(v) = patch.animal_type { am.animal_type = Set(v); }
        if let Some(v) = patch.breed { am.breed = Set(v); }
        if let Some(v) = patch.location { am.location = Set(v); }
        if let Some(v) = patch.date_lost { am.date_lost = Set(v); }
        if let Some(v) = patch.contact_phone { am.contact_phone = Set(v); }
        if let Some(v) = patch.photos { am.photos = Set(Photos(v)); }
        am.updated_at = Set(Utc::now().into());
        let updated = am.update(&self.db).await?;
        info!(listing_id = %id, "listing_updated");
        Ok(updated)
    }

    /// Owner-only; favorites, comments and the listing go in one transaction.
    #[instrument(skip(self))]
    pub async fn delete_listing(&self, id: Uuid, caller_id: Uuid) -> Result<(), ServiceError> {
        self.find_owned(id, caller_id, "delete").await?;
        let tx = self.db.begin().await?;
        let result = purge_listings(&tx, &[id]).await;
        txn::finish(tx, result).await?;
        info!(listing_id = %id, "listing_deleted");
        Ok(())
    }

    /// Filtered, newest-first page of listings with authors.
    pub async fn get_filtered_listings(&self, filters: FilterOptions) -> Result<ListingPage, ServiceError> {
        let window = PageWindow::from_options(filters.limit, filters.offset)?;
        let cond = filters.condition();

        let count = listing::Entity::find().filter(cond.clone()).count(&self.db);
        let page = listing::Entity::find()
            .filter(cond)
            .find_also_related(user::Entity)
            .order_by_desc(listing::Column::CreatedAt)
            .order_by_desc(listing::Column::Id)
            .offset(window.offset)
            .limit(window.limit)
            .all(&self.db);
        let (total, rows) = tokio::try_join!(count, page)?;

        Ok(ListingPage {
            listings: rows.into_iter().map(ListingWithAuthor::from_pair).collect(),
            total,
            limit: window.limit,
            offset: window.offset,
            has_next: window.has_next(total),
        })
    }
}
