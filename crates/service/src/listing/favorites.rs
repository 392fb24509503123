use std::collections::HashMap;

use chrono::Utc;
use models::errors::{is_foreign_key_violation, is_unique_violation};
use models::{favorite, listing, user};
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::service::ListingService;
use crate::errors::ServiceError;
use crate::views::{AuthorSummary, FavoriteToggle, FavoriteWithListing, ListingWithAuthor};

impl ListingService {
    /// Delete the favorite if present, create it otherwise.
    #[instrument(skip(self))]
    pub async fn toggle_favorite(&self, user_id: Uuid, listing_id: Uuid) -> Result<FavoriteToggle, ServiceError> {
        if listing::Entity::find_by_id(listing_id).one(&self.db).await?.is_none() {
            return Err(ServiceError::not_found("Listing"));
        }
        let pair = Condition::all()
            .add(favorite::Column::UserId.eq(user_id))
            .add(favorite::Column::AnnouncementId.eq(listing_id));

        let existing = favorite::Entity::find().filter(pair.clone()).one(&self.db).await?;
        let is_favorite = if existing.is_some() {
            favorite::Entity::delete_many().filter(pair).exec(&self.db).await?;
            false
        } else {
            let am = favorite::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user_id),
                announcement_id: Set(listing_id),
                created_at: Set(Utc::now().into()),
            };
            match am.insert(&self.db).await {
                Ok(_) => true,
                // lost a race with a concurrent toggle; the row exists
                Err(e) if is_unique_violation(&e) => {
                    debug!("favorite already present");
                    true
                }
                Err(e) if is_foreign_key_violation(&e) => return Err(ServiceError::not_found("Listing")),
                Err(e) => return Err(e.into()),
            }
        };
        info!(%user_id, %listing_id, is_favorite, "favorite_toggled");
        Ok(FavoriteToggle { is_favorite })
    }

    /// The user's favorites, newest first, each with its listing and the listing's author.
    pub async fn get_user_favorites(&self, user_id: Uuid) -> Result<Vec<FavoriteWithListing>, ServiceError> {
        let rows = favorite::Entity::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .find_also_related(listing::Entity)
            .order_by_desc(favorite::Column::CreatedAt)
            .order_by_desc(favorite::Column::Id)
            .all(&self.db)
            .await?;

        let author_ids: Vec<Uuid> = rows.iter().filter_map(|(_, l)| l.as_ref().map(|l| l.author_id)).collect();
        let authors: HashMap<Uuid, user::Model> = if author_ids.is_empty() {
            HashMap::new()
        } else {
            user::Entity::find()
                .filter(user::Column::Id.is_in(author_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|u| (u.id, u))
                .collect()
        };

        Ok(rows
            .into_iter()
            .filter_map(|(favorite, listing)| {
                let listing = listing?;
                let author = authors.get(&listing.author_id).cloned().map(AuthorSummary::from);
                Some(FavoriteWithListing { favorite, announcement: ListingWithAuthor { listing, author } })
            })
            .collect())
    }
}
