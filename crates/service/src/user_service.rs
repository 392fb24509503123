use chrono::{DateTime, Duration, FixedOffset, Utc};
use models::user::{self, Role};
use models::{comment, favorite, listing};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::listing::service::purge_listings;
use crate::txn;
use crate::views::{UserProfile, UserStats};

/// Window for `activeListings` in the stats.
pub const ACTIVE_LISTING_DAYS: i64 = 30;

#[derive(Clone)]
pub struct UserService {
    db: DatabaseConnection,
}

impl UserService {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    async fn find(&self, id: Uuid) -> Result<user::Model, ServiceError> {
        user::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))
    }

    pub async fn get_user_by_id(&self, id: Uuid) -> Result<UserProfile, ServiceError> {
        Ok(self.find(id).await?.into())
    }

    /// Current role as stored, for admin checks that must not trust the token.
    pub async fn current_role(&self, id: Uuid) -> Result<Option<Role>, ServiceError> {
        let role = user::Entity::find_by_id(id)
            .select_only()
            .column(user::Column::Role)
            .into_tuple::<Role>()
            .one(&self.db)
            .await?;
        Ok(role)
    }

    #[instrument(skip(self))]
    pub async fn update_user_role(&self, id: Uuid, role: Role) -> Result<UserProfile, ServiceError> {
        let mut am: user::ActiveModel = self.find(id).await?.into();
        am.role = Set(role);
        am.updated_at = Set(Utc::now().into());
        let updated = am.update(&self.db).await?;
        info!(user_id = %id, role = role.as_str(), "user_role_updated");
        Ok(updated.into())
    }

    /// Listings authored by the user, newest first.
    pub async fn get_user_listings(&self, user_id: Uuid) -> Result<Vec<listing::Model>, ServiceError> {
        let rows = listing::Entity::find()
            .filter(listing::Column::AuthorId.eq(user_id))
            .order_by_desc(listing::Column::CreatedAt)
            .order_by_desc(listing::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    pub async fn get_user_stats(&self) -> Result<UserStats, ServiceError> {
        let since: DateTime<FixedOffset> = (Utc::now() - Duration::days(ACTIVE_LISTING_DAYS)).into();
        let (users_count, listings_count, comments_count, active_listings) = tokio::try_join!(
            user::Entity::find().count(&self.db),
            listing::Entity::find().count(&self.db),
            comment::Entity::find().count(&self.db),
            listing::Entity::find().filter(listing::Column::CreatedAt.gte(since)).count(&self.db),
        )?;
        Ok(UserStats { users_count, listings_count, comments_count, active_listings })
    }

    pub async fn get_all_users(&self) -> Result<Vec<UserProfile>, ServiceError> {
        let users = user::Entity::find()
            .order_by_desc(user::Column::CreatedAt)
            .order_by_desc(user::Column::Id)
            .all(&self.db)
            .await?;
        Ok(users.into_iter().map(UserProfile::from).collect())
    }

    /// Remove the user and everything that references the user or the user's listings, atomically.
    #[instrument(skip(self))]
    pub async fn delete_user_cascade(&self, user_id: Uuid) -> Result<(), ServiceError> {
        self.find(user_id).await?;
        let tx = self.db.begin().await?;
        let result = purge_user(&tx, user_id).await;
        txn::finish(tx, result).await?;
        info!(user_id = %user_id, "user_deleted_cascade");
        Ok(())
    }
}

async fn purge_user(tx: &DatabaseTransaction, user_id: Uuid) -> Result<(), DbErr> {
    favorite::Entity::delete_many()
        .filter(favorite::Column::UserId.eq(user_id))
        .exec(tx)
        .await?;
    comment::Entity::delete_many()
        .filter(comment::Column::AuthorId.eq(user_id))
        .exec(tx)
        .await?;
    let listing_ids: Vec<Uuid> = listing::Entity::find()
        .select_only()
        .column(listing::Column::Id)
        .filter(listing::Column::AuthorId.eq(user_id))
        .into_tuple()
        .all(tx)
        .await?;
    purge_listings(tx, &listing_ids).await?;
    user::Entity::delete_by_id(user_id).exec(tx).await?;
    Ok(())
}
