use chrono::Utc;
use models::errors::is_foreign_key_violation;
use models::{comment, listing, user};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::validation::Validator;
use crate::views::{AuthorSummary, CommentWithAuthor};

pub const MAX_COMMENT_LEN: usize = 500;
pub const CONTENT_MSG: &str = "Comment must be between 1 and 500 characters";
pub const ANNOUNCEMENT_ID_MSG: &str = "Invalid announcement ID";

/// Comment body as posted; `announcementId` stays raw so a bad id becomes a field error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommentPayload {
    pub content: String,
    pub announcement_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateCommentInput {
    pub content: String,
    pub announcement_id: Uuid,
}

fn check_content(v: &mut Validator, content: &str) {
    v.length("content", content, 1, MAX_COMMENT_LEN, CONTENT_MSG);
}

impl TryFrom<CommentPayload> for CreateCommentInput {
    type Error = ServiceError;

    fn try_from(p: CommentPayload) -> Result<Self, Self::Error> {
        let mut v = Validator::new();
        let content = p.content.trim().to_string();
        check_content(&mut v, &content);
        let announcement_id = p.announcement_id.as_deref().and_then(|raw| Uuid::parse_str(raw.trim()).ok());
        v.check(announcement_id.is_some(), "announcementId", ANNOUNCEMENT_ID_MSG);
        v.finish()?;
        Ok(Self { content, announcement_id: announcement_id.unwrap_or_default() })
    }
}

#[derive(Clone)]
pub struct CommentService {
    db: DatabaseConnection,
}

impl CommentService {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    #[instrument(skip(self, input), fields(listing_id = %input.announcement_id))]
    pub async fn create_comment(&self, input: CreateCommentInput, author_id: Uuid) -> Result<CommentWithAuthor, ServiceError> {
        let content = input.content.trim().to_string();
        let mut v = Validator::new();
        check_content(&mut v, &content);
        v.finish()?;
        if listing::Entity::find_by_id(input.announcement_id).one(&self.db).await?.is_none() {
            return Err(ServiceError::not_found("Listing"));
        }

        let am = comment::ActiveModel {
            id: Set(Uuid::new_v4()),
            content: Set(content),
            author_id: Set(author_id),
            announcement_id: Set(input.announcement_id),
            created_at: Set(Utc::now().into()),
        };
        let created = am.insert(&self.db).await.map_err(|e| {
            if is_foreign_key_violation(&e) { ServiceError::not_found("Listing") } else { e.into() }
        })?;
        let author = created.find_related(user::Entity).one(&self.db).await?;
        info!(comment_id = %created.id, "comment_created");
        Ok(CommentWithAuthor { comment: created, author: author.map(AuthorSummary::from) })
    }

    /// Comments on a listing, newest first. An unknown listing yields an empty list.
    pub async fn get_comments(&self, listing_id: Uuid) -> Result<Vec<CommentWithAuthor>, ServiceError> {
        let rows = comment::Entity::find()
            .filter(comment::Column::AnnouncementId.eq(listing_id))
            .find_also_related(user::Entity)
            .order_by_desc(comment::Column::CreatedAt)
            .order_by_desc(comment::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(CommentWithAuthor::from_pair).collect())
    }

    #[instrument(skip(self))]
    pub async fn delete_comment(&self, id: Uuid, caller_id: Uuid) -> Result<(), ServiceError> {
        let existing = comment::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Comment"))?;
        if existing.author_id != caller_id {
            warn!(comment_id = %id, caller_id = %caller_id, "comment_delete_denied");
            return Err(ServiceError::Forbidden("Not authorized to delete this comment".into()));
        }
        existing.delete(&self.db).await?;
        info!(comment_id = %id, "comment_deleted");
        Ok(())
    }
}
