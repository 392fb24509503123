//! Serialisable shapes returned by the services; camelCase on the wire.

use chrono::{DateTime, FixedOffset};
use models::user::Role;
use models::{comment, favorite, listing, user};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub email: String,
}

impl From<user::Model> for AuthorSummary {
    fn from(u: user::Model) -> Self { Self { id: u.id, email: u.email } }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingWithAuthor {
    #[serde(flatten)]
    pub listing: listing::Model,
    pub author: Option<AuthorSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    pub comment: comment::Model,
    pub author: Option<AuthorSummary>,
}

impl CommentWithAuthor {
    pub(crate) fn from_pair((comment, author): (comment::Model, Option<user::Model>)) -> Self {
        Self { comment, author: author.map(AuthorSummary::from) }
    }
}

impl ListingWithAuthor {
    pub(crate) fn from_pair((listing, author): (listing::Model, Option<user::Model>)) -> Self {
        Self { listing, author: author.map(AuthorSummary::from) }
    }
}

/// A listing with its author and comments, newest comment first.
#[derive(Debug, Clone, Serialize)]
pub struct ListingDetail {
    #[serde(flatten)]
    pub listing: listing::Model,
    pub author: Option<AuthorSummary>,
    pub comments: Vec<CommentWithAuthor>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
    pub listings: Vec<ListingWithAuthor>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
    pub has_next: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteToggle {
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FavoriteWithListing {
    #[serde(flatten)]
    pub favorite: favorite::Model,
    pub announcement: ListingWithAuthor,
}

/// Account projection without credentials.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<user::Model> for UserProfile {
    fn from(u: user::Model) -> Self {
        Self { id: u.id, email: u.email, role: u.role, created_at: u.created_at, updated_at: u.updated_at }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub users_count: u64,
    pub listings_count: u64,
    pub comments_count: u64,
    pub active_listings: u64,
}
