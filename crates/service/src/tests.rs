use std::time::Duration as StdDuration;

use anyhow::Result;
use chrono::{Duration, NaiveDate, Utc};
use models::user::Role;
use models::{comment, favorite, listing};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::auth::domain::{LoginInput, RegisterInput};
use crate::auth::errors::AuthError;
use crate::comment_service::{CommentService, CreateCommentInput};
use crate::errors::ServiceError;
use crate::listing::{CreateListingInput, FilterOptions, ListingService, UpdateListingInput};
use crate::test_support::{auth_service, create_user, get_db, lost_cat};
use crate::user_service::UserService;

fn tick() {
    // created_at ordering needs distinct timestamps
    std::thread::sleep(StdDuration::from_millis(5));
}

fn listing_with(animal_type: &str, location: &str, date: (i32, u32, u32)) -> CreateListingInput {
    CreateListingInput {
        animal_type: animal_type.into(),
        location: location.into(),
        date_lost: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
        ..lost_cat()
    }
}

fn filter() -> FilterOptions { FilterOptions::default() }

#[tokio::test]
async fn create_then_fetch_with_author_and_search_case_insensitively() -> Result<()> {
    let db = get_db().await?;
    let a = create_user(&db, "a@example.com").await?;
    let svc = ListingService::new(db.clone());

    let created = svc.create_listing(lost_cat(), a.id).await?;
    let detail = svc.get_listing_by_id(created.id).await?;
    assert_eq!(detail.listing.title, "Lost cat");
    assert_eq!(detail.author.as_ref().map(|x| x.id), Some(a.id));
    assert!(detail.comments.is_empty());

    let page = svc.get_filtered_listings(FilterOptions { animal_type: Some("CAT".into()), ..filter() }).await?;
    assert_eq!(page.total, 1);
    assert_eq!(page.listings[0].listing.id, created.id);
    assert_eq!(page.listings[0].author.as_ref().map(|x| x.email.as_str()), Some("a@example.com"));

    let json = serde_json::to_value(&detail)?;
    assert_eq!(json["animalType"], "cat");
    assert_eq!(json["dateLost"], "2024-01-01");
    assert_eq!(json["author"]["email"], "a@example.com");
    Ok(())
}

#[tokio::test]
async fn unknown_listing_is_not_found() -> Result<()> {
    let db = get_db().await?;
    let svc = ListingService::new(db);
    assert!(matches!(svc.get_listing_by_id(Uuid::new_v4()).await, Err(ServiceError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn pagination_window_and_has_next() -> Result<()> {
    let db = get_db().await?;
    let a = create_user(&db, "p@example.com").await?;
    let svc = ListingService::new(db);
    let mut ids = Vec::new();
    for _ in 0..3 {
        ids.push(svc.create_listing(lost_cat(), a.id).await?.id);
        tick();
    }

    let first = svc.get_filtered_listings(FilterOptions { limit: Some(2), ..filter() }).await?;
    assert_eq!((first.total, first.listings.len(), first.has_next), (3, 2, true));
    assert_eq!(first.listings[0].listing.id, ids[2], "newest first");

    let second = svc.get_filtered_listings(FilterOptions { limit: Some(2), offset: Some(2), ..filter() }).await?;
    assert_eq!((second.listings.len(), second.has_next, second.offset), (1, false, 2));
    assert_eq!(second.listings[0].listing.id, ids[0]);

    let beyond = svc.get_filtered_listings(FilterOptions { offset: Some(10), ..filter() }).await?;
    assert!(beyond.listings.is_empty());
    assert_eq!(beyond.limit, 10);

    assert!(matches!(
        svc.get_filtered_listings(FilterOptions { limit: Some(0), ..filter() }).await,
        Err(ServiceError::Validation(_))
    ));
    Ok(())
}

#[tokio::test]
async fn pages_are_stable_when_timestamps_tie() -> Result<()> {
    let db = get_db().await?;
    let a = create_user(&db, "tie@example.com").await?;
    let svc = ListingService::new(db.clone());
    let mut ids = Vec::new();
    for _ in 0..5 {
        ids.push(svc.create_listing(lost_cat(), a.id).await?.id);
    }
    let same_instant: DateTimeWithTimeZone = Utc::now().into();
    listing::Entity::update_many()
        .col_expr(listing::Column::CreatedAt, Expr::value(same_instant))
        .exec(&db)
        .await?;

    let mut paged = Vec::new();
    for offset in [0, 2, 4] {
        let page = svc.get_filtered_listings(FilterOptions { limit: Some(2), offset: Some(offset), ..filter() }).await?;
        paged.extend(page.listings.into_iter().map(|l| l.listing.id));
    }
    ids.sort_unstable_by(|x, y| y.cmp(x));
    assert_eq!(paged, ids, "every listing exactly once, id breaks the tie");
    Ok(())
}

#[tokio::test]
async fn location_filter_is_substring_and_literal() -> Result<()> {
    let db = get_db().await?;
    let a = create_user(&db, "l@example.com").await?;
    let svc = ListingService::new(db);
    svc.create_listing(listing_with("dog", "North Springfield", (2024, 1, 1)), a.id).await?;
    svc.create_listing(listing_with("dog", "100% Park", (2024, 1, 1)), a.id).await?;
    svc.create_listing(listing_with("dog", "Shelbyville", (2024, 1, 1)), a.id).await?;

    let page = svc.get_filtered_listings(FilterOptions { location: Some("springFIELD".into()), ..filter() }).await?;
    assert_eq!(page.total, 1);
    let page = svc.get_filtered_listings(FilterOptions { location: Some("%".into()), ..filter() }).await?;
    assert_eq!(page.total, 1);
    assert_eq!(page.listings[0].listing.location, "100% Park");
    let page = svc.get_filtered_listings(FilterOptions { location: Some("_".into()), ..filter() }).await?;
    assert_eq!(page.total, 0);
    Ok(())
}

#[tokio::test]
async fn date_range_is_inclusive() -> Result<()> {
    let db = get_db().await?;
    let a = create_user(&db, "d@example.com").await?;
    let svc = ListingService::new(db);
    for day in [1, 5, 10] {
        svc.create_listing(listing_with("cat", "Springfield", (2024, 3, day)), a.id).await?;
    }
    let page = svc
        .get_filtered_listings(FilterOptions {
            date_from: NaiveDate::from_ymd_opt(2024, 3, 1),
            date_to: NaiveDate::from_ymd_opt(2024, 3, 5),
            ..filter()
        })
        .await?;
    assert_eq!(page.total, 2);
    let page = svc
        .get_filtered_listings(FilterOptions { date_from: NaiveDate::from_ymd_opt(2024, 3, 10), ..filter() })
        .await?;
    assert_eq!(page.total, 1);
    Ok(())
}

#[tokio::test]
async fn update_requires_ownership() -> Result<()> {
    let db = get_db().await?;
    let owner = create_user(&db, "owner@example.com").await?;
    let other = create_user(&db, "other@example.com").await?;
    let svc = ListingService::new(db);
    let created = svc.create_listing(lost_cat(), owner.id).await?;
    let patch = UpdateListingInput { title: Some("Found cat".into()), photos: Some(vec!["/uploads/x.jpg".into()]), ..Default::default() };

    let denied = svc.update_listing(created.id, patch.clone(), other.id).await;
    assert!(matches!(denied, Err(ServiceError::Forbidden(_))));
    assert_eq!(svc.get_listing_by_id(created.id).await?.listing.title, "Lost cat");

    let missing = svc.update_listing(Uuid::new_v4(), patch.clone(), owner.id).await;
    assert!(matches!(missing, Err(ServiceError::NotFound(_))));

    let updated = svc.update_listing(created.id, patch, owner.id).await?;
    assert_eq!(updated.title, "Found cat");
    assert_eq!(updated.description, "Grey tabby");
    let stored = svc.get_listing_by_id(created.id).await?.listing;
    assert_eq!(stored.title, "Found cat");
    assert_eq!(stored.photos.0, vec!["/uploads/x.jpg"]);
    Ok(())
}

#[tokio::test]
async fn delete_requires_ownership_and_removes_dependents() -> Result<()> {
    let db = get_db().await?;
    let owner = create_user(&db, "owner@example.com").await?;
    let other = create_user(&db, "other@example.com").await?;
    let listings = ListingService::new(db.clone());
    let comments = CommentService::new(db.clone());
    let created = listings.create_listing(lost_cat(), owner.id).await?;
    comments
        .create_comment(CreateCommentInput { content: "Seen it".into(), announcement_id: created.id }, other.id)
        .await?;
    listings.toggle_favorite(other.id, created.id).await?;

    assert!(matches!(listings.delete_listing(created.id, other.id).await, Err(ServiceError::Forbidden(_))));
    listings.delete_listing(created.id, owner.id).await?;

    assert!(matches!(listings.get_listing_by_id(created.id).await, Err(ServiceError::NotFound(_))));
    assert_eq!(comment::Entity::find().count(&db).await?, 0);
    assert_eq!(favorite::Entity::find().count(&db).await?, 0);
    assert!(matches!(listings.delete_listing(created.id, owner.id).await, Err(ServiceError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn toggle_favorite_alternates_without_duplicates() -> Result<()> {
    let db = get_db().await?;
    let u = create_user(&db, "fan@example.com").await?;
    let svc = ListingService::new(db.clone());
    let l = svc.create_listing(lost_cat(), u.id).await?;

    let mut seen = Vec::new();
    for _ in 0..3 {
        seen.push(svc.toggle_favorite(u.id, l.id).await?.is_favorite);
        let rows = favorite::Entity::find()
            .filter(favorite::Column::UserId.eq(u.id))
            .count(&db)
            .await?;
        assert!(rows <= 1);
    }
    assert_eq!(seen, vec![true, false, true]);

    let favs = svc.get_user_favorites(u.id).await?;
    assert_eq!(favs.len(), 1);
    assert_eq!(favs[0].announcement.listing.id, l.id);
    assert_eq!(favs[0].announcement.author.as_ref().map(|a| a.id), Some(u.id));

    assert!(matches!(svc.toggle_favorite(u.id, Uuid::new_v4()).await, Err(ServiceError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn toggle_favorite_reports_favorited_when_insert_loses_race() -> Result<()> {
    let db = get_db().await?;
    let u = create_user(&db, "racer@example.com").await?;
    let svc = ListingService::new(db.clone());
    let l = svc.create_listing(lost_cat(), u.id).await?;
    // a concurrent toggle lands the same pair between the lookup and our insert
    db.execute_unprepared(
        "CREATE TRIGGER favorite_race BEFORE INSERT ON favorites \
         WHEN NOT EXISTS (SELECT 1 FROM favorites WHERE user_id = NEW.user_id AND announcement_id = NEW.announcement_id) \
         BEGIN INSERT INTO favorites (id, user_id, announcement_id, created_at) \
         VALUES (randomblob(16), NEW.user_id, NEW.announcement_id, NEW.created_at); END;",
    )
    .await?;

    let toggled = svc.toggle_favorite(u.id, l.id).await?;
    assert!(toggled.is_favorite);
    let rows = favorite::Entity::find()
        .filter(favorite::Column::UserId.eq(u.id))
        .filter(favorite::Column::AnnouncementId.eq(l.id))
        .count(&db)
        .await?;
    assert!(rows <= 1);
    Ok(())
}

#[tokio::test]
async fn toggle_favorite_on_listing_deleted_mid_insert_is_not_found() -> Result<()> {
    let db = get_db().await?;
    let u = create_user(&db, "late@example.com").await?;
    let svc = ListingService::new(db.clone());
    let l = svc.create_listing(lost_cat(), u.id).await?;
    db.execute_unprepared(
        "CREATE TRIGGER listing_vanishes BEFORE INSERT ON favorites \
         BEGIN DELETE FROM listings WHERE id = NEW.announcement_id; END;",
    )
    .await?;

    let err = svc.toggle_favorite(u.id, l.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)), "unexpected error: {err:?}");
    assert_eq!(favorite::Entity::find().count(&db).await?, 0);
    Ok(())
}

#[tokio::test]
async fn comments_validate_and_enforce_authorship() -> Result<()> {
    let db = get_db().await?;
    let author = create_user(&db, "author@example.com").await?;
    let other = create_user(&db, "other@example.com").await?;
    let l = ListingService::new(db.clone()).create_listing(lost_cat(), author.id).await?;
    let svc = CommentService::new(db.clone());

    let empty = svc.create_comment(CreateCommentInput { content: "  ".into(), announcement_id: l.id }, author.id).await;
    assert!(matches!(empty, Err(ServiceError::Validation(_))));
    let long = svc.create_comment(CreateCommentInput { content: "x".repeat(501), announcement_id: l.id }, author.id).await;
    assert!(matches!(long, Err(ServiceError::Validation(_))));
    let orphan = svc.create_comment(CreateCommentInput { content: "hi".into(), announcement_id: Uuid::new_v4() }, author.id).await;
    assert!(matches!(orphan, Err(ServiceError::NotFound(_))));

    let first = svc.create_comment(CreateCommentInput { content: "first".into(), announcement_id: l.id }, author.id).await?;
    assert_eq!(first.author.as_ref().map(|a| a.email.as_str()), Some("author@example.com"));
    tick();
    svc.create_comment(CreateCommentInput { content: "second".into(), announcement_id: l.id }, other.id).await?;

    let listed = svc.get_comments(l.id).await?;
    let contents: Vec<_> = listed.iter().map(|c| c.comment.content.as_str()).collect();
    assert_eq!(contents, vec!["second", "first"]);

    assert!(matches!(svc.delete_comment(first.comment.id, other.id).await, Err(ServiceError::Forbidden(_))));
    svc.delete_comment(first.comment.id, author.id).await?;
    assert!(comment::Entity::find_by_id(first.comment.id).one(&db).await?.is_none());
    assert!(matches!(svc.delete_comment(first.comment.id, author.id).await, Err(ServiceError::NotFound(_))));
    assert!(svc.get_comments(Uuid::new_v4()).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn profile_role_and_listing_queries() -> Result<()> {
    let db = get_db().await?;
    let u = create_user(&db, "me@example.com").await?;
    let other = create_user(&db, "you@example.com").await?;
    let listings = ListingService::new(db.clone());
    listings.create_listing(lost_cat(), u.id).await?;
    listings.create_listing(lost_cat(), other.id).await?;
    let svc = UserService::new(db.clone());

    let profile = svc.get_user_by_id(u.id).await?;
    assert_eq!((profile.email.as_str(), profile.role), ("me@example.com", Role::User));
    let json = serde_json::to_value(&profile)?;
    assert!(json.get("passwordHash").is_none());
    assert_eq!(json["role"], "USER");

    let promoted = svc.update_user_role(u.id, Role::Admin).await?;
    assert_eq!(promoted.role, Role::Admin);
    assert_eq!(svc.current_role(u.id).await?, Some(Role::Admin));
    assert_eq!(svc.current_role(Uuid::new_v4()).await?, None);
    assert!(matches!(svc.update_user_role(Uuid::new_v4(), Role::User).await, Err(ServiceError::NotFound(_))));

    let mine = svc.get_user_listings(u.id).await?;
    assert_eq!(mine.len(), 1);
    assert!(mine.iter().all(|l| l.author_id == u.id));
    assert_eq!(svc.get_all_users().await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn stats_count_recent_listings_only() -> Result<()> {
    let db = get_db().await?;
    let u = create_user(&db, "stats@example.com").await?;
    let listings = ListingService::new(db.clone());
    listings.create_listing(lost_cat(), u.id).await?;
    let old = listings.create_listing(lost_cat(), u.id).await?;
    let mut am: listing::ActiveModel = old.into();
    am.created_at = Set((Utc::now() - Duration::days(45)).into());
    am.update(&db).await?;
    CommentService::new(db.clone())
        .create_comment(CreateCommentInput { content: "hi".into(), announcement_id: am_id(&db).await? }, u.id)
        .await?;

    let stats = UserService::new(db).get_user_stats().await?;
    assert_eq!(stats.users_count, 1);
    assert_eq!(stats.listings_count, 2);
    assert_eq!(stats.comments_count, 1);
    assert_eq!(stats.active_listings, 1);
    let json = serde_json::to_value(stats)?;
    assert_eq!(json["activeListings"], 1);
    Ok(())
}

async fn am_id(db: &sea_orm::DatabaseConnection) -> Result<Uuid> {
    let first = listing::Entity::find().one(db).await?.ok_or_else(|| anyhow::anyhow!("no listing"))?;
    Ok(first.id)
}

#[tokio::test]
async fn cascade_delete_leaves_no_references() -> Result<()> {
    let db = get_db().await?;
    let victim = create_user(&db, "victim@example.com").await?;
    let bystander = create_user(&db, "bystander@example.com").await?;
    let listings = ListingService::new(db.clone());
    let comments = CommentService::new(db.clone());

    let own = listings.create_listing(lost_cat(), victim.id).await?;
    let theirs = listings.create_listing(lost_cat(), bystander.id).await?;
    comments.create_comment(CreateCommentInput { content: "mine".into(), announcement_id: theirs.id }, victim.id).await?;
    comments.create_comment(CreateCommentInput { content: "on victim".into(), announcement_id: own.id }, bystander.id).await?;
    listings.toggle_favorite(victim.id, theirs.id).await?;
    listings.toggle_favorite(bystander.id, own.id).await?;

    let svc = UserService::new(db.clone());
    svc.delete_user_cascade(victim.id).await?;

    assert!(matches!(svc.get_user_by_id(victim.id).await, Err(ServiceError::NotFound(_))));
    assert_eq!(listing::Entity::find().filter(listing::Column::AuthorId.eq(victim.id)).count(&db).await?, 0);
    assert_eq!(comment::Entity::find().count(&db).await?, 0);
    assert_eq!(favorite::Entity::find().count(&db).await?, 0);
    assert_eq!(listing::Entity::find().count(&db).await?, 1);
    assert!(matches!(svc.delete_user_cascade(victim.id).await, Err(ServiceError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn cascade_delete_rolls_back_on_failure() -> Result<()> {
    let db = get_db().await?;
    let victim = create_user(&db, "victim@example.com").await?;
    let listings = ListingService::new(db.clone());
    let own = listings.create_listing(lost_cat(), victim.id).await?;
    listings.toggle_favorite(victim.id, own.id).await?;
    db.execute_unprepared(
        "CREATE TRIGGER block_user_delete BEFORE DELETE ON users BEGIN SELECT RAISE(ABORT, 'blocked'); END;",
    )
    .await?;

    let err = UserService::new(db.clone()).delete_user_cascade(victim.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Db(_)), "unexpected error: {err:?}");
    assert_eq!(listing::Entity::find().count(&db).await?, 1);
    assert_eq!(favorite::Entity::find().count(&db).await?, 1);
    Ok(())
}

#[tokio::test]
async fn register_and_login_against_the_database() -> Result<()> {
    let db = get_db().await?;
    let auth = auth_service(&db);
    let input = RegisterInput { email: "new@example.com".into(), password: "secret1".into() };

    let session = auth.register(input.clone()).await?;
    assert!(matches!(auth.register(input).await, Err(AuthError::Conflict)));

    let login = auth.login(LoginInput { email: "new@example.com".into(), password: "secret1".into() }).await?;
    assert_eq!(auth.verify_token(&login.token)?.id, session.user.id);
    let stored = models::user::find_by_email(&db, "new@example.com").await?.unwrap();
    assert_ne!(stored.password_hash, "secret1");
    assert_eq!(stored.role, Role::User);
    Ok(())
}
