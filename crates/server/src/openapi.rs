use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ErrorDoc {
    pub error: String,
    /// Present on validation failures
    pub details: Option<Vec<FieldErrorDoc>>,
    /// Present outside production on 500s
    pub detail: Option<String>,
}

#[derive(ToSchema)]
pub struct FieldErrorDoc { pub field: String, pub message: String }

#[derive(ToSchema)]
pub struct RegisterRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct SessionUserDoc { pub id: Uuid, pub email: String }

#[derive(ToSchema)]
pub struct AuthResponseDoc { pub token: String, pub user: SessionUserDoc }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ListingInputDoc {
    pub title: Option<String>,
    pub description: Option<String>,
    pub animal_type: Option<String>,
    pub breed: Option<String>,
    pub location: Option<String>,
    /// YYYY-MM-DD
    pub date_lost: Option<String>,
    pub contact_phone: Option<String>,
    pub photos: Option<Vec<String>>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ListingDoc {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub animal_type: String,
    pub breed: Option<String>,
    pub location: String,
    pub photos: Vec<String>,
    pub date_lost: String,
    pub contact_phone: String,
    pub author_id: Uuid,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(ToSchema)]
pub struct AuthorDoc { pub id: Uuid, pub email: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ListingWithAuthorDoc {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub animal_type: String,
    pub breed: Option<String>,
    pub location: String,
    pub photos: Vec<String>,
    pub date_lost: String,
    pub contact_phone: String,
    pub author_id: Uuid,
    pub created_at: String,
    pub updated_at: String,
    pub author: Option<AuthorDoc>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct CommentDoc {
    pub id: Uuid,
    pub content: String,
    pub author_id: Uuid,
    pub announcement_id: Uuid,
    pub created_at: String,
    pub author: Option<AuthorDoc>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ListingDetailDoc {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub animal_type: String,
    pub breed: Option<String>,
    pub location: String,
    pub photos: Vec<String>,
    pub date_lost: String,
    pub contact_phone: String,
    pub author_id: Uuid,
    pub created_at: String,
    pub updated_at: String,
    pub author: Option<AuthorDoc>,
    pub comments: Vec<CommentDoc>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ListingPageDoc {
    pub listings: Vec<ListingWithAuthorDoc>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
    pub has_next: bool,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct FavoriteToggleDoc { pub is_favorite: bool }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct FavoriteDoc {
    pub id: Uuid,
    pub user_id: Uuid,
    pub announcement_id: Uuid,
    pub created_at: String,
    pub announcement: ListingWithAuthorDoc,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct CreateCommentRequest { pub content: String, pub announcement_id: Uuid }

#[derive(ToSchema)]
pub struct RoleUpdateRequest {
    /// USER or ADMIN, case-insensitive
    pub role: String,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct UserProfileDoc {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct UserStatsDoc {
    pub users_count: u64,
    pub listings_count: u64,
    pub comments_count: u64,
    pub active_listings: u64,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::listings::list,
        crate::routes::listings::create,
        crate::routes::listings::get,
        crate::routes::listings::update,
        crate::routes::listings::delete,
        crate::routes::listings::mine,
        crate::routes::listings::toggle_favorite,
        crate::routes::listings::favorites,
        crate::routes::comments::create,
        crate::routes::comments::for_listing,
        crate::routes::comments::delete,
        crate::routes::users::profile,
        crate::routes::users::update_profile,
        crate::routes::users::listings,
        crate::routes::users::stats,
        crate::routes::users::all,
        crate::routes::users::delete,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorDoc,
            FieldErrorDoc,
            RegisterRequest,
            LoginRequest,
            SessionUserDoc,
            AuthResponseDoc,
            ListingInputDoc,
            ListingDoc,
            AuthorDoc,
            ListingWithAuthorDoc,
            CommentDoc,
            ListingDetailDoc,
            ListingPageDoc,
            FavoriteToggleDoc,
            FavoriteDoc,
            CreateCommentRequest,
            RoleUpdateRequest,
            UserProfileDoc,
            UserStatsDoc,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "listings"),
        (name = "favorites"),
        (name = "comments"),
        (name = "users"),
        (name = "admin")
    )
)]
pub struct ApiDoc;
