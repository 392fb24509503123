use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use models::listing;
use serde::Deserialize;
use service::auth::domain::AuthUser;
use service::errors::FieldError;
use service::listing::domain::parse_date;
use service::listing::{CreateListingInput, FilterOptions, UpdateListingInput};
use service::views::{FavoriteToggle, FavoriteWithListing, ListingDetail, ListingPage};
use utoipa::IntoParams;
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::state::ServerState;
use crate::uploads::ListingForm;

/// Query string of `GET /api/listings`; parsed by hand so bad values become field errors.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListingQuery {
    /// Case-insensitive substring
    pub animal_type: Option<String>,
    /// Case-insensitive substring
    pub location: Option<String>,
    /// Inclusive lower bound on dateLost (YYYY-MM-DD)
    pub date_from: Option<String>,
    /// Inclusive upper bound on dateLost (YYYY-MM-DD)
    pub date_to: Option<String>,
    /// 1..=100, default 10
    pub limit: Option<String>,
    /// Default 0
    pub offset: Option<String>,
}

fn blank_to_none(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

impl ListingQuery {
    pub fn into_filters(self) -> Result<FilterOptions, JsonApiError> {
        let mut errors = Vec::new();
        let mut date = |field: &str, raw: Option<String>| {
            let raw = blank_to_none(raw)?;
            let parsed = parse_date(&raw);
            if parsed.is_none() {
                errors.push(FieldError::new(field, "Invalid date format"));
            }
            parsed
        };
        let date_from = date("dateFrom", self.date_from);
        let date_to = date("dateTo", self.date_to);

        let mut number = |field: &str, raw: Option<String>, message: &str| {
            let raw = blank_to_none(raw)?;
            let parsed = raw.trim().parse::<u64>().ok();
            if parsed.is_none() {
                errors.push(FieldError::new(field, message));
            }
            parsed
        };
        let limit = number("limit", self.limit, "Limit must be between 1 and 100");
        let offset = number("offset", self.offset, "Offset must be a non-negative integer");

        if !errors.is_empty() {
            return Err(JsonApiError::validation(errors));
        }
        Ok(FilterOptions {
            animal_type: blank_to_none(self.animal_type),
            location: blank_to_none(self.location),
            date_from,
            date_to,
            limit,
            offset,
        })
    }
}

#[utoipa::path(
    get, path = "/api/listings", tag = "listings",
    params(ListingQuery),
    responses(
        (status = 200, description = "Filtered page, newest first", body = crate::openapi::ListingPageDoc),
        (status = 400, description = "Invalid filter", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn list(State(state): State<ServerState>, Query(q): Query<ListingQuery>) -> Result<Json<ListingPage>, JsonApiError> {
    let filters = q.into_filters()?;
    Ok(Json(state.listings.get_filtered_listings(filters).await?))
}

#[utoipa::path(
    post, path = "/api/listings", tag = "listings",
    request_body(content = crate::openapi::ListingInputDoc, description = "JSON, or multipart/form-data with up to 5 `photos` files"),
    responses(
        (status = 201, description = "Created", body = crate::openapi::ListingDoc),
        (status = 400, description = "Validation failed", body = crate::openapi::ErrorDoc),
        (status = 401, description = "Missing token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create(
    State(state): State<ServerState>,
    Extension(caller): Extension<AuthUser>,
    ListingForm(payload): ListingForm,
) -> Result<(StatusCode, Json<listing::Model>), JsonApiError> {
    let input = CreateListingInput::try_from(payload)?;
    let created = state.listings.create_listing(input, caller.id).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/api/listings/{id}", tag = "listings",
    params(("id" = Uuid, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "Listing with author and comments", body = crate::openapi::ListingDetailDoc),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<Json<ListingDetail>, JsonApiError> {
    Ok(Json(state.listings.get_listing_by_id(id).await?))
}

#[utoipa::path(
    put, path = "/api/listings/{id}", tag = "listings",
    params(("id" = Uuid, Path, description = "Listing ID")),
    request_body(content = crate::openapi::ListingInputDoc, description = "Partial update; uploaded photos replace the list"),
    responses(
        (status = 200, description = "Updated", body = crate::openapi::ListingDoc),
        (status = 403, description = "Not the owner", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update(
    State(state): State<ServerState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    ListingForm(payload): ListingForm,
) -> Result<Json<listing::Model>, JsonApiError> {
    let patch = UpdateListingInput::try_from(payload)?;
    Ok(Json(state.listings.update_listing(id, patch, caller.id).await?))
}

#[utoipa::path(
    delete, path = "/api/listings/{id}", tag = "listings",
    params(("id" = Uuid, Path, description = "Listing ID")),
    responses(
        (status = 204, description = "Deleted with its comments and favorites"),
        (status = 403, description = "Not the owner", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete(
    State(state): State<ServerState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    state.listings.delete_listing(id, caller.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get, path = "/api/listings/my", tag = "listings",
    responses((status = 200, description = "Caller's listings, newest first", body = [crate::openapi::ListingDoc])),
    security(("bearer_auth" = []))
)]
pub async fn mine(
    State(state): State<ServerState>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<Vec<listing::Model>>, JsonApiError> {
    Ok(Json(state.users.get_user_listings(caller.id).await?))
}

#[utoipa::path(
    post, path = "/api/listings/{id}/favorite", tag = "favorites",
    params(("id" = Uuid, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "New favorite state", body = crate::openapi::FavoriteToggleDoc),
        (status = 404, description = "Listing not found", body = crate::openapi::ErrorDoc)
    ),
    security(("bearer_auth" = []))
)]
pub async fn toggle_favorite(
    State(state): State<ServerState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<FavoriteToggle>, JsonApiError> {
    Ok(Json(state.listings.toggle_favorite(caller.id, id).await?))
}

#[utoipa::path(
    get, path = "/api/listings/favorites", tag = "favorites",
    responses((status = 200, description = "Caller's favorites with listing and author", body = [crate::openapi::FavoriteDoc])),
    security(("bearer_auth" = []))
)]
pub async fn favorites(
    State(state): State<ServerState>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<Vec<FavoriteWithListing>>, JsonApiError> {
    Ok(Json(state.listings.get_user_favorites(caller.id).await?))
}
