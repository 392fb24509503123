//! Listing bodies arrive as JSON or as `multipart/form-data` with up to N files in `photos`.

use std::path::Path;

use axum::async_trait;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use service::listing::ListingPayload;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::errors::{ApiJson, JsonApiError};
use crate::state::{ServerState, UploadSettings};

pub const PHOTOS_FIELD: &str = "photos";
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Extracted listing fields; uploaded photos are already stored and listed as `/uploads/<file>`.
pub struct ListingForm(pub ListingPayload);

#[async_trait]
impl FromRequest<ServerState> for ListingForm {
    type Rejection = JsonApiError;

    async fn from_request(req: Request, state: &ServerState) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("multipart/form-data"))
            .unwrap_or(false);
        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| JsonApiError::bad_request(e.body_text()))?;
            read_multipart(multipart, &state.uploads).await.map(ListingForm)
        } else {
            let ApiJson(payload) = ApiJson::<ListingPayload>::from_request(req, state).await?;
            Ok(ListingForm(payload))
        }
    }
}

/// Lower-case alphanumeric extension from the client file name, if any.
fn extension_of(file_name: Option<&str>) -> Option<String> {
    let ext = Path::new(file_name?).extension()?.to_str()?;
    let ext = ext.to_ascii_lowercase();
    (!ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric())).then_some(ext)
}

fn random_name(ext: Option<&str>) -> String {
    let stem = Uuid::new_v4().simple().to_string();
    match ext {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    }
}

async fn store_file(settings: &UploadSettings, ext: Option<&str>, bytes: &[u8]) -> Result<String, JsonApiError> {
    let name = random_name(ext);
    let path = settings.dir.join(&name);
    tokio::fs::write(&path, bytes).await.map_err(|e| {
        error!(path = %path.display(), error = %e, "failed to store upload");
        JsonApiError::new(
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
            Some(e.to_string()),
        )
    })?;
    debug!(file = %name, size = bytes.len(), "upload stored");
    Ok(name)
}

/// Remove files stored for a request that was rejected.
async fn discard(settings: &UploadSettings, names: &[String]) {
    for name in names {
        let path = settings.dir.join(name);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!(path = %path.display(), error = %e, "failed to remove rejected upload");
        }
    }
}

async fn read_multipart(multipart: Multipart, settings: &UploadSettings) -> Result<ListingPayload, JsonApiError> {
    let mut stored = Vec::new();
    match read_fields(multipart, settings, &mut stored).await {
        Ok(mut payload) => {
            if !stored.is_empty() {
                payload.photos = Some(stored.iter().map(|name| format!("{PUBLIC_PREFIX}/{name}")).collect());
            }
            Ok(payload)
        }
        Err(e) => {
            discard(settings, &stored).await;
            Err(e)
        }
    }
}

async fn read_fields(
    mut multipart: Multipart,
    settings: &UploadSettings,
    stored: &mut Vec<String>,
) -> Result<ListingPayload, JsonApiError> {
    let mut payload = ListingPayload::default();
    while let Some(field) = multipart.next_field().await.map_err(|e| JsonApiError::bad_request(e.body_text()))? {
        let name = field.name().unwrap_or_default().to_string();
        if name == PHOTOS_FIELD {
            if stored.len() >= settings.max_files {
                return Err(JsonApiError::bad_request(format!("Too many files (max {})", settings.max_files)));
            }
            let ext = extension_of(field.file_name());
            let bytes = field.bytes().await.map_err(|e| JsonApiError::bad_request(e.body_text()))?;
            if bytes.is_empty() {
                continue;
            }
            stored.push(store_file(settings, ext.as_deref(), &bytes).await?);
            continue;
        }
        let text = field.text().await.map_err(|e| JsonApiError::bad_request(e.body_text()))?;
        let slot = match name.as_str() {
            "title" => &mut payload.title,
            "description" => &mut payload.description,
            "animalType" => &mut payload.animal_type,
            "breed" => &mut payload.breed,
            "location" => &mut payload.location,
            "dateLost" => &mut payload.date_lost,
            "contactPhone" => &mut payload.contact_phone,
            _ => continue,
        };
        *slot = Some(text);
    }
    Ok(payload)
}
