use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use quadmart_api_types::{result::ValidationErrors, ListingImageUrl};
use quadmart_db::MarketDb;
use tracing::warn;

use crate::image_store::ImageStore;
use crate::web::error::ApiError;
use crate::web::oauth::AuthUser;

fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

fn invalid_image() -> ApiError {
    let mut errors = ValidationErrors::new();
    errors.field("images", "Upload a valid image.");
    errors.into()
}

/// Uploads one or more `images` multipart parts to blob storage and
/// appends them to the listing.
pub(crate) async fn upload_images(
    user: AuthUser,
    Path(listing_id): Path<i32>,
    State(db): State<MarketDb>,
    State(image_store): State<Arc<dyn ImageStore>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Vec<ListingImageUrl>>), ApiError> {
    let full = db.get_listing(listing_id).await?;
    if full.listing.seller_id != user.id {
        return Err(ApiError::Forbidden);
    }

    let mut urls = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| invalid_image())?
    {
        if field.name() != Some("images") {
            continue;
        }
        let extension = field
            .content_type()
            .and_then(extension_for)
            .ok_or_else(invalid_image)?;
        let bytes = field.bytes().await.map_err(|_| invalid_image())?;
        let url = image_store
            .store(bytes, extension)
            .await
            .map_err(|err| ApiError::Upstream(err.to_string()))?;
        urls.push(url);
    }
    if urls.is_empty() {
        return Err(invalid_image());
    }

    let images = db.add_images(listing_id, urls).await?;
    Ok((
        StatusCode::CREATED,
        Json(images.into_iter().map(Into::into).collect()),
    ))
}

pub(crate) async fn delete_image(
    user: AuthUser,
    Path(image_id): Path<i32>,
    State(db): State<MarketDb>,
    State(image_store): State<Arc<dyn ImageStore>>,
) -> Result<StatusCode, ApiError> {
    let (_, listing) = db.get_image_with_listing(image_id).await?;
    if listing.seller_id != user.id {
        return Err(ApiError::Forbidden);
    }
    let url = db.delete_image(image_id).await?;
    if let Err(err) = image_store.delete(&url).await {
        warn!("failed to remove image blob {url}: {err}");
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_image_content_types_are_accepted() {
        assert_eq!(extension_for("image/png"), Some("png"));
        assert_eq!(extension_for("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for("application/pdf"), None);
        assert_eq!(extension_for("text/html"), None);
    }
}
