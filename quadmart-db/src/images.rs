use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder,
};
use tracing::instrument;

use crate::entity::{listing, listing_image};
use crate::{DbError, DbResult, MarketDb};

impl MarketDb {
    /// Appends stored image URLs to the listing, continuing the display
    /// order after the current tail.
    #[instrument(skip(self, urls))]
    pub async fn add_images(
        &self,
        listing_id: i32,
        urls: Vec<String>,
    ) -> DbResult<Vec<listing_image::Model>> {
        let last = listing_image::Entity::find()
            .filter(listing_image::Column::ListingId.eq(listing_id))
            .order_by_desc(listing_image::Column::DisplayOrder)
            .one(&self.db)
            .await?
            .map(|image| image.display_order)
            .unwrap_or(-1);
        let mut created = Vec::with_capacity(urls.len());
        for (index, url) in urls.into_iter().enumerate() {
            let image = listing_image::ActiveModel {
                id: NotSet,
                listing_id: Set(listing_id),
                url: Set(url),
                display_order: Set(last + 1 + index as i32),
            }
            .insert(&self.db)
            .await?;
            created.push(image);
        }
        Ok(created)
    }

    /// The image together with its owning listing, for permission checks.
    #[instrument(skip(self))]
    pub async fn get_image_with_listing(
        &self,
        image_id: i32,
    ) -> DbResult<(listing_image::Model, listing::Model)> {
        let (image, listing) = listing_image::Entity::find_by_id(image_id)
            .find_also_related(listing::Entity)
            .one(&self.db)
            .await?
            .ok_or(DbError::not_found("Image"))?;
        let listing = listing.ok_or_else(|| {
            DbError::Inconsistent(format!("image {image_id} has no owning listing"))
        })?;
        Ok((image, listing))
    }

    /// Deletes the image row and returns the stored URL for blob cleanup.
    #[instrument(skip(self))]
    pub async fn delete_image(&self, image_id: i32) -> DbResult<String> {
        let image = listing_image::Entity::find_by_id(image_id)
            .one(&self.db)
            .await?
            .ok_or(DbError::not_found("Image"))?;
        let url = image.url.clone();
        image.delete(&self.db).await?;
        Ok(url)
    }
}
