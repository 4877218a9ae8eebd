use std::collections::HashMap;

use chrono::Utc;
use futures::try_join;
use itertools::Itertools;
use quadmart_api_types::{pagination::Page, ItemPayload, ListingSummary, ListingVariant, SubletPayload};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, ConnectionTrait,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use tracing::instrument;

use crate::entity::{
    category, favorite, item_listing, listing, listing_image, listing_tag, offer,
    sea_orm_active_enums, sublet_listing, tag,
};
use crate::filter::{base_select, ListingFilter};
use crate::{DbError, DbResult, MarketDb};

/// A listing aggregate assembled from its rows: the common fields, the
/// variant payload resolved through the stored discriminator, and the
/// association sets.
#[derive(Clone, Debug)]
pub struct FullListing {
    pub listing: listing::Model,
    pub variant: ListingVariant,
    pub tags: Vec<String>,
    pub images: Vec<listing_image::Model>,
    pub favorites: Vec<i64>,
    pub buyers: Vec<i64>,
}

/// Validated input for listing creation. The variant decides which
/// type-specific row gets written alongside the listing row.
#[derive(Clone, Debug)]
pub struct NewListing {
    pub title: String,
    pub description: Option<String>,
    pub external_link: Option<String>,
    pub price: f64,
    pub negotiable: bool,
    pub expires_at: chrono::DateTime<Utc>,
    pub tags: Vec<String>,
    pub variant: ListingVariant,
}

/// Validated partial update. `None` fields keep their stored values. The
/// variant, when present, is the fully merged payload (stored values plus
/// the requested changes), so applying it is unconditional per field.
#[derive(Clone, Debug, Default)]
pub struct ListingChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub external_link: Option<String>,
    pub price: Option<f64>,
    pub negotiable: Option<bool>,
    pub expires_at: Option<chrono::DateTime<Utc>>,
    pub tags: Option<Vec<String>>,
    pub variant: Option<ListingVariant>,
}

impl MarketDb {
    /// Creates the listing row, its variant row, and its tag links in one
    /// transaction; a failure in any part leaves nothing behind.
    #[instrument(skip(self, new))]
    pub async fn create_listing(&self, seller: i64, new: NewListing) -> DbResult<FullListing> {
        let txn = self.db.begin().await?;
        let created = listing::ActiveModel {
            id: NotSet,
            seller_id: Set(seller),
            title: Set(new.title),
            description: Set(new.description),
            external_link: Set(new.external_link),
            price: Set(new.price),
            negotiable: Set(new.negotiable),
            created_at: Set(Utc::now()),
            expires_at: Set(new.expires_at),
            listing_type: Set(new.variant.listing_type().into()),
        }
        .insert(&txn)
        .await?;
        insert_variant_row(&txn, created.id, &new.variant).await?;
        set_listing_tags(&txn, created.id, &new.tags).await?;
        txn.commit().await?;
        metrics::counter!("quadmart_listings_created_total").increment(1);

        self.get_listing(created.id).await
    }

    /// Fetches the full aggregate, resolving the variant payload by
    /// explicit dispatch on the stored discriminator.
    #[instrument(skip(self))]
    pub async fn get_listing(&self, listing_id: i32) -> DbResult<FullListing> {
        let model = listing::Entity::find_by_id(listing_id)
            .one(&self.db)
            .await?
            .ok_or(DbError::not_found("Listing"))?;
        let mut full = self.assemble(vec![model]).await?;
        full.pop().ok_or(DbError::not_found("Listing"))
    }

    /// Applies a partial update: common fields unconditionally when
    /// supplied, the merged variant payload when supplied, and a full tag
    /// replacement when supplied.
    #[instrument(skip(self, changes))]
    pub async fn update_listing(
        &self,
        listing_id: i32,
        changes: ListingChanges,
    ) -> DbResult<FullListing> {
        let txn = self.db.begin().await?;
        let model = listing::Entity::find_by_id(listing_id)
            .one(&txn)
            .await?
            .ok_or(DbError::not_found("Listing"))?;

        let common_changed = changes.title.is_some()
            || changes.description.is_some()
            || changes.external_link.is_some()
            || changes.price.is_some()
            || changes.negotiable.is_some()
            || changes.expires_at.is_some();
        let mut active: listing::ActiveModel = model.into();
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        if let Some(external_link) = changes.external_link {
            active.external_link = Set(Some(external_link));
        }
        if let Some(price) = changes.price {
            active.price = Set(price);
        }
        if let Some(negotiable) = changes.negotiable {
            active.negotiable = Set(negotiable);
        }
        if let Some(expires_at) = changes.expires_at {
            active.expires_at = Set(expires_at);
        }
        if common_changed {
            active.update(&txn).await?;
        }

        if let Some(variant) = &changes.variant {
            update_variant_row(&txn, listing_id, variant).await?;
        }
        if let Some(tags) = &changes.tags {
            listing_tag::Entity::delete_many()
                .filter(listing_tag::Column::ListingId.eq(listing_id))
                .exec(&txn)
                .await?;
            set_listing_tags(&txn, listing_id, tags).await?;
        }
        txn.commit().await?;

        self.get_listing(listing_id).await
    }

    /// Deletes the listing; the schema cascades to images, offers, tag
    /// links, and favorites. Returns the stored image URLs so the caller
    /// can clean up the blobs.
    #[instrument(skip(self))]
    pub async fn delete_listing(&self, listing_id: i32) -> DbResult<Vec<String>> {
        let urls = listing_image::Entity::find()
            .filter(listing_image::Column::ListingId.eq(listing_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|image| image.url)
            .collect();
        let result = listing::Entity::delete_by_id(listing_id)
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(DbError::not_found("Listing"));
        }
        Ok(urls)
    }

    /// One page of listings matching `filter`, ordered by id, plus the
    /// total match count.
    #[instrument(skip(self, filter))]
    pub async fn list_listings(
        &self,
        filter: &ListingFilter,
        viewer: Option<i64>,
        page: Page,
    ) -> DbResult<(Vec<ListingSummary>, u64)> {
        let select = base_select()
            .filter(filter.condition(viewer, Utc::now()))
            .order_by_asc(listing::Column::Id);
        let count = select.clone().count(&self.db).await?;
        let models = select
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await?;
        let summaries = self
            .assemble(models)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
        Ok((summaries, count))
    }

    /// Batch-assembles aggregates for the given listing rows.
    pub(crate) async fn assemble(&self, models: Vec<listing::Model>) -> DbResult<Vec<FullListing>> {
        let ids: Vec<i32> = models.iter().map(|model| model.id).collect();
        let (items, sublets, tag_rows, images, favorites, offers) = try_join!(
            item_listing::Entity::find()
                .filter(item_listing::Column::ListingId.is_in(ids.clone()))
                .find_also_related(category::Entity)
                .all(&self.db),
            sublet_listing::Entity::find()
                .filter(sublet_listing::Column::ListingId.is_in(ids.clone()))
                .all(&self.db),
            listing_tag::Entity::find()
                .filter(listing_tag::Column::ListingId.is_in(ids.clone()))
                .find_also_related(tag::Entity)
                .all(&self.db),
            listing_image::Entity::find()
                .filter(listing_image::Column::ListingId.is_in(ids.clone()))
                .order_by_asc(listing_image::Column::DisplayOrder)
                .all(&self.db),
            favorite::Entity::find()
                .filter(favorite::Column::ListingId.is_in(ids.clone()))
                .all(&self.db),
            offer::Entity::find()
                .filter(offer::Column::ListingId.is_in(ids))
                .all(&self.db),
        )?;

        let mut item_payloads: HashMap<i32, ItemPayload> = items
            .into_iter()
            .map(|(item, category)| {
                let category = category.ok_or_else(|| {
                    DbError::Inconsistent(format!(
                        "item listing {} references a missing category",
                        item.listing_id
                    ))
                })?;
                Ok((
                    item.listing_id,
                    ItemPayload {
                        condition: item.condition.into(),
                        category: category.name,
                    },
                ))
            })
            .collect::<DbResult<_>>()?;
        let mut sublet_payloads: HashMap<i32, SubletPayload> = sublets
            .into_iter()
            .map(|sublet| {
                (
                    sublet.listing_id,
                    SubletPayload {
                        address: sublet.address,
                        beds: sublet.beds as u32,
                        baths: sublet.baths as u32,
                        start_date: sublet.start_date,
                        end_date: sublet.end_date,
                    },
                )
            })
            .collect();
        let mut tags_by_listing: HashMap<i32, Vec<String>> = tag_rows
            .into_iter()
            .filter_map(|(link, tag)| tag.map(|tag| (link.listing_id, tag.name)))
            .into_group_map();
        let mut images_by_listing: HashMap<i32, Vec<listing_image::Model>> = images
            .into_iter()
            .map(|image| (image.listing_id, image))
            .into_group_map();
        let mut favorites_by_listing: HashMap<i32, Vec<i64>> = favorites
            .into_iter()
            .map(|favorite| (favorite.listing_id, favorite.user_id))
            .into_group_map();
        let mut buyers_by_listing: HashMap<i32, Vec<i64>> = offers
            .into_iter()
            .map(|offer| (offer.listing_id, offer.user_id))
            .into_group_map();

        models
            .into_iter()
            .map(|model| {
                let variant = match model.listing_type {
                    sea_orm_active_enums::ListingType::Item => item_payloads
                        .remove(&model.id)
                        .map(ListingVariant::Item),
                    sea_orm_active_enums::ListingType::Sublet => sublet_payloads
                        .remove(&model.id)
                        .map(ListingVariant::Sublet),
                }
                .ok_or_else(|| {
                    DbError::Inconsistent(format!("listing {} has no variant row", model.id))
                })?;
                Ok(FullListing {
                    tags: tags_by_listing.remove(&model.id).unwrap_or_default(),
                    images: images_by_listing.remove(&model.id).unwrap_or_default(),
                    favorites: favorites_by_listing.remove(&model.id).unwrap_or_default(),
                    buyers: buyers_by_listing.remove(&model.id).unwrap_or_default(),
                    variant,
                    listing: model,
                })
            })
            .collect()
    }
}

async fn insert_variant_row<C: ConnectionTrait>(
    conn: &C,
    listing_id: i32,
    variant: &ListingVariant,
) -> DbResult<()> {
    match variant {
        ListingVariant::Item(payload) => {
            let category = find_category(conn, &payload.category).await?;
            item_listing::ActiveModel {
                listing_id: Set(listing_id),
                condition: Set(payload.condition.into()),
                category_id: Set(category.id),
            }
            .insert(conn)
            .await?;
        }
        ListingVariant::Sublet(payload) => {
            sublet_listing::ActiveModel {
                listing_id: Set(listing_id),
                address: Set(payload.address.clone()),
                beds: Set(payload.beds as i32),
                baths: Set(payload.baths as i32),
                start_date: Set(payload.start_date),
                end_date: Set(payload.end_date),
            }
            .insert(conn)
            .await?;
        }
    }
    Ok(())
}

async fn update_variant_row<C: ConnectionTrait>(
    conn: &C,
    listing_id: i32,
    variant: &ListingVariant,
) -> DbResult<()> {
    match variant {
        ListingVariant::Item(payload) => {
            let category = find_category(conn, &payload.category).await?;
            item_listing::ActiveModel {
                listing_id: sea_orm::ActiveValue::Unchanged(listing_id),
                condition: Set(payload.condition.into()),
                category_id: Set(category.id),
            }
            .update(conn)
            .await?;
        }
        ListingVariant::Sublet(payload) => {
            sublet_listing::ActiveModel {
                listing_id: sea_orm::ActiveValue::Unchanged(listing_id),
                address: Set(payload.address.clone()),
                beds: Set(payload.beds as i32),
                baths: Set(payload.baths as i32),
                start_date: Set(payload.start_date),
                end_date: Set(payload.end_date),
            }
            .update(conn)
            .await?;
        }
    }
    Ok(())
}

async fn find_category<C: ConnectionTrait>(conn: &C, name: &str) -> DbResult<category::Model> {
    category::Entity::find()
        .filter(category::Column::Name.eq(name))
        .one(conn)
        .await?
        .ok_or(DbError::not_found("Category"))
}

async fn set_listing_tags<C: ConnectionTrait>(
    conn: &C,
    listing_id: i32,
    names: &[String],
) -> DbResult<()> {
    if names.is_empty() {
        return Ok(());
    }
    let tags = tag::Entity::find()
        .filter(tag::Column::Name.is_in(names.iter().cloned()))
        .all(conn)
        .await?;
    if tags.len() != names.len() {
        return Err(DbError::not_found("Tag"));
    }
    listing_tag::Entity::insert_many(tags.into_iter().map(|tag| listing_tag::ActiveModel {
        listing_id: Set(listing_id),
        tag_id: Set(tag.id),
    }))
    .exec(conn)
    .await?;
    Ok(())
}
