use chrono::Utc;
use quadmart_api_types::pagination::Page;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, EntityTrait, JoinType,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use tracing::instrument;

use crate::entity::{listing, offer};
use crate::{DbError, DbResult, MarketDb};

#[derive(Clone, Debug, Default)]
pub struct NewOffer {
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub message: String,
}

impl MarketDb {
    /// Creates an offer for `(user, listing)`. The pre-check gives the
    /// friendly message on the common path; the unique index catches the
    /// race where two requests insert simultaneously.
    #[instrument(skip(self, new))]
    pub async fn create_offer(
        &self,
        user_id: i64,
        listing_id: i32,
        new: NewOffer,
    ) -> DbResult<offer::Model> {
        let existing = offer::Entity::find()
            .filter(offer::Column::UserId.eq(user_id))
            .filter(offer::Column::ListingId.eq(listing_id))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(DbError::Conflict("Offer already exists".to_string()));
        }
        let offer = offer::ActiveModel {
            id: NotSet,
            user_id: Set(user_id),
            listing_id: Set(listing_id),
            email: Set(new.email),
            phone_number: Set(new.phone_number),
            message: Set(new.message),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await
        .map_err(|err| DbError::on_duplicate(err, "Offer already exists"))?;
        metrics::counter!("quadmart_offers_created_total").increment(1);
        Ok(offer)
    }

    /// Removes the caller's offer on the listing.
    #[instrument(skip(self))]
    pub async fn delete_offer(&self, user_id: i64, listing_id: i32) -> DbResult<()> {
        let offer = offer::Entity::find()
            .filter(offer::Column::UserId.eq(user_id))
            .filter(offer::Column::ListingId.eq(listing_id))
            .one(&self.db)
            .await?
            .ok_or(DbError::not_found("Offer"))?;
        offer.delete(&self.db).await?;
        Ok(())
    }

    /// All offers on one listing, oldest first.
    #[instrument(skip(self))]
    pub async fn offers_for_listing(
        &self,
        listing_id: i32,
        page: Page,
    ) -> DbResult<(Vec<offer::Model>, u64)> {
        let select = offer::Entity::find()
            .filter(offer::Column::ListingId.eq(listing_id))
            .order_by_asc(offer::Column::CreatedAt);
        let count = select.clone().count(&self.db).await?;
        let offers = select
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await?;
        Ok((offers, count))
    }

    /// Offers the user has made, across all listings.
    #[instrument(skip(self))]
    pub async fn offers_made(&self, user_id: i64, page: Page) -> DbResult<(Vec<offer::Model>, u64)> {
        let select = offer::Entity::find()
            .filter(offer::Column::UserId.eq(user_id))
            .order_by_asc(offer::Column::Id);
        let count = select.clone().count(&self.db).await?;
        let offers = select
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await?;
        Ok((offers, count))
    }

    /// Offers received across every listing the user is selling.
    #[instrument(skip(self))]
    pub async fn offers_received(
        &self,
        seller_id: i64,
        page: Page,
    ) -> DbResult<(Vec<offer::Model>, u64)> {
        let select = offer::Entity::find()
            .join(JoinType::InnerJoin, offer::Relation::Listing.def())
            .filter(listing::Column::SellerId.eq(seller_id))
            .order_by_asc(offer::Column::Id);
        let count = select.clone().count(&self.db).await?;
        let offers = select
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await?;
        Ok((offers, count))
    }
}
