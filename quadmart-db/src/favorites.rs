use quadmart_api_types::{pagination::Page, ListingSummary};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use tracing::instrument;

use crate::entity::{favorite, listing};
use crate::{DbError, DbResult, MarketDb};

impl MarketDb {
    #[instrument(skip(self))]
    pub async fn add_favorite(&self, user_id: i64, listing_id: i32) -> DbResult<()> {
        let existing = favorite::Entity::find_by_id((user_id, listing_id))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(DbError::Conflict("Favorite already exists".to_string()));
        }
        favorite::ActiveModel {
            user_id: Set(user_id),
            listing_id: Set(listing_id),
        }
        .insert(&self.db)
        .await
        .map_err(|err| DbError::on_duplicate(err, "Favorite already exists"))?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn remove_favorite(&self, user_id: i64, listing_id: i32) -> DbResult<()> {
        let result = favorite::Entity::delete_by_id((user_id, listing_id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(DbError::not_found("Favorite"));
        }
        Ok(())
    }

    /// The user's favorited listings as summaries, expired ones included.
    #[instrument(skip(self))]
    pub async fn favorites_page(
        &self,
        user_id: i64,
        page: Page,
    ) -> DbResult<(Vec<ListingSummary>, u64)> {
        let select = listing::Entity::find()
            .join(JoinType::InnerJoin, listing::Relation::Favorite.def())
            .filter(favorite::Column::UserId.eq(user_id))
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
}
