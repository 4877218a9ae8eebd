use std::collections::HashSet;

use quadmart_api_types::pagination::Page;
use sea_orm::{ActiveValue::Set, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect};
use tracing::{info, instrument};

use crate::entity::tag;
use crate::{DbResult, MarketDb};

const DEFAULT_TAGS: &[&str] = &[
    "New",
    "Used",
    "Textbook",
    "Laptop",
    "Furniture",
    "Apartment",
    "Bike",
];

impl MarketDb {
    /// Seeds the starter tag set, skipping names already present.
    pub async fn insert_default_tags(&self) -> DbResult<()> {
        let existing: HashSet<String> = self.tag_names().await?;
        let missing: Vec<_> = DEFAULT_TAGS
            .iter()
            .filter(|name| !existing.contains(**name))
            .map(|name| tag::ActiveModel {
                id: Default::default(),
                name: Set(name.to_string()),
            })
            .collect();
        if !missing.is_empty() {
            let insert = tag::Entity::insert_many(missing).exec(&self.db).await?;
            info!("seeded default tags, last insert id: {}", insert.last_insert_id);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn all_tags(&self, page: Page) -> DbResult<(Vec<tag::Model>, u64)> {
        let select = tag::Entity::find().order_by_asc(tag::Column::Id);
        let count = select.clone().count(&self.db).await?;
        let tags = select
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await?;
        Ok((tags, count))
    }

    pub async fn tag_names(&self) -> DbResult<HashSet<String>> {
        Ok(tag::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|tag| tag.name)
            .collect())
    }
}
