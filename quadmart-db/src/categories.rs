use std::collections::HashSet;

use sea_orm::{ActiveValue::Set, EntityTrait};
use tracing::info;

use crate::entity::category;
use crate::{DbResult, MarketDb};

const DEFAULT_CATEGORIES: &[&str] = &[
    "Book",
    "Electronics",
    "Furniture",
    "Clothing",
    "Tickets",
    "Other",
];

impl MarketDb {
    /// Seeds the starter category set, skipping names already present.
    /// Categories are protected reference data; items hold a restrict FK
    /// against them.
    pub async fn insert_default_categories(&self) -> DbResult<()> {
        let existing = self.category_names().await?;
        let missing: Vec<_> = DEFAULT_CATEGORIES
            .iter()
            .filter(|name| !existing.contains(**name))
            .map(|name| category::ActiveModel {
                id: Default::default(),
                name: Set(name.to_string()),
            })
            .collect();
        if !missing.is_empty() {
            let insert = category::Entity::insert_many(missing).exec(&self.db).await?;
            info!(
                "seeded default categories, last insert id: {}",
                insert.last_insert_id
            );
        }
        Ok(())
    }

    pub async fn category_names(&self) -> DbResult<HashSet<String>> {
        Ok(category::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|category| category.name)
            .collect())
    }
}
