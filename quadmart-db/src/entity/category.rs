use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "category")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::item_listing::Entity")]
    ItemListing,
}

impl Related<super::item_listing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemListing.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
