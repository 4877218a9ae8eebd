use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tag")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::listing_tag::Entity")]
    ListingTag,
}

impl Related<super::listing_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ListingTag.def()
    }
}

impl Related<super::listing::Entity> for Entity {
    fn to() -> RelationDef {
        super::listing_tag::Relation::Listing.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::listing_tag::Relation::Tag.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
