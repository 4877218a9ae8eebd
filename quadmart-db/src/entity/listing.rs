use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ListingType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "listing")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub seller_id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub external_link: Option<String>,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    pub negotiable: bool,
    pub created_at: DateTimeUtc,
    pub expires_at: DateTimeUtc,
    pub listing_type: ListingType,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::market_user::Entity",
        from = "Column::SellerId",
        to = "super::market_user::Column::Id"
    )]
    Seller,
    #[sea_orm(has_one = "super::item_listing::Entity")]
    ItemListing,
    #[sea_orm(has_one = "super::sublet_listing::Entity")]
    SubletListing,
    #[sea_orm(has_many = "super::offer::Entity")]
    Offer,
    #[sea_orm(has_many = "super::favorite::Entity")]
    Favorite,
    #[sea_orm(has_many = "super::listing_tag::Entity")]
    ListingTag,
    #[sea_orm(has_many = "super::listing_image::Entity")]
    ListingImage,
}

impl Related<super::market_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Seller.def()
    }
}

impl Related<super::item_listing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemListing.def()
    }
}

impl Related<super::sublet_listing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubletListing.def()
    }
}

impl Related<super::offer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Offer.def()
    }
}

impl Related<super::favorite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Favorite.def()
    }
}

impl Related<super::listing_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ListingImage.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::listing_tag::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::listing_tag::Relation::Listing.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
