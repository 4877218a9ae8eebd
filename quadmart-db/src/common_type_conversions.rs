//! Conversions between entity models and the wire types in
//! `quadmart-api-types`.

use quadmart_api_types::{
    ItemCondition, ListingDetailOwner, ListingDetailPublic, ListingImageUrl, ListingSummary,
    ListingType, Offer, Tag,
};

use crate::entity::{listing_image, offer, sea_orm_active_enums, tag};
use crate::listings::FullListing;

impl From<sea_orm_active_enums::ListingType> for ListingType {
    fn from(value: sea_orm_active_enums::ListingType) -> Self {
        match value {
            sea_orm_active_enums::ListingType::Item => ListingType::Item,
            sea_orm_active_enums::ListingType::Sublet => ListingType::Sublet,
        }
    }
}

impl From<ListingType> for sea_orm_active_enums::ListingType {
    fn from(value: ListingType) -> Self {
        match value {
            ListingType::Item => sea_orm_active_enums::ListingType::Item,
            ListingType::Sublet => sea_orm_active_enums::ListingType::Sublet,
        }
    }
}

impl From<sea_orm_active_enums::Condition> for ItemCondition {
    fn from(value: sea_orm_active_enums::Condition) -> Self {
        match value {
            sea_orm_active_enums::Condition::New => ItemCondition::New,
            sea_orm_active_enums::Condition::LikeNew => ItemCondition::LikeNew,
            sea_orm_active_enums::Condition::Good => ItemCondition::Good,
            sea_orm_active_enums::Condition::Fair => ItemCondition::Fair,
        }
    }
}

impl From<ItemCondition> for sea_orm_active_enums::Condition {
    fn from(value: ItemCondition) -> Self {
        match value {
            ItemCondition::New => sea_orm_active_enums::Condition::New,
            ItemCondition::LikeNew => sea_orm_active_enums::Condition::LikeNew,
            ItemCondition::Good => sea_orm_active_enums::Condition::Good,
            ItemCondition::Fair => sea_orm_active_enums::Condition::Fair,
        }
    }
}

impl From<listing_image::Model> for ListingImageUrl {
    fn from(model: listing_image::Model) -> Self {
        ListingImageUrl {
            id: model.id,
            image_url: model.url,
            order: model.display_order,
        }
    }
}

impl From<tag::Model> for Tag {
    fn from(model: tag::Model) -> Self {
        Tag { name: model.name }
    }
}

impl From<offer::Model> for Offer {
    fn from(model: offer::Model) -> Self {
        Offer {
            id: model.id,
            user: model.user_id,
            listing: model.listing_id,
            email: model.email,
            phone_number: model.phone_number,
            message: model.message,
            created_at: model.created_at,
        }
    }
}

impl From<FullListing> for ListingDetailOwner {
    fn from(full: FullListing) -> Self {
        ListingDetailOwner {
            id: full.listing.id,
            seller: full.listing.seller_id,
            buyers: full.buyers,
            tags: full.tags,
            favorites: full.favorites,
            title: full.listing.title,
            description: full.listing.description,
            external_link: full.listing.external_link,
            price: full.listing.price,
            negotiable: full.listing.negotiable,
            created_at: full.listing.created_at,
            expires_at: full.listing.expires_at,
            images: full.images.into_iter().map(Into::into).collect(),
            variant: full.variant,
        }
    }
}

impl From<FullListing> for ListingDetailPublic {
    fn from(full: FullListing) -> Self {
        ListingDetailPublic {
            id: full.listing.id,
            seller: full.listing.seller_id,
            buyer_count: full.buyers.len() as u64,
            tags: full.tags,
            title: full.listing.title,
            description: full.listing.description,
            external_link: full.listing.external_link,
            price: full.listing.price,
            negotiable: full.listing.negotiable,
            expires_at: full.listing.expires_at,
            images: full.images.into_iter().map(Into::into).collect(),
            favorite_count: full.favorites.len() as u64,
            variant: full.variant,
        }
    }
}

impl From<FullListing> for ListingSummary {
    fn from(full: FullListing) -> Self {
        ListingSummary {
            id: full.listing.id,
            seller: full.listing.seller_id,
            tags: full.tags,
            title: full.listing.title,
            price: full.listing.price,
            expires_at: full.listing.expires_at,
            images: full.images.into_iter().map(Into::into).collect(),
            favorite_count: full.favorites.len() as u64,
            variant: full.variant,
        }
    }
}
