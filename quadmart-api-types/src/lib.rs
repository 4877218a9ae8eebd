mod listing;
mod offer;
mod tag;

pub mod pagination;
pub mod result;
pub mod schema;
pub mod user;

pub use listing::{
    ItemCondition, ItemPayload, ListingDetailOwner, ListingDetailPublic, ListingImageUrl,
    ListingSummary, ListingType, ListingVariant, SubletPayload,
};
pub use offer::Offer;
pub use tag::Tag;
