pub mod category;
pub mod favorite;
pub mod item_listing;
pub mod listing;
pub mod listing_image;
pub mod listing_tag;
pub mod market_user;
pub mod offer;
pub mod sea_orm_active_enums;
pub mod sublet_listing;
pub mod tag;
