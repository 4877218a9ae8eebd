use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stored discriminator for the listing aggregate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(None)")]
pub enum ListingType {
    #[sea_orm(string_value = "item")]
    Item,
    #[sea_orm(string_value = "sublet")]
    Sublet,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(None)")]
pub enum Condition {
    #[sea_orm(string_value = "NEW")]
    New,
    #[sea_orm(string_value = "LIKE_NEW")]
    LikeNew,
    #[sea_orm(string_value = "GOOD")]
    Good,
    #[sea_orm(string_value = "FAIR")]
    Fair,
}
