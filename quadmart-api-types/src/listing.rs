use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Discriminator identifying which variant payload a listing carries.
/// Fixed at creation time and never changed afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingType {
    Item,
    Sublet,
}

impl ListingType {
    pub const ALL: [ListingType; 2] = [ListingType::Item, ListingType::Sublet];

    pub fn as_str(self) -> &'static str {
        match self {
            ListingType::Item => "item",
            ListingType::Sublet => "sublet",
        }
    }
}

impl std::fmt::Display for ListingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemCondition {
    #[serde(rename = "NEW")]
    New,
    #[serde(rename = "LIKE_NEW")]
    LikeNew,
    #[serde(rename = "GOOD")]
    Good,
    #[serde(rename = "FAIR")]
    Fair,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemPayload {
    pub condition: ItemCondition,
    /// Category name; must match an existing category.
    pub category: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubletPayload {
    pub address: String,
    pub beds: u32,
    pub baths: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Tagged variant payload. Serializes adjacently so listings read as
/// `{"listing_type": "item", "additional_data": {...}}` on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "listing_type",
    content = "additional_data",
    rename_all = "lowercase"
)]
pub enum ListingVariant {
    Item(ItemPayload),
    Sublet(SubletPayload),
}

impl ListingVariant {
    pub fn listing_type(&self) -> ListingType {
        match self {
            ListingVariant::Item(_) => ListingType::Item,
            ListingVariant::Sublet(_) => ListingType::Sublet,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingImageUrl {
    pub id: i32,
    pub image_url: String,
    pub order: i32,
}

/// Full detail shape returned to the listing's seller. The only projection
/// that exposes the favorites and buyers identity lists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListingDetailOwner {
    pub id: i32,
    pub seller: i64,
    pub buyers: Vec<i64>,
    pub tags: Vec<String>,
    pub favorites: Vec<i64>,
    pub title: String,
    pub description: Option<String>,
    pub external_link: Option<String>,
    pub price: f64,
    pub negotiable: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub images: Vec<ListingImageUrl>,
    #[serde(flatten)]
    pub variant: ListingVariant,
}

/// Detail shape for everyone who is not the seller. Identity lists are
/// replaced with aggregate counts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListingDetailPublic {
    pub id: i32,
    pub seller: i64,
    pub buyer_count: u64,
    pub tags: Vec<String>,
    pub title: String,
    pub description: Option<String>,
    pub external_link: Option<String>,
    pub price: f64,
    pub negotiable: bool,
    pub expires_at: DateTime<Utc>,
    pub images: Vec<ListingImageUrl>,
    pub favorite_count: u64,
    #[serde(flatten)]
    pub variant: ListingVariant,
}

/// Compact shape used by every collection endpoint, viewer-independent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListingSummary {
    pub id: i32,
    pub seller: i64,
    pub tags: Vec<String>,
    pub title: String,
    pub price: f64,
    pub expires_at: DateTime<Utc>,
    pub images: Vec<ListingImageUrl>,
    pub favorite_count: u64,
    #[serde(flatten)]
    pub variant: ListingVariant,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn variant_serializes_adjacently() {
        let variant = ListingVariant::Item(ItemPayload {
            condition: ItemCondition::New,
            category: "Book".to_string(),
        });
        assert_eq!(
            serde_json::to_value(&variant).unwrap(),
            json!({
                "listing_type": "item",
                "additional_data": {"condition": "NEW", "category": "Book"},
            })
        );
    }

    #[test]
    fn sublet_variant_round_trips() {
        let payload = json!({
            "listing_type": "sublet",
            "additional_data": {
                "address": "3901 Locust Walk",
                "beds": 4,
                "baths": 1,
                "start_date": "2026-01-01",
                "end_date": "2026-05-31",
            },
        });
        let variant: ListingVariant = serde_json::from_value(payload.clone()).unwrap();
        assert_eq!(variant.listing_type(), ListingType::Sublet);
        assert_eq!(serde_json::to_value(&variant).unwrap(), payload);
    }

    #[test]
    fn summary_flattens_variant_fields() {
        let summary = ListingSummary {
            id: 7,
            seller: 42,
            tags: vec!["New".to_string()],
            title: "Macbook Pro".to_string(),
            price: 2000.0,
            expires_at: "3000-08-12T01:00:00Z".parse().unwrap(),
            images: vec![],
            favorite_count: 1,
            variant: ListingVariant::Item(ItemPayload {
                condition: ItemCondition::LikeNew,
                category: "Electronics".to_string(),
            }),
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["listing_type"], "item");
        assert_eq!(value["additional_data"]["condition"], "LIKE_NEW");
        // no detail-only fields leak into the summary
        assert!(value.get("description").is_none());
        assert!(value.get("buyer_count").is_none());
    }
}
