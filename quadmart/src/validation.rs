//! Listing validation. Pure apart from the advisory profanity lookup: the
//! caller supplies the current category and tag name sets, and persistence
//! only happens after a passing result.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use quadmart_api_types::{
    result::ValidationErrors, ItemCondition, ItemPayload, ListingType, ListingVariant,
    SubletPayload,
};
use quadmart_db::{FullListing, ListingChanges, NewListing};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::profanity::ProfanityClassifier;

/// Create/update request body for a listing. Every field is optional at
/// the parse layer; what is actually required depends on the operation.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListingBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub external_link: Option<String>,
    pub price: Option<f64>,
    pub negotiable: Option<bool>,
    pub expires_at: Option<DateTime<Utc>>,
    pub tags: Option<Vec<String>>,
    pub listing_type: Option<String>,
    pub additional_data: Option<Map<String, Value>>,
}

/// Reference-data snapshots the rules check names against.
pub(crate) struct Lookups {
    pub categories: HashSet<String>,
    pub tags: HashSet<String>,
}

pub(crate) async fn validate_create(
    body: ListingBody,
    lookups: &Lookups,
    classifier: &dyn ProfanityClassifier,
) -> Result<NewListing, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let listing_type = match &body.listing_type {
        None => {
            errors.field("listing_type", "This field is required.");
            None
        }
        Some(raw) => match raw.parse::<ListingType>() {
            Ok(listing_type) => Some(listing_type),
            Err(err) => {
                errors.field("listing_type", err.to_string());
                None
            }
        },
    };

    if body.title.is_none() {
        errors.field("title", "This field is required.");
    }
    match body.price {
        None => {
            errors.field("price", "This field is required.");
        }
        Some(price) if price < 0.0 => {
            errors.field("price", "Ensure this value is greater than or equal to 0.");
        }
        Some(_) => {}
    }
    if body.expires_at.is_none() {
        errors.field("expires_at", "This field is required.");
    }

    screen_profanity(
        &mut errors,
        classifier,
        body.title.as_deref(),
        body.description.as_deref(),
    )
    .await;
    if let Some(tags) = &body.tags {
        check_tags(&mut errors, tags, lookups);
    }

    let variant = match listing_type {
        Some(listing_type) => build_variant(
            listing_type,
            body.additional_data.as_ref(),
            None,
            lookups,
            &mut errors,
        ),
        None => None,
    };

    let (Some(title), Some(price), Some(expires_at), Some(variant)) =
        (body.title, body.price, body.expires_at, variant)
    else {
        return Err(errors);
    };
    errors.into_result(NewListing {
        title,
        description: body.description,
        external_link: body.external_link,
        price,
        negotiable: body.negotiable.unwrap_or(true),
        expires_at,
        tags: body.tags.unwrap_or_default(),
        variant,
    })
}

pub(crate) async fn validate_update(
    existing: &FullListing,
    body: ListingBody,
    lookups: &Lookups,
    classifier: &dyn ProfanityClassifier,
) -> Result<ListingChanges, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let existing_type = existing.variant.listing_type();

    if let Some(raw) = &body.listing_type {
        match raw.parse::<ListingType>() {
            Ok(listing_type) if listing_type == existing_type => {}
            Ok(_) => {
                errors.field("listing_type", "Cannot change listing type on update.");
            }
            Err(err) => {
                errors.field("listing_type", err.to_string());
            }
        }
    }
    if let Some(price) = body.price {
        if price < 0.0 {
            errors.field("price", "Ensure this value is greater than or equal to 0.");
        }
    }

    screen_profanity(
        &mut errors,
        classifier,
        body.title.as_deref(),
        body.description.as_deref(),
    )
    .await;
    if let Some(tags) = &body.tags {
        check_tags(&mut errors, tags, lookups);
    }

    // merge the supplied payload fields over the stored ones, then re-check
    // the cross-field rules on the result
    let variant = body.additional_data.as_ref().and_then(|map| {
        build_variant(
            existing_type,
            Some(map),
            Some(&existing.variant),
            lookups,
            &mut errors,
        )
    });

    errors.into_result(ListingChanges {
        title: body.title,
        description: body.description,
        external_link: body.external_link,
        price: body.price,
        negotiable: body.negotiable,
        expires_at: body.expires_at,
        tags: body.tags,
        variant,
    })
}

async fn screen_profanity(
    errors: &mut ValidationErrors,
    classifier: &dyn ProfanityClassifier,
    title: Option<&str>,
    description: Option<&str>,
) {
    if let Some(title) = title {
        if classifier.is_profane(title).await {
            errors.field("title", "The title contains inappropriate language.");
        }
    }
    if let Some(description) = description {
        if classifier.is_profane(description).await {
            errors.field(
                "description",
                "The description contains inappropriate language.",
            );
        }
    }
}

fn check_tags(errors: &mut ValidationErrors, tags: &[String], lookups: &Lookups) {
    for name in tags {
        if !lookups.tags.contains(name) {
            errors.field("tags", format!("Object with name '{name}' does not exist."));
            return;
        }
    }
}

/// Parses (and for updates, merges) the variant payload. Reports every
/// missing required field together; `None` means the payload could not be
/// assembled and errors were recorded.
fn build_variant(
    listing_type: ListingType,
    map: Option<&Map<String, Value>>,
    base: Option<&ListingVariant>,
    lookups: &Lookups,
    errors: &mut ValidationErrors,
) -> Option<ListingVariant> {
    let empty = Map::new();
    let map = map.unwrap_or(&empty);

    if base.is_none() {
        let mut missing = false;
        for field in listing_type.required_fields() {
            if !map.contains_key(*field) {
                errors.additional(
                    *field,
                    format!("This field is required for {listing_type}"),
                );
                missing = true;
            }
        }
        if missing {
            return None;
        }
    }

    match listing_type {
        ListingType::Item => {
            let base = base.and_then(|base| match base {
                ListingVariant::Item(payload) => Some(payload),
                ListingVariant::Sublet(_) => None,
            });
            let condition = match map.get("condition") {
                Some(value) => parse_condition(value, errors),
                None => base.map(|payload| payload.condition),
            };
            let category = match map.get("category") {
                Some(value) => parse_category(value, lookups, errors),
                None => base.map(|payload| payload.category.clone()),
            };
            Some(ListingVariant::Item(ItemPayload {
                condition: condition?,
                category: category?,
            }))
        }
        ListingType::Sublet => {
            let base = base.and_then(|base| match base {
                ListingVariant::Sublet(payload) => Some(payload),
                ListingVariant::Item(_) => None,
            });
            let address = match map.get("address") {
                Some(value) => parse_string(value, "address", errors),
                None => base.map(|payload| payload.address.clone()),
            };
            let beds = match map.get("beds") {
                Some(value) => parse_non_negative_int(value, "beds", errors),
                None => base.map(|payload| payload.beds),
            };
            let baths = match map.get("baths") {
                Some(value) => parse_non_negative_int(value, "baths", errors),
                None => base.map(|payload| payload.baths),
            };
            let start_date = match map.get("start_date") {
                Some(value) => parse_date(value, "start_date", errors),
                None => base.map(|payload| payload.start_date),
            };
            let end_date = match map.get("end_date") {
                Some(value) => parse_date(value, "end_date", errors),
                None => base.map(|payload| payload.end_date),
            };
            if let (Some(start_date), Some(end_date)) = (start_date, end_date) {
                if start_date >= end_date {
                    errors.field("end_date", "End date must be after start date");
                }
            }
            Some(ListingVariant::Sublet(SubletPayload {
                address: address?,
                beds: beds?,
                baths: baths?,
                start_date: start_date?,
                end_date: end_date?,
            }))
        }
    }
}

fn parse_condition(value: &Value, errors: &mut ValidationErrors) -> Option<ItemCondition> {
    match serde_json::from_value::<ItemCondition>(value.clone()) {
        Ok(condition) => Some(condition),
        Err(_) => {
            errors.additional(
                "condition",
                format!("{value} is not a valid choice."),
            );
            None
        }
    }
}

fn parse_category(
    value: &Value,
    lookups: &Lookups,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match value {
        Value::String(name) if lookups.categories.contains(name) => Some(name.clone()),
        Value::String(name) => {
            errors.additional("category", format!("Category '{name}' does not exist."));
            None
        }
        _ => {
            errors.additional("category", "A valid string is required.");
            None
        }
    }
}

fn parse_string(value: &Value, field: &str, errors: &mut ValidationErrors) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        _ => {
            errors.additional(field, "A valid string is required.");
            None
        }
    }
}

fn parse_non_negative_int(
    value: &Value,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<u32> {
    // whole-valued floats are accepted since JSON clients send e.g. 4.0
    let number = value.as_f64();
    match number {
        Some(number) if number < 0.0 => {
            errors.additional(field, "Ensure this value is greater than or equal to 0.");
            None
        }
        Some(number) if number.fract() == 0.0 && number <= u32::MAX as f64 => Some(number as u32),
        _ => {
            errors.additional(field, "A valid integer is required.");
            None
        }
    }
}

fn parse_date(value: &Value, field: &str, errors: &mut ValidationErrors) -> Option<NaiveDate> {
    let parsed = value
        .as_str()
        .and_then(|text| NaiveDate::parse_from_str(text, "%Y-%m-%d").ok());
    if parsed.is_none() {
        errors.additional(
            field,
            "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.",
        );
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct WordList(&'static str);

    #[async_trait]
    impl ProfanityClassifier for WordList {
        async fn is_profane(&self, text: &str) -> bool {
            text.contains(self.0)
        }
    }

    fn lookups() -> Lookups {
        Lookups {
            categories: ["Book", "Electronics"]
                .into_iter()
                .map(String::from)
                .collect(),
            tags: ["New", "Used"].into_iter().map(String::from).collect(),
        }
    }

    fn clean() -> WordList {
        WordList("zzz-never-matches")
    }

    fn item_body() -> ListingBody {
        ListingBody {
            title: Some("Math Textbook".to_string()),
            description: Some("2023 version".to_string()),
            price: Some(20.0),
            expires_at: Some("3000-12-12T00:00:00Z".parse().unwrap()),
            tags: Some(vec!["New".to_string()]),
            listing_type: Some("item".to_string()),
            additional_data: Some(
                json!({"condition": "NEW", "category": "Book"})
                    .as_object()
                    .unwrap()
                    .clone(),
            ),
            ..Default::default()
        }
    }

    fn sublet_body() -> ListingBody {
        ListingBody {
            title: Some("Cira Green Sublet".to_string()),
            price: Some(1350.0),
            expires_at: Some("3000-12-12T00:00:00Z".parse().unwrap()),
            listing_type: Some("sublet".to_string()),
            additional_data: Some(
                json!({
                    "address": "3901 Locust Walk",
                    "beds": 4.0,
                    "baths": 1,
                    "start_date": "2026-01-01",
                    "end_date": "2026-05-31",
                })
                .as_object()
                .unwrap()
                .clone(),
            ),
            ..Default::default()
        }
    }

    fn existing_item() -> FullListing {
        FullListing {
            listing: quadmart_db::entity::listing::Model {
                id: 1,
                seller_id: 7,
                title: "Math Textbook".to_string(),
                description: Some("2023 version".to_string()),
                external_link: None,
                price: 20.0,
                negotiable: true,
                created_at: "2026-01-01T00:00:00Z".parse().unwrap(),
                expires_at: "3000-12-12T00:00:00Z".parse().unwrap(),
                listing_type: quadmart_db::entity::sea_orm_active_enums::ListingType::Item,
            },
            variant: ListingVariant::Item(ItemPayload {
                condition: ItemCondition::Good,
                category: "Book".to_string(),
            }),
            tags: vec!["New".to_string()],
            images: vec![],
            favorites: vec![],
            buyers: vec![],
        }
    }

    #[tokio::test]
    async fn create_accepts_a_complete_item() {
        let new = validate_create(item_body(), &lookups(), &clean())
            .await
            .unwrap();
        assert_eq!(new.title, "Math Textbook");
        assert!(new.negotiable);
        assert_eq!(
            new.variant,
            ListingVariant::Item(ItemPayload {
                condition: ItemCondition::New,
                category: "Book".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn create_accepts_whole_valued_float_beds() {
        let new = validate_create(sublet_body(), &lookups(), &clean())
            .await
            .unwrap();
        let ListingVariant::Sublet(payload) = new.variant else {
            panic!("expected sublet variant");
        };
        assert_eq!(payload.beds, 4);
        assert_eq!(payload.baths, 1);
    }

    #[tokio::test]
    async fn create_requires_listing_type() {
        let body = ListingBody {
            listing_type: None,
            ..item_body()
        };
        let errors = validate_create(body, &lookups(), &clean()).await.unwrap_err();
        assert_eq!(
            errors.fields.get("listing_type").map(String::as_str),
            Some("This field is required.")
        );
    }

    #[tokio::test]
    async fn create_names_valid_types_for_unknown_type() {
        let body = ListingBody {
            listing_type: Some("apartment".to_string()),
            ..item_body()
        };
        let errors = validate_create(body, &lookups(), &clean()).await.unwrap_err();
        assert_eq!(
            errors.fields.get("listing_type").map(String::as_str),
            Some("Invalid listing type 'apartment'. Valid types are: item, sublet.")
        );
    }

    #[tokio::test]
    async fn create_batches_missing_payload_fields() {
        let mut body = sublet_body();
        body.additional_data = Some(
            json!({"address": "3901 Locust Walk"})
                .as_object()
                .unwrap()
                .clone(),
        );
        let errors = validate_create(body, &lookups(), &clean()).await.unwrap_err();
        for field in ["beds", "baths", "start_date", "end_date"] {
            assert_eq!(
                errors.additional_data.get(field).map(String::as_str),
                Some("This field is required for sublet"),
                "{field}"
            );
        }
        assert!(!errors.additional_data.contains_key("address"));
    }

    #[tokio::test]
    async fn create_rejects_unknown_category_by_name() {
        let mut body = item_body();
        body.additional_data = Some(
            json!({"condition": "NEW", "category": "Textbook"})
                .as_object()
                .unwrap()
                .clone(),
        );
        let errors = validate_create(body, &lookups(), &clean()).await.unwrap_err();
        assert_eq!(
            errors.additional_data.get("category").map(String::as_str),
            Some("Category 'Textbook' does not exist.")
        );
    }

    #[tokio::test]
    async fn create_screens_title_and_description_independently() {
        let mut body = item_body();
        body.title = Some("bleep textbook".to_string());
        body.description = Some("a bleep deal".to_string());
        let errors = validate_create(body, &lookups(), &WordList("bleep"))
            .await
            .unwrap_err();
        assert_eq!(
            errors.fields.get("title").map(String::as_str),
            Some("The title contains inappropriate language.")
        );
        assert_eq!(
            errors.fields.get("description").map(String::as_str),
            Some("The description contains inappropriate language.")
        );
    }

    #[tokio::test]
    async fn create_rejects_inverted_sublet_dates_on_end_date() {
        let mut body = sublet_body();
        body.additional_data = Some(
            json!({
                "address": "3901 Locust Walk",
                "beds": 4,
                "baths": 1,
                "start_date": "2026-06-01",
                "end_date": "2026-05-31",
            })
            .as_object()
            .unwrap()
            .clone(),
        );
        let errors = validate_create(body, &lookups(), &clean()).await.unwrap_err();
        assert_eq!(
            errors.fields.get("end_date").map(String::as_str),
            Some("End date must be after start date")
        );
    }

    #[tokio::test]
    async fn create_rejects_negative_price() {
        let body = ListingBody {
            price: Some(-1.0),
            ..item_body()
        };
        let errors = validate_create(body, &lookups(), &clean()).await.unwrap_err();
        assert_eq!(
            errors.fields.get("price").map(String::as_str),
            Some("Ensure this value is greater than or equal to 0.")
        );
    }

    #[tokio::test]
    async fn create_rejects_unknown_tags() {
        let body = ListingBody {
            tags: Some(vec!["Vintage".to_string()]),
            ..item_body()
        };
        let errors = validate_create(body, &lookups(), &clean()).await.unwrap_err();
        assert_eq!(
            errors.fields.get("tags").map(String::as_str),
            Some("Object with name 'Vintage' does not exist.")
        );
    }

    #[tokio::test]
    async fn update_rejects_listing_type_change() {
        let body = ListingBody {
            listing_type: Some("sublet".to_string()),
            ..Default::default()
        };
        let errors = validate_update(&existing_item(), body, &lookups(), &clean())
            .await
            .unwrap_err();
        assert_eq!(
            errors.fields.get("listing_type").map(String::as_str),
            Some("Cannot change listing type on update.")
        );
    }

    #[tokio::test]
    async fn update_merges_partial_payload_over_stored_values() {
        let body = ListingBody {
            price: Some(25.0),
            additional_data: Some(
                json!({"condition": "FAIR"}).as_object().unwrap().clone(),
            ),
            ..Default::default()
        };
        let changes = validate_update(&existing_item(), body, &lookups(), &clean())
            .await
            .unwrap();
        assert_eq!(changes.price, Some(25.0));
        // category survives from the stored payload
        assert_eq!(
            changes.variant,
            Some(ListingVariant::Item(ItemPayload {
                condition: ItemCondition::Fair,
                category: "Book".to_string(),
            }))
        );
    }

    #[tokio::test]
    async fn update_without_payload_leaves_variant_untouched() {
        let body = ListingBody {
            title: Some("Math Textbook (3rd ed)".to_string()),
            ..Default::default()
        };
        let changes = validate_update(&existing_item(), body, &lookups(), &clean())
            .await
            .unwrap();
        assert_eq!(changes.variant, None);
        assert_eq!(changes.title.as_deref(), Some("Math Textbook (3rd ed)"));
    }

    #[tokio::test]
    async fn update_same_listing_type_is_accepted() {
        let body = ListingBody {
            listing_type: Some("item".to_string()),
            ..Default::default()
        };
        assert!(validate_update(&existing_item(), body, &lookups(), &clean())
            .await
            .is_ok());
    }
}
