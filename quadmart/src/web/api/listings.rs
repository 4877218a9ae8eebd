use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use futures::try_join;
use quadmart_api_types::{
    pagination::{PageQuery, Paginated},
    result::ValidationErrors,
    ItemCondition, ListingDetailOwner, ListingDetailPublic, ListingSummary, ListingType,
};
use quadmart_db::{FullListing, ListingFilter, MarketDb};
use serde::Serialize;
use tracing::warn;

use crate::image_store::ImageStore;
use crate::profanity::ProfanityClassifier;
use crate::validation::{validate_create, validate_update, ListingBody, Lookups};
use crate::web::error::ApiError;
use crate::web::oauth::AuthUser;

/// One of the two single-listing projections; which one a viewer gets is
/// decided per request, never cached.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum ListingDetail {
    Owner(Box<ListingDetailOwner>),
    Public(Box<ListingDetailPublic>),
}

pub(crate) fn select_projection(full: FullListing, viewer: Option<i64>) -> ListingDetail {
    if viewer == Some(full.listing.seller_id) {
        ListingDetail::Owner(Box::new(full.into()))
    } else {
        ListingDetail::Public(Box::new(full.into()))
    }
}

pub(crate) async fn list_listings(
    user: Option<AuthUser>,
    State(db): State<MarketDb>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Paginated<ListingSummary>>, ApiError> {
    let (filter, page_query) = parse_browse_query(&pairs)?;
    let page = page_query.resolve();
    let viewer = user.map(|user| user.id);
    let (results, count) = db.list_listings(&filter, viewer, page).await?;
    Ok(Json(Paginated::new("/market/listings", page, count, results)))
}

pub(crate) async fn create_listing(
    user: AuthUser,
    State(db): State<MarketDb>,
    State(classifier): State<Arc<dyn ProfanityClassifier>>,
    Json(body): Json<ListingBody>,
) -> Result<(StatusCode, Json<ListingDetailOwner>), ApiError> {
    let lookups = lookups(&db).await?;
    let new = validate_create(body, &lookups, classifier.as_ref()).await?;
    let full = db.create_listing(user.id, new).await?;
    Ok((StatusCode::CREATED, Json(full.into())))
}

pub(crate) async fn get_listing(
    user: Option<AuthUser>,
    Path(listing_id): Path<i32>,
    State(db): State<MarketDb>,
) -> Result<Json<ListingDetail>, ApiError> {
    let full = db.get_listing(listing_id).await?;
    Ok(Json(select_projection(full, user.map(|user| user.id))))
}

pub(crate) async fn update_listing(
    user: AuthUser,
    Path(listing_id): Path<i32>,
    State(db): State<MarketDb>,
    State(classifier): State<Arc<dyn ProfanityClassifier>>,
    Json(body): Json<ListingBody>,
) -> Result<Json<ListingDetailOwner>, ApiError> {
    let full = db.get_listing(listing_id).await?;
    if full.listing.seller_id != user.id {
        return Err(ApiError::Forbidden);
    }
    let lookups = lookups(&db).await?;
    let changes = validate_update(&full, body, &lookups, classifier.as_ref()).await?;
    let updated = db.update_listing(listing_id, changes).await?;
    Ok(Json(updated.into()))
}

pub(crate) async fn delete_listing(
    user: AuthUser,
    Path(listing_id): Path<i32>,
    State(db): State<MarketDb>,
    State(image_store): State<Arc<dyn ImageStore>>,
) -> Result<StatusCode, ApiError> {
    let full = db.get_listing(listing_id).await?;
    if full.listing.seller_id != user.id {
        return Err(ApiError::Forbidden);
    }
    let urls = db.delete_listing(listing_id).await?;
    for url in urls {
        if let Err(err) = image_store.delete(&url).await {
            warn!("failed to remove image blob {url}: {err}");
        }
    }
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn lookups(db: &MarketDb) -> Result<Lookups, ApiError> {
    let (categories, tags) = try_join!(db.category_names(), db.tag_names())?;
    Ok(Lookups { categories, tags })
}

/// Parses the flat browse query (repeated `tags` included) into the
/// structured filter plus pagination.
fn parse_browse_query(
    pairs: &[(String, String)],
) -> Result<(ListingFilter, PageQuery), ValidationErrors> {
    let mut filter = ListingFilter::default();
    let mut page = PageQuery::default();
    let mut errors = ValidationErrors::new();

    for (key, value) in pairs {
        match key.as_str() {
            "type" => match value.parse::<ListingType>() {
                Ok(listing_type) => filter.listing_type = Some(listing_type),
                Err(err) => {
                    errors.field("type", err.to_string());
                }
            },
            "title" => filter.title = Some(value.clone()),
            "min_price" => filter.min_price = parse_number(value, key, &mut errors),
            "max_price" => filter.max_price = parse_number(value, key, &mut errors),
            "negotiable" => filter.negotiable = parse_bool(value, key, &mut errors),
            "condition" => {
                match serde_json::from_value::<ItemCondition>(serde_json::json!(value)) {
                    Ok(condition) => filter.condition = Some(condition),
                    Err(_) => {
                        errors.field("condition", format!("\"{value}\" is not a valid choice."));
                    }
                }
            }
            "category" => filter.category = Some(value.clone()),
            "beds" => filter.beds = parse_int(value, key, &mut errors),
            "baths" => filter.baths = parse_int(value, key, &mut errors),
            "min_beds" => filter.min_beds = parse_int(value, key, &mut errors),
            "min_baths" => filter.min_baths = parse_int(value, key, &mut errors),
            "address" => filter.address = Some(value.clone()),
            "start_date" => filter.start_date = parse_date(value, key, &mut errors),
            "end_date" => filter.end_date = parse_date(value, key, &mut errors),
            "tags" => filter.tags.push(value.clone()),
            "seller" => filter.seller = value.eq_ignore_ascii_case("true"),
            "limit" => page.limit = parse_unsigned(value, key, &mut errors),
            "offset" => page.offset = parse_unsigned(value, key, &mut errors),
            _ => {}
        }
    }

    errors.into_result((filter, page))
}

fn parse_number(value: &str, field: &str, errors: &mut ValidationErrors) -> Option<f64> {
    match value.parse() {
        Ok(number) => Some(number),
        Err(_) => {
            errors.field(field, "A valid number is required.");
            None
        }
    }
}

fn parse_int(value: &str, field: &str, errors: &mut ValidationErrors) -> Option<i32> {
    match value.parse() {
        Ok(number) => Some(number),
        Err(_) => {
            errors.field(field, "A valid integer is required.");
            None
        }
    }
}

fn parse_unsigned(value: &str, field: &str, errors: &mut ValidationErrors) -> Option<u64> {
    match value.parse() {
        Ok(number) => Some(number),
        Err(_) => {
            errors.field(field, "A valid integer is required.");
            None
        }
    }
}

fn parse_bool(value: &str, field: &str, errors: &mut ValidationErrors) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => {
            errors.field(field, "Must be a valid boolean.");
            None
        }
    }
}

fn parse_date(
    value: &str,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<chrono::NaiveDate> {
    match chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.field(
                field,
                "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.",
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadmart_api_types::{ItemPayload, ListingVariant};

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn browse_query_parses_repeated_tags_and_bounds() {
        let (filter, page) = parse_browse_query(&pairs(&[
            ("type", "sublet"),
            ("min_beds", "2"),
            ("tags", "New"),
            ("tags", "Furnished"),
            ("limit", "10"),
            ("offset", "20"),
        ]))
        .unwrap();
        assert_eq!(filter.listing_type, Some(ListingType::Sublet));
        assert_eq!(filter.min_beds, Some(2));
        assert_eq!(filter.tags, vec!["New", "Furnished"]);
        let page = page.resolve();
        assert_eq!(page.limit, 10);
        assert_eq!(page.offset, 20);
    }

    #[test]
    fn browse_query_rejects_bad_type_with_valid_set() {
        let errors = parse_browse_query(&pairs(&[("type", "car")])).unwrap_err();
        assert_eq!(
            errors.fields.get("type").map(String::as_str),
            Some("Invalid listing type 'car'. Valid types are: item, sublet.")
        );
    }

    #[test]
    fn browse_query_rejects_non_numeric_price() {
        let errors = parse_browse_query(&pairs(&[("min_price", "cheap")])).unwrap_err();
        assert_eq!(
            errors.fields.get("min_price").map(String::as_str),
            Some("A valid number is required.")
        );
    }

    #[test]
    fn seller_switch_parses_case_insensitively() {
        let (filter, _) = parse_browse_query(&pairs(&[("seller", "True")])).unwrap();
        assert!(filter.seller);
        let (filter, _) = parse_browse_query(&pairs(&[("seller", "false")])).unwrap();
        assert!(!filter.seller);
    }

    fn full_listing(seller: i64) -> FullListing {
        FullListing {
            listing: quadmart_db::entity::listing::Model {
                id: 1,
                seller_id: seller,
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
            tags: vec![],
            images: vec![],
            favorites: vec![11, 12],
            buyers: vec![13],
        }
    }

    #[test]
    fn seller_sees_owner_projection_with_identity_lists() {
        let detail = select_projection(full_listing(7), Some(7));
        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["favorites"], serde_json::json!([11, 12]));
        assert_eq!(value["buyers"], serde_json::json!([13]));
        assert!(value.get("favorite_count").is_none());
    }

    #[test]
    fn non_owner_sees_counts_instead_of_lists() {
        let detail = select_projection(full_listing(7), Some(8));
        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["favorite_count"], 2);
        assert_eq!(value["buyer_count"], 1);
        assert!(value.get("favorites").is_none());
        assert!(value.get("buyers").is_none());
        assert!(value.get("created_at").is_none());
    }

    #[test]
    fn anonymous_viewer_gets_public_projection() {
        let detail = select_projection(full_listing(7), None);
        assert!(matches!(detail, ListingDetail::Public(_)));
    }
}
