use axum::{
    extract::{Query, State},
    Json,
};
use quadmart_api_types::{
    pagination::{PageQuery, Paginated},
    schema::TypeInfo,
    ListingType, Tag,
};
use quadmart_db::MarketDb;

use crate::web::error::ApiError;

pub(crate) async fn tags(
    State(db): State<MarketDb>,
    Query(page_query): Query<PageQuery>,
) -> Result<Json<Paginated<Tag>>, ApiError> {
    let page = page_query.resolve();
    let (tags, count) = db.all_tags(page).await?;
    Ok(Json(Paginated::new(
        "/market/tags",
        page,
        count,
        tags.into_iter().map(Into::into).collect(),
    )))
}

/// Documents the attribute schema per listing type straight from the
/// registry.
pub(crate) async fn types(
    Query(page_query): Query<PageQuery>,
) -> Result<Json<Paginated<TypeInfo>>, ApiError> {
    let page = page_query.resolve();
    let all: Vec<TypeInfo> = ListingType::ALL.into_iter().map(Into::into).collect();
    let count = all.len() as u64;
    let results = all
        .into_iter()
        .skip(page.offset as usize)
        .take(page.limit as usize)
        .collect();
    Ok(Json(Paginated::new("/market/types", page, count, results)))
}
