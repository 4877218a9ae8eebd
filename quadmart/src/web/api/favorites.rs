use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use quadmart_api_types::{
    pagination::{PageQuery, Paginated},
    ListingSummary,
};
use quadmart_db::MarketDb;

use crate::web::error::ApiError;
use crate::web::oauth::AuthUser;

pub(crate) async fn add_favorite(
    user: AuthUser,
    Path(listing_id): Path<i32>,
    State(db): State<MarketDb>,
) -> Result<StatusCode, ApiError> {
    db.get_listing(listing_id).await?;
    db.add_favorite(user.id, listing_id).await?;
    Ok(StatusCode::CREATED)
}

pub(crate) async fn remove_favorite(
    user: AuthUser,
    Path(listing_id): Path<i32>,
    State(db): State<MarketDb>,
) -> Result<StatusCode, ApiError> {
    db.remove_favorite(user.id, listing_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn user_favorites(
    user: AuthUser,
    State(db): State<MarketDb>,
    Query(page_query): Query<PageQuery>,
) -> Result<Json<Paginated<ListingSummary>>, ApiError> {
    let page = page_query.resolve();
    let (results, count) = db.favorites_page(user.id, page).await?;
    Ok(Json(Paginated::new(
        "/market/favorites",
        page,
        count,
        results,
    )))
}
