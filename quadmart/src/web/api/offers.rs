use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use quadmart_api_types::{
    pagination::{PageQuery, Paginated},
    result::ValidationErrors,
    Offer,
};
use quadmart_db::{MarketDb, NewOffer};
use serde::Deserialize;

use crate::web::error::ApiError;
use crate::web::oauth::AuthUser;
use crate::web::phone_verifier_service::normalize_phone;

#[derive(Debug, Deserialize)]
pub(crate) struct OfferBody {
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub message: Option<String>,
}

/// Offers on a listing are only visible to its seller.
pub(crate) async fn list_offers(
    user: AuthUser,
    Path(listing_id): Path<i32>,
    State(db): State<MarketDb>,
    Query(page_query): Query<PageQuery>,
) -> Result<Json<Paginated<Offer>>, ApiError> {
    let full = db.get_listing(listing_id).await?;
    if full.listing.seller_id != user.id {
        return Err(ApiError::Forbidden);
    }
    let page = page_query.resolve();
    let (offers, count) = db.offers_for_listing(listing_id, page).await?;
    Ok(Json(Paginated::new(
        &format!("/market/listings/{listing_id}/offers"),
        page,
        count,
        offers.into_iter().map(Into::into).collect(),
    )))
}

/// Creating an offer requires a verified phone number; the stored contact
/// phone falls back to the verified one when the payload omits it.
pub(crate) async fn create_offer(
    user: AuthUser,
    Path(listing_id): Path<i32>,
    State(db): State<MarketDb>,
    Json(body): Json<OfferBody>,
) -> Result<(StatusCode, Json<Offer>), ApiError> {
    db.get_listing(listing_id).await?;
    let db_user = db.get_user(user.id).await?;
    if !db_user.phone_verified {
        return Err(ApiError::PhoneNotVerified);
    }

    let mut errors = ValidationErrors::new();
    let phone_number = match &body.phone_number {
        Some(raw) => match normalize_phone(raw) {
            Some(phone) => Some(phone),
            None => {
                errors.field("phone_number", "The phone number entered is not valid.");
                None
            }
        },
        None => db_user.phone_number.clone(),
    };
    if let Some(email) = &body.email {
        if !email.contains('@') {
            errors.field("email", "Enter a valid email address.");
        }
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let offer = db
        .create_offer(
            user.id,
            listing_id,
            NewOffer {
                email: body.email,
                phone_number,
                message: body.message.unwrap_or_default(),
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(offer.into())))
}

pub(crate) async fn delete_offer(
    user: AuthUser,
    Path(listing_id): Path<i32>,
    State(db): State<MarketDb>,
) -> Result<StatusCode, ApiError> {
    db.get_listing(listing_id).await?;
    db.delete_offer(user.id, listing_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn offers_made(
    user: AuthUser,
    State(db): State<MarketDb>,
    Query(page_query): Query<PageQuery>,
) -> Result<Json<Paginated<Offer>>, ApiError> {
    let page = page_query.resolve();
    let (offers, count) = db.offers_made(user.id, page).await?;
    Ok(Json(Paginated::new(
        "/market/offers/made",
        page,
        count,
        offers.into_iter().map(Into::into).collect(),
    )))
}

pub(crate) async fn offers_received(
    user: AuthUser,
    State(db): State<MarketDb>,
    Query(page_query): Query<PageQuery>,
) -> Result<Json<Paginated<Offer>>, ApiError> {
    let page = page_query.resolve();
    let (offers, count) = db.offers_received(user.id, page).await?;
    Ok(Json(Paginated::new(
        "/market/offers/received",
        page,
        count,
        offers.into_iter().map(Into::into).collect(),
    )))
}
