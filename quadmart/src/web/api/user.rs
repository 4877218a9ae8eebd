use axum::{extract::State, Json};
use quadmart_api_types::{
    result::{Detail, ValidationErrors},
    user::UserData,
};
use quadmart_db::{entity::market_user, MarketDb};
use serde::Deserialize;

use crate::web::error::ApiError;
use crate::web::oauth::AuthUser;
use crate::web::phone_verifier_service::{normalize_phone, PhoneVerifierService};

fn user_data(user: market_user::Model) -> UserData {
    UserData {
        id: user.id,
        username: user.username,
        phone_number: user.phone_number,
        phone_verified: user.phone_verified,
    }
}

pub(crate) async fn current_user(
    user: AuthUser,
    State(db): State<MarketDb>,
) -> Result<Json<UserData>, ApiError> {
    Ok(Json(user_data(db.get_user(user.id).await?)))
}

#[derive(Debug, Deserialize)]
pub(crate) struct SendCodeBody {
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VerifyCodeBody {
    pub phone_number: Option<String>,
    pub code: Option<String>,
}

fn require_phone(raw: &Option<String>) -> Result<String, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let Some(raw) = raw else {
        errors.field("phone_number", "This field is required.");
        return Err(errors);
    };
    match normalize_phone(raw) {
        Some(phone) => Ok(phone),
        None => {
            errors.field("phone_number", "The phone number entered is not valid.");
            Err(errors)
        }
    }
}

pub(crate) async fn send_phone_code(
    user: AuthUser,
    State(verifier): State<PhoneVerifierService>,
    Json(body): Json<SendCodeBody>,
) -> Result<Json<Detail>, ApiError> {
    let phone = require_phone(&body.phone_number)?;
    verifier.send_code(user.id, &phone).await?;
    Ok(Json(Detail::new("Verification code sent.")))
}

pub(crate) async fn verify_phone(
    user: AuthUser,
    State(db): State<MarketDb>,
    State(verifier): State<PhoneVerifierService>,
    Json(body): Json<VerifyCodeBody>,
) -> Result<Json<UserData>, ApiError> {
    let phone = require_phone(&body.phone_number)?;
    let Some(code) = body.code else {
        let mut errors = ValidationErrors::new();
        errors.field("code", "This field is required.");
        return Err(errors.into());
    };
    verifier.verify_code(user.id, &phone, &code).await?;
    let updated = db.set_verified_phone(user.id, &phone).await?;
    Ok(Json(user_data(updated)))
}
