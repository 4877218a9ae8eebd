use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quadmart_api_types::result::{Detail, JsonError, ValidationErrors};
use quadmart_db::DbError;
use thiserror::Error;
use tracing::error;

use super::phone_verifier_service::VerifierError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication credentials were not provided.")]
    NotAuthenticated,
    #[error("You do not have permission to perform this action.")]
    Forbidden,
    #[error("Phone number must be verified before making an offer.")]
    PhoneNotVerified,
    #[error("No {0} matches the given query")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(ValidationErrors),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Upstream(String),
    #[error("Db error {0}")]
    Db(DbError),
    #[error("Generic error {0}")]
    AnyhowError(#[from] anyhow::Error),
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity } => ApiError::NotFound(entity),
            DbError::Conflict(message) => ApiError::Conflict(message),
            other => ApiError::Db(other),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<VerifierError> for ApiError {
    fn from(err: VerifierError) -> Self {
        match err {
            VerifierError::CodeMismatch => {
                let mut errors = ValidationErrors::new();
                errors.field("code", "Incorrect verification code.");
                ApiError::Validation(errors)
            }
            VerifierError::Sms(sms) => ApiError::Upstream(sms.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotAuthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(Detail::new("Authentication credentials were not provided.")),
            )
                .into_response(),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(Detail::new(
                    "You do not have permission to perform this action.",
                )),
            )
                .into_response(),
            ApiError::PhoneNotVerified => (
                StatusCode::FORBIDDEN,
                Json(Detail::new(
                    "Phone number must be verified before making an offer.",
                )),
            )
                .into_response(),
            ApiError::NotFound(entity) => (
                StatusCode::NOT_FOUND,
                Json(Detail::new(format!("No {entity} matches the given query"))),
            )
                .into_response(),
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(errors)).into_response()
            }
            // conflicts keep the bare-list body shape clients already parse
            ApiError::Conflict(message) => {
                (StatusCode::BAD_REQUEST, Json(vec![message])).into_response()
            }
            ApiError::Upstream(message) => (
                StatusCode::BAD_GATEWAY,
                Json(JsonError {
                    error_message: message,
                }),
            )
                .into_response(),
            other => {
                error!("error {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(JsonError {
                        error_message: format!("{other}"),
                    }),
                )
                    .into_response()
            }
        }
    }
}
