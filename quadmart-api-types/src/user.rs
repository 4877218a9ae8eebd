use serde::{Deserialize, Serialize};

/// Current-user info including phone verification status, as returned by
/// `GET /accounts/me`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub id: i64,
    pub username: String,
    pub phone_number: Option<String>,
    pub phone_verified: bool,
}
