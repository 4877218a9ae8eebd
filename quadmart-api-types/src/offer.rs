use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub id: i32,
    pub user: i64,
    pub listing: i32,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
