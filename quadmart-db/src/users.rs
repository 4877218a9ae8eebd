use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait};
use tracing::instrument;

use crate::entity::market_user;
use crate::{DbError, DbResult, MarketDb};

impl MarketDb {
    /// Looks the user up by the provider-issued id, creating the local row
    /// on first sight.
    #[instrument(skip(self))]
    pub async fn get_or_create_user(&self, user_id: i64, username: &str) -> DbResult<market_user::Model> {
        if let Some(user) = market_user::Entity::find_by_id(user_id).one(&self.db).await? {
            return Ok(user);
        }
        Ok(market_user::ActiveModel {
            id: Set(user_id),
            username: Set(username.to_string()),
            phone_number: Set(None),
            phone_verified: Set(false),
        }
        .insert(&self.db)
        .await?)
    }

    pub async fn get_user(&self, user_id: i64) -> DbResult<market_user::Model> {
        market_user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(DbError::not_found("User"))
    }

    /// Records a successfully verified phone number on the user.
    #[instrument(skip(self))]
    pub async fn set_verified_phone(&self, user_id: i64, phone_number: &str) -> DbResult<market_user::Model> {
        let user = self.get_user(user_id).await?;
        let mut active: market_user::ActiveModel = user.into();
        active.phone_number = Set(Some(phone_number.to_string()));
        active.phone_verified = Set(true);
        Ok(active.update(&self.db).await?)
    }
}
