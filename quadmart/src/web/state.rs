use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use quadmart_db::MarketDb;

use super::oauth::{AuthUserCache, CampusAuthConfig};
use super::phone_verifier_service::PhoneVerifierService;
use crate::image_store::ImageStore;
use crate::profanity::ProfanityClassifier;

#[derive(Clone)]
pub(crate) struct WebState {
    pub(crate) db: MarketDb,
    pub(crate) key: Key,
    pub(crate) oauth_config: CampusAuthConfig,
    pub(crate) user_cache: AuthUserCache,
    pub(crate) phone_verifier: PhoneVerifierService,
    pub(crate) classifier: Arc<dyn ProfanityClassifier>,
    pub(crate) image_store: Arc<dyn ImageStore>,
}

impl FromRef<WebState> for MarketDb {
    fn from_ref(input: &WebState) -> Self {
        input.db.clone()
    }
}

impl FromRef<WebState> for Key {
    fn from_ref(input: &WebState) -> Self {
        input.key.clone()
    }
}

impl FromRef<WebState> for CampusAuthConfig {
    fn from_ref(input: &WebState) -> Self {
        input.oauth_config.clone()
    }
}

impl FromRef<WebState> for AuthUserCache {
    fn from_ref(input: &WebState) -> Self {
        input.user_cache.clone()
    }
}

impl FromRef<WebState> for PhoneVerifierService {
    fn from_ref(input: &WebState) -> Self {
        input.phone_verifier.clone()
    }
}

impl FromRef<WebState> for Arc<dyn ProfanityClassifier> {
    fn from_ref(input: &WebState) -> Self {
        input.classifier.clone()
    }
}

impl FromRef<WebState> for Arc<dyn ImageStore> {
    fn from_ref(input: &WebState) -> Self {
        input.image_store.clone()
    }
}
