mod image_store;
mod profanity;
mod validation;
mod web;
mod web_metrics;

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum_extra::extract::cookie::Key;
use quadmart_db::MarketDb;
use tracing::{info, warn};

use crate::image_store::{DiskImageStore, ImageStore};
use crate::profanity::{HttpProfanityClassifier, PermissiveClassifier, ProfanityClassifier};
use crate::web::oauth::{AuthUserCache, CampusAuthConfig};
use crate::web::phone_verifier_service::{
    ConsoleSmsSender, InMemoryVerificationStore, PhoneVerifierService, SmsSender, TwilioSender,
};
use crate::web::{start_web, WebState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let db = MarketDb::connect(&database_url).await?;
    db.insert_default_categories().await?;
    db.insert_default_tags().await?;
    info!("db connected & reference data primed");

    let oauth_config = CampusAuthConfig::new(
        env::var("OAUTH_CLIENT_ID").context("OAUTH_CLIENT_ID must be set")?,
        env::var("OAUTH_CLIENT_SECRET").context("OAUTH_CLIENT_SECRET must be set")?,
        env::var("OAUTH_AUTH_URL").context("OAUTH_AUTH_URL must be set")?,
        env::var("OAUTH_TOKEN_URL").context("OAUTH_TOKEN_URL must be set")?,
        env::var("OAUTH_USERINFO_URL").context("OAUTH_USERINFO_URL must be set")?,
        env::var("OAUTH_REDIRECT_URL").context("OAUTH_REDIRECT_URL must be set")?,
        vec!["read".to_string()],
    );
    let key = match env::var("COOKIE_SECRET") {
        Ok(secret) => Key::from(secret.as_bytes()),
        // sessions won't survive a restart without a configured secret
        Err(_) => Key::generate(),
    };

    let sms: Arc<dyn SmsSender> = match (
        env::var("TWILIO_ACCOUNT_SID"),
        env::var("TWILIO_AUTH_TOKEN"),
        env::var("TWILIO_PHONE_NUMBER"),
    ) {
        (Ok(account_sid), Ok(auth_token), Ok(from_number)) => {
            Arc::new(TwilioSender::new(account_sid, auth_token, from_number))
        }
        _ => {
            warn!("Twilio credentials not configured, verification codes go to the log");
            Arc::new(ConsoleSmsSender)
        }
    };
    let phone_verifier =
        PhoneVerifierService::new(Arc::new(InMemoryVerificationStore::default()), sms);

    let classifier: Arc<dyn ProfanityClassifier> = match env::var("PROFANITY_API_URL") {
        Ok(url) => Arc::new(HttpProfanityClassifier::new(url)),
        Err(_) => {
            warn!("PROFANITY_API_URL not configured, profanity screening disabled");
            Arc::new(PermissiveClassifier)
        }
    };

    let media_root = PathBuf::from(env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string()));
    let image_store: Arc<dyn ImageStore> = Arc::new(DiskImageStore::new(
        media_root.clone(),
        "/media".to_string(),
    ));

    let state = WebState {
        db,
        key,
        oauth_config,
        user_cache: AuthUserCache::default(),
        phone_verifier,
        classifier,
        image_store,
    };

    let web_addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        .parse()
        .context("BIND_ADDR must be a socket address")?;
    let metrics_addr: SocketAddr = env::var("METRICS_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:9091".to_string())
        .parse()
        .context("METRICS_ADDR must be a socket address")?;

    futures::future::try_join(
        start_web(state, web_addr, media_root),
        web_metrics::start_metrics_server(metrics_addr),
    )
    .await?;
    Ok(())
}
