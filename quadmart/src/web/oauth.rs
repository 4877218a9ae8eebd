//! OAuth login against the campus identity provider, following the same
//! private-cookie session + in-memory user cache approach as the rest of
//! the platform's services.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts, Query, State},
    http::request::Parts,
    response::Redirect,
};
use axum_extra::extract::{
    cookie::{Cookie, Key, SameSite},
    PrivateCookieJar,
};
use oauth2::{
    basic::BasicClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use serde::Deserialize;
use tokio::sync::RwLock;
use quadmart_db::MarketDb;

use super::error::ApiError;

const AUTH_COOKIE: &str = "market_auth";

/// Authenticated principal for the current request.
#[derive(Debug, Clone)]
pub(crate) struct AuthUser {
    pub(crate) id: i64,
    pub(crate) name: String,
}

/// Session-token -> user cache so we only hit the identity provider once
/// per token.
#[derive(Clone, Default)]
pub(crate) struct AuthUserCache {
    users: Arc<RwLock<HashMap<String, AuthUser>>>,
}

impl AuthUserCache {
    async fn store_user(&self, token: &str, user: AuthUser) {
        let mut users = self.users.write().await;
        users.insert(token.to_string(), user);
    }

    async fn get_user(&self, token: &str) -> Option<AuthUser> {
        let users = self.users.read().await;
        users.get(token).cloned()
    }

    pub(crate) async fn remove_token(&self, token: &str) {
        let mut users = self.users.write().await;
        users.remove(token);
    }
}

/// Profile shape returned by the provider's userinfo endpoint.
#[derive(Debug, Deserialize)]
struct ProviderProfile {
    id: i64,
    username: String,
}

#[derive(Clone)]
pub(crate) struct CampusAuthConfig {
    inner: Arc<CampusAuthConfigImpl>,
}

struct CampusAuthConfigImpl {
    client: BasicClient,
    http: reqwest::Client,
    userinfo_url: String,
    scopes: Vec<String>,
}

impl CampusAuthConfig {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        client_id: String,
        client_secret: String,
        auth_url: String,
        token_url: String,
        userinfo_url: String,
        redirect_url: String,
        scopes: Vec<String>,
    ) -> Self {
        let client = BasicClient::new(
            ClientId::new(client_id),
            Some(ClientSecret::new(client_secret)),
            AuthUrl::new(auth_url).expect("Failed to parse auth URL"),
            Some(TokenUrl::new(token_url).expect("Failed to parse token URL")),
        )
        .set_redirect_uri(
            RedirectUrl::new(redirect_url.clone())
                .unwrap_or_else(|_| panic!("Failed to parse redirect URL {}", redirect_url)),
        );
        Self {
            inner: Arc::new(CampusAuthConfigImpl {
                client,
                http: reqwest::Client::new(),
                userinfo_url,
                scopes,
            }),
        }
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, ApiError> {
        let profile = self
            .inner
            .http
            .get(&self.inner.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|err| ApiError::Upstream(format!("identity provider error: {err}")))?
            .error_for_status()
            .map_err(|_| ApiError::NotAuthenticated)?
            .json::<ProviderProfile>()
            .await
            .map_err(|err| ApiError::Upstream(format!("identity provider error: {err}")))?;
        Ok(profile)
    }
}

pub(crate) async fn begin_login(
    cookies: PrivateCookieJar,
    State(config): State<CampusAuthConfig>,
) -> (PrivateCookieJar, Redirect) {
    let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

    let cookies = cookies.add(
        Cookie::build(("pkce_verifier", pkce_verifier.secret().clone()))
            .same_site(SameSite::Lax)
            .http_only(true)
            .build(),
    );

    let mut request = config
        .inner
        .client
        .authorize_url(CsrfToken::new_random)
        .set_pkce_challenge(pkce_challenge);
    for scope in &config.inner.scopes {
        request = request.add_scope(Scope::new(scope.clone()));
    }
    let (url, _token) = request.url();
    (cookies, Redirect::to(url.as_str()))
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthCallback {
    code: String,
}

pub(crate) async fn callback(
    cookies: PrivateCookieJar,
    State(config): State<CampusAuthConfig>,
    State(db): State<MarketDb>,
    State(cache): State<AuthUserCache>,
    Query(callback): Query<AuthCallback>,
) -> Result<(PrivateCookieJar, Redirect), ApiError> {
    let verifier = cookies
        .get("pkce_verifier")
        .ok_or(ApiError::NotAuthenticated)?
        .value()
        .to_string();
    let token = config
        .inner
        .client
        .exchange_code(AuthorizationCode::new(callback.code))
        .set_pkce_verifier(PkceCodeVerifier::new(verifier))
        .request_async(oauth2::reqwest::async_http_client)
        .await
        .map_err(|err| ApiError::Upstream(format!("token exchange failed: {err}")))?;
    let access_token = token.access_token().secret().clone();

    let profile = config.fetch_profile(&access_token).await?;
    db.get_or_create_user(profile.id, &profile.username).await?;
    cache
        .store_user(
            &access_token,
            AuthUser {
                id: profile.id,
                name: profile.username,
            },
        )
        .await;

    let cookies = cookies.remove(Cookie::from("pkce_verifier")).add(
        Cookie::build((AUTH_COOKIE, access_token))
            .same_site(SameSite::Lax)
            .http_only(true)
            .build(),
    );
    Ok((cookies, Redirect::to("/")))
}

pub(crate) async fn logout(
    cookies: PrivateCookieJar,
    State(cache): State<AuthUserCache>,
) -> (PrivateCookieJar, Redirect) {
    if let Some(cookie) = cookies.get(AUTH_COOKIE) {
        cache.remove_token(cookie.value()).await;
    }
    let cookies = cookies.remove(Cookie::from(AUTH_COOKIE));
    (cookies, Redirect::to("/"))
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Key: FromRef<S>,
    MarketDb: FromRef<S>,
    AuthUserCache: FromRef<S>,
    CampusAuthConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let cookie_jar: PrivateCookieJar<Key> = PrivateCookieJar::from_request_parts(parts, state)
            .await
            .expect("PrivateCookieJar extraction is infallible");
        let auth_cookie = cookie_jar.get(AUTH_COOKIE).ok_or(ApiError::NotAuthenticated)?;
        let token = auth_cookie.value();

        let State(cache): State<AuthUserCache> = State::from_request_parts(parts, state)
            .await
            .expect("state extraction is infallible");
        if let Some(user) = cache.get_user(token).await {
            return Ok(user);
        }

        let State(config): State<CampusAuthConfig> = State::from_request_parts(parts, state)
            .await
            .expect("state extraction is infallible");
        let State(db): State<MarketDb> = State::from_request_parts(parts, state)
            .await
            .expect("state extraction is infallible");
        let profile = config.fetch_profile(token).await?;
        db.get_or_create_user(profile.id, &profile.username).await?;
        let user = AuthUser {
            id: profile.id,
            name: profile.username,
        };
        cache.store_user(token, user.clone()).await;
        Ok(user)
    }
}

impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Key: FromRef<S>,
    MarketDb: FromRef<S>,
    AuthUserCache: FromRef<S>,
    CampusAuthConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        match <AuthUser as FromRequestParts<S>>::from_request_parts(parts, state).await {
            Ok(user) => Ok(Some(user)),
            Err(_) => Ok(None),
        }
    }
}
