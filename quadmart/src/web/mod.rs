pub(crate) mod api;
pub(crate) mod error;
pub(crate) mod oauth;
pub(crate) mod phone_verifier_service;
pub(crate) mod state;

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;

pub(crate) use state::WebState;

pub(crate) async fn start_web(
    state: WebState,
    addr: SocketAddr,
    media_root: PathBuf,
) -> anyhow::Result<()> {
    let app = Router::new()
        .route(
            "/market/listings",
            get(api::listings::list_listings).post(api::listings::create_listing),
        )
        .route(
            "/market/listings/{id}",
            get(api::listings::get_listing)
                .patch(api::listings::update_listing)
                .delete(api::listings::delete_listing),
        )
        .route(
            "/market/listings/{id}/offers",
            get(api::offers::list_offers)
                .post(api::offers::create_offer)
                .delete(api::offers::delete_offer),
        )
        .route(
            "/market/listings/{id}/favorites",
            post(api::favorites::add_favorite).delete(api::favorites::remove_favorite),
        )
        .route(
            "/market/listings/{id}/images",
            post(api::images::upload_images),
        )
        .route(
            "/market/listings/images/{image_id}",
            delete(api::images::delete_image),
        )
        .route("/market/tags", get(api::tags::tags))
        .route("/market/types", get(api::tags::types))
        .route("/market/favorites", get(api::favorites::user_favorites))
        .route("/market/offers/made", get(api::offers::offers_made))
        .route("/market/offers/received", get(api::offers::offers_received))
        .route("/accounts/me", get(api::user::current_user))
        .route("/accounts/phone", post(api::user::send_phone_code))
        .route("/accounts/phone/verify", post(api::user::verify_phone))
        .route("/auth/login", get(oauth::begin_login))
        .route("/auth/callback", get(oauth::callback))
        .route("/auth/logout", get(oauth::logout))
        .nest_service("/media", ServeDir::new(media_root))
        .layer(middleware::from_fn(crate::web_metrics::track_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("web server listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
