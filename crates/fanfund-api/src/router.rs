use axum::{
    Json, Router,
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

use crate::auth::{self, AppState};
use crate::middleware::{ADMIN_ONLY, attach_identity, require_auth, require_role};
use crate::{campaigns, donations, donors, influencers, stats};

/// Builds the full API surface. Identity resolution wraps everything
/// and never rejects; the per-group guards below it do.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/admin", post(auth::admin_login))
        .route("/api/auth/influencers/{id}", post(auth::influencer_login))
        .route("/api/auth/donors/{id}", post(auth::donor_login))
        .route(
            "/api/influencers",
            get(influencers::list).post(influencers::signup),
        )
        .route("/api/donors", get(donors::list).post(donors::signup))
        .route(
            "/api/campaigns",
            get(campaigns::list).post(campaigns::create),
        )
        .route(
            "/api/campaigns/{id}",
            get(campaigns::get_one)
                .put(campaigns::update)
                .delete(campaigns::remove),
        );

    let self_service = Router::new()
        .route(
            "/api/influencers/{id}",
            get(influencers::get_one)
                .put(influencers::update)
                .delete(influencers::remove),
        )
        .route(
            "/api/donors/{id}",
            get(donors::get_one)
                .put(donors::update)
                .delete(donors::remove),
        )
        .route_layer(from_fn(require_auth));

    let donation_routes = Router::new()
        .route(
            "/api/donations",
            get(donations::list).post(donations::create),
        )
        .route(
            "/api/donations/{id}",
            get(donations::get_one).delete(donations::remove),
        )
        .route_layer(from_fn(require_auth));

    let admin = Router::new()
        .route("/api/stats", get(stats::overview))
        .route_layer(from_fn_with_state(ADMIN_ONLY, require_role));

    Router::new()
        .merge(public)
        .merge(self_service)
        .merge(donation_routes)
        .merge(admin)
        .layer(from_fn_with_state(state.clone(), attach_identity))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
