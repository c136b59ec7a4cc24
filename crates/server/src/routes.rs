use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use service::{account::service::AccountService, recipe::service::RecipeService};

pub mod auth;
pub mod recipes;

#[derive(Clone)]
pub struct ServerState {
    pub accounts: Arc<AccountService>,
    pub recipes: Arc<RecipeService>,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: health, auth, and recipe routes.
pub fn build_router(cors: CorsLayer, state: ServerState) -> Router {
    let public = Router::new().route("/health", get(health));

    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    let recipe_routes = Router::new()
        .route("/recipes", post(recipes::create).get(recipes::list_all))
        .route(
            "/recipes/:username",
            get(recipes::list_by_owner).delete(recipes::delete_by_owner),
        );

    public
        .merge(auth_routes)
        .merge(recipe_routes)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
