pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod memory_repo;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod sqlite_repo;
pub mod token;
pub mod util;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use repository::AccountRepository;
use std::sync::Arc;
use token::TokenKeys;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn AccountRepository>,
    pub keys: TokenKeys,
}

fn authenticated_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/account", get(handlers::accounts::list_accounts))
        .route(
            "/account/{id}",
            get(handlers::accounts::get_account).delete(handlers::accounts::delete_account),
        )
        .route("/account/update", post(handlers::accounts::update_account))
        .route("/transfer", post(handlers::transfer::transfer))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_token,
        ))
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/account", post(handlers::accounts::create_account))
        .route("/login", post(handlers::auth::login))
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health_check))
}

/// Build the full application router (used by main and tests).
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(authenticated_routes(&state))
        .merge(public_routes())
        .merge(health_routes())
        .with_state(state)
}
