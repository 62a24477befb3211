pub mod auth;
pub mod extractors;
pub mod history;
pub mod items;
pub mod reference;
pub mod rooms;
pub mod schools;
pub mod transfers;
pub mod users;

use axum::{middleware as axum_middleware, routing::get, Json, Router};

use crate::config::CONFIG;
use crate::middleware::require_auth;
use crate::state::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/health", get(health_check))
        .nest("/auth", auth::auth_routes(state.clone()));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .nest("/api", api_routes(state.clone()))
        .layer(axum_middleware::from_fn_with_state(state, require_auth));

    public_routes.merge(protected_routes)
}

/// API routes under /api/* (protected by auth middleware)
fn api_routes(state: AppState) -> Router {
    Router::new()
        .nest("/items", items::items_routes(state.clone()))
        .nest("/transfers", transfers::transfers_routes(state.clone()))
        .nest("/history", history::history_routes(state.clone()))
        .nest("/rooms", rooms::rooms_routes(state.clone()))
        .nest("/schools", schools::schools_routes(state.clone()))
        .nest("/users", users::users_routes(state.clone()))
        .merge(reference::reference_routes(state))
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": CONFIG.version,
    }))
}
