pub mod auth;
pub mod carpool_requests;
pub mod carpool_trips;
pub mod events;
pub mod hosting_requests;
pub mod hostings;
pub mod memberships;
pub mod users;

use axum::{middleware as axum_middleware, Router};

use crate::config::CONFIG;
use crate::middleware::{optional_auth, require_auth};
use crate::state::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required). Event reads are open to anonymous
    // callers but still resolve the bearer token when one is sent.
    let public_routes = Router::new()
        .route("/api/health", axum::routing::get(health_check))
        .route("/api/version", axum::routing::get(get_version))
        .nest("/auth", auth::auth_routes(state.clone()))
        .nest(
            "/api/events",
            events::events_routes(state.clone()).layer(axum_middleware::from_fn_with_state(
                state.clone(),
                optional_auth,
            )),
        );

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .nest("/api", api_routes(state.clone()))
        .layer(axum_middleware::from_fn_with_state(state, require_auth));

    public_routes.merge(protected_routes)
}

/// API routes under /api/* (protected by auth middleware)
fn api_routes(state: AppState) -> Router {
    Router::new()
        .nest("/users", users::users_routes(state.clone()))
        .nest("/memberships", memberships::memberships_routes(state.clone()))
        .nest(
            "/carpool-trips",
            carpool_trips::carpool_trips_routes(state.clone()),
        )
        .nest(
            "/carpool-requests",
            carpool_requests::carpool_requests_routes(state.clone()),
        )
        .nest("/hostings", hostings::hostings_routes(state.clone()))
        .nest(
            "/hosting-requests",
            hosting_requests::hosting_requests_routes(state),
        )
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Version info endpoint
async fn get_version() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "version": CONFIG.version,
        "backend": "rust"
    }))
}
