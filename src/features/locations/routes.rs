use std::sync::Arc;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::features::locations::handlers;
use crate::features::locations::services::LocationService;

/// Read-only hierarchy routes
pub fn public_routes(service: Arc<LocationService>) -> Router {
    Router::new()
        // Node routes must come before the {kind} captures
        .route(
            "/api/locations/nodes/{id}/children/{child_kind}",
            get(handlers::get_children),
        )
        .route(
            "/api/locations/nodes/{id}/ancestors",
            get(handlers::get_ancestors),
        )
        .route(
            "/api/locations/nodes/{id}/translations",
            get(handlers::list_translations),
        )
        .route("/api/locations/{kind}", get(handlers::list_nodes))
        .route("/api/locations/{kind}/{id}", get(handlers::get_node))
        .with_state(service)
}

/// Hierarchy maintenance routes, nested under `/api/admin`
pub fn admin_routes(service: Arc<LocationService>) -> Router {
    Router::new()
        .route("/locations", post(handlers::create_node))
        .route(
            "/locations/{id}",
            patch(handlers::update_node).delete(handlers::delete_node),
        )
        .route(
            "/locations/{id}/translations/{locale}",
            put(handlers::upsert_translation).delete(handlers::delete_translation),
        )
        .with_state(service)
}
