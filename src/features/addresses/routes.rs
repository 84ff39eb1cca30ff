use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::addresses::handlers;
use crate::features::addresses::services::AddressService;

/// Create routes for addresses and owner attachments
pub fn routes(service: Arc<AddressService>) -> Router {
    Router::new()
        // Preview must come before the {id} route
        .route("/api/addresses/preview", post(handlers::preview_address))
        .route("/api/addresses", post(handlers::create_address))
        .route(
            "/api/addresses/{id}",
            get(handlers::get_address)
                .put(handlers::replace_address)
                .patch(handlers::patch_address)
                .delete(handlers::delete_address),
        )
        .route(
            "/api/owners/{owner_kind}/{owner_id}/address",
            get(handlers::get_owner_address)
                .put(handlers::set_owner_address)
                .delete(handlers::detach_owner_address),
        )
        .route(
            "/api/owners/{owner_kind}/{owner_id}/address/{address_id}",
            post(handlers::attach_owner_address),
        )
        .with_state(service)
}
