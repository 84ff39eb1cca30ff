use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::addresses::{
    dtos as addresses_dtos, handlers as addresses_handlers, models as addresses_models,
};
use crate::features::locations::{
    dtos as locations_dtos, handlers as locations_handlers, models as locations_models,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Locations (public)
        locations_handlers::list_nodes,
        locations_handlers::get_node,
        locations_handlers::get_children,
        locations_handlers::get_ancestors,
        locations_handlers::list_translations,
        // Locations (admin)
        locations_handlers::create_node,
        locations_handlers::update_node,
        locations_handlers::delete_node,
        locations_handlers::upsert_translation,
        locations_handlers::delete_translation,
        // Addresses
        addresses_handlers::create_address,
        addresses_handlers::preview_address,
        addresses_handlers::get_address,
        addresses_handlers::replace_address,
        addresses_handlers::patch_address,
        addresses_handlers::delete_address,
        // Owners
        addresses_handlers::get_owner_address,
        addresses_handlers::set_owner_address,
        addresses_handlers::attach_owner_address,
        addresses_handlers::detach_owner_address,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Locations
            locations_models::NodeKind,
            locations_models::Locale,
            locations_dtos::LocationNodeDto,
            locations_dtos::TranslationInputDto,
            locations_dtos::CreateLocationNodeDto,
            locations_dtos::UpdateLocationNodeDto,
            locations_dtos::UpsertTranslationDto,
            locations_dtos::TranslationResponseDto,
            locations_dtos::NodeDeletionDto,
            ApiResponse<Vec<locations_dtos::LocationNodeDto>>,
            ApiResponse<locations_dtos::LocationNodeDto>,
            ApiResponse<Vec<locations_dtos::TranslationResponseDto>>,
            ApiResponse<locations_dtos::TranslationResponseDto>,
            ApiResponse<locations_dtos::NodeDeletionDto>,
            // Addresses
            addresses_models::AddressSelection,
            addresses_models::AddressPatch,
            addresses_models::OwnerKind,
            addresses_models::Violation,
            addresses_models::ViolationKind,
            addresses_dtos::ResolvedNodeDto,
            addresses_dtos::AddressResponseDto,
            addresses_dtos::AddressPreviewDto,
            ApiResponse<addresses_dtos::AddressResponseDto>,
            ApiResponse<addresses_dtos::AddressPreviewDto>,
        )
    ),
    tags(
        (name = "locations", description = "Administrative hierarchy (provinces, cities, districts, suburbs, settlements, communities, villages)"),
        (name = "locations-admin", description = "Hierarchy maintenance (basic auth when configured)"),
        (name = "addresses", description = "Address selection, validation and rendering"),
        (name = "owners", description = "Addresses attached to listings and users"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Makon API",
        version = "0.1.0",
        description = "Location hierarchy and address API",
    )
)]
pub struct ApiDoc;

/// Adds the HTTP basic scheme guarding admin routes
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
