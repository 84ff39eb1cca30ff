use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, RequestLocale};
use crate::features::addresses::dtos::{AddressPreviewDto, AddressResponseDto};
use crate::features::addresses::models::{AddressPatch, AddressSelection, Owner, OwnerKind};
use crate::features::addresses::services::AddressService;
use crate::shared::types::ApiResponse;

fn owner(kind: &str, id: Uuid) -> Result<Owner> {
    let kind = kind.parse::<OwnerKind>().map_err(AppError::BadRequest)?;
    Ok(Owner::new(kind, id))
}

// ==================== Addresses ====================

/// Create an address from a selection
#[utoipa::path(
    post,
    path = "/api/addresses",
    params(
        ("locale" = Option<String>, Query, description = "Locale for the rendered strings")
    ),
    request_body = AddressSelection,
    responses(
        (status = 201, description = "Address stored", body = ApiResponse<AddressResponseDto>),
        (status = 400, description = "Malformed body"),
        (status = 422, description = "Selection rejected; one error per violation")
    ),
    tag = "addresses"
)]
pub async fn create_address(
    State(service): State<Arc<AddressService>>,
    locale: RequestLocale,
    AppJson(selection): AppJson<AddressSelection>,
) -> Result<(StatusCode, Json<ApiResponse<AddressResponseDto>>)> {
    let address = service.create(selection, locale.as_str()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(address),
            Some("Address created".to_string()),
            None,
        )),
    ))
}

/// Validate and render a selection without storing it
///
/// Always answers 200; rejections are listed in `violations`.
#[utoipa::path(
    post,
    path = "/api/addresses/preview",
    params(
        ("locale" = Option<String>, Query, description = "Locale for the rendered strings")
    ),
    request_body = AddressSelection,
    responses(
        (status = 200, description = "Rendered selection and its violations", body = ApiResponse<AddressPreviewDto>),
        (status = 400, description = "Malformed body")
    ),
    tag = "addresses"
)]
pub async fn preview_address(
    State(service): State<Arc<AddressService>>,
    locale: RequestLocale,
    AppJson(selection): AppJson<AddressSelection>,
) -> Result<Json<ApiResponse<AddressPreviewDto>>> {
    let preview = service.preview(selection, locale.as_str()).await?;
    Ok(Json(ApiResponse::success(Some(preview), None, None)))
}

/// Get an address with every level resolved
#[utoipa::path(
    get,
    path = "/api/addresses/{id}",
    params(
        ("id" = Uuid, Path, description = "Address ID"),
        ("locale" = Option<String>, Query, description = "Preferred locale")
    ),
    responses(
        (status = 200, description = "Resolved address", body = ApiResponse<AddressResponseDto>),
        (status = 404, description = "Address not found")
    ),
    tag = "addresses"
)]
pub async fn get_address(
    State(service): State<Arc<AddressService>>,
    Path(id): Path<Uuid>,
    locale: RequestLocale,
) -> Result<Json<ApiResponse<AddressResponseDto>>> {
    let address = service.get(id, locale.as_str()).await?;
    Ok(Json(ApiResponse::success(Some(address), None, None)))
}

/// Replace an address as a whole
#[utoipa::path(
    put,
    path = "/api/addresses/{id}",
    params(
        ("id" = Uuid, Path, description = "Address ID"),
        ("locale" = Option<String>, Query, description = "Preferred locale")
    ),
    request_body = AddressSelection,
    responses(
        (status = 200, description = "Address replaced", body = ApiResponse<AddressResponseDto>),
        (status = 404, description = "Address not found"),
        (status = 422, description = "Selection rejected")
    ),
    tag = "addresses"
)]
pub async fn replace_address(
    State(service): State<Arc<AddressService>>,
    Path(id): Path<Uuid>,
    locale: RequestLocale,
    AppJson(selection): AppJson<AddressSelection>,
) -> Result<Json<ApiResponse<AddressResponseDto>>> {
    let address = service.replace(id, selection, locale.as_str()).await?;
    Ok(Json(ApiResponse::success(
        Some(address),
        Some("Address updated".to_string()),
        None,
    )))
}

/// Change some fields of an address
///
/// Absent fields are kept, `null` clears. The merged result is validated as a whole.
#[utoipa::path(
    patch,
    path = "/api/addresses/{id}",
    params(
        ("id" = Uuid, Path, description = "Address ID"),
        ("locale" = Option<String>, Query, description = "Preferred locale")
    ),
    request_body = AddressPatch,
    responses(
        (status = 200, description = "Address updated", body = ApiResponse<AddressResponseDto>),
        (status = 404, description = "Address not found"),
        (status = 422, description = "Merged selection rejected")
    ),
    tag = "addresses"
)]
pub async fn patch_address(
    State(service): State<Arc<AddressService>>,
    Path(id): Path<Uuid>,
    locale: RequestLocale,
    AppJson(patch): AppJson<AddressPatch>,
) -> Result<Json<ApiResponse<AddressResponseDto>>> {
    let address = service.patch(id, patch, locale.as_str()).await?;
    Ok(Json(ApiResponse::success(
        Some(address),
        Some("Address updated".to_string()),
        None,
    )))
}

/// Delete an address and every attachment to it
#[utoipa::path(
    delete,
    path = "/api/addresses/{id}",
    params(
        ("id" = Uuid, Path, description = "Address ID")
    ),
    responses(
        (status = 204, description = "Address deleted"),
        (status = 404, description = "Address not found")
    ),
    tag = "addresses"
)]
pub async fn delete_address(
    State(service): State<Arc<AddressService>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ==================== Owners ====================

/// Address attached to a listing or user
#[utoipa::path(
    get,
    path = "/api/owners/{owner_kind}/{owner_id}/address",
    params(
        ("owner_kind" = String, Path, description = "`listing` or `user`"),
        ("owner_id" = Uuid, Path, description = "Owner ID"),
        ("locale" = Option<String>, Query, description = "Preferred locale")
    ),
    responses(
        (status = 200, description = "Resolved address", body = ApiResponse<AddressResponseDto>),
        (status = 400, description = "Unknown owner kind"),
        (status = 404, description = "No address attached")
    ),
    tag = "owners"
)]
pub async fn get_owner_address(
    State(service): State<Arc<AddressService>>,
    Path((owner_kind, owner_id)): Path<(String, Uuid)>,
    locale: RequestLocale,
) -> Result<Json<ApiResponse<AddressResponseDto>>> {
    let owner = owner(&owner_kind, owner_id)?;
    let address = service.owner_address(owner, locale.as_str()).await?;
    Ok(Json(ApiResponse::success(Some(address), None, None)))
}

/// Set the address of a listing or user
///
/// An address shared with other owners is never modified; a new one is created instead.
#[utoipa::path(
    put,
    path = "/api/owners/{owner_kind}/{owner_id}/address",
    params(
        ("owner_kind" = String, Path, description = "`listing` or `user`"),
        ("owner_id" = Uuid, Path, description = "Owner ID"),
        ("locale" = Option<String>, Query, description = "Preferred locale")
    ),
    request_body = AddressSelection,
    responses(
        (status = 200, description = "Owner's address", body = ApiResponse<AddressResponseDto>),
        (status = 400, description = "Unknown owner kind"),
        (status = 422, description = "Selection rejected")
    ),
    tag = "owners"
)]
pub async fn set_owner_address(
    State(service): State<Arc<AddressService>>,
    Path((owner_kind, owner_id)): Path<(String, Uuid)>,
    locale: RequestLocale,
    AppJson(selection): AppJson<AddressSelection>,
) -> Result<Json<ApiResponse<AddressResponseDto>>> {
    let owner = owner(&owner_kind, owner_id)?;
    let address = service
        .set_owner_address(owner, selection, locale.as_str())
        .await?;
    Ok(Json(ApiResponse::success(
        Some(address),
        Some("Address saved".to_string()),
        None,
    )))
}

/// Attach an existing address to a listing or user
#[utoipa::path(
    post,
    path = "/api/owners/{owner_kind}/{owner_id}/address/{address_id}",
    params(
        ("owner_kind" = String, Path, description = "`listing` or `user`"),
        ("owner_id" = Uuid, Path, description = "Owner ID"),
        ("address_id" = Uuid, Path, description = "Address ID"),
        ("locale" = Option<String>, Query, description = "Preferred locale")
    ),
    responses(
        (status = 200, description = "Attached address", body = ApiResponse<AddressResponseDto>),
        (status = 400, description = "Unknown owner kind"),
        (status = 404, description = "Address not found")
    ),
    tag = "owners"
)]
pub async fn attach_owner_address(
    State(service): State<Arc<AddressService>>,
    Path((owner_kind, owner_id, address_id)): Path<(String, Uuid, Uuid)>,
    locale: RequestLocale,
) -> Result<Json<ApiResponse<AddressResponseDto>>> {
    let owner = owner(&owner_kind, owner_id)?;
    let address = service
        .attach_existing(owner, address_id, locale.as_str())
        .await?;
    Ok(Json(ApiResponse::success(Some(address), None, None)))
}

/// Detach the address from a listing or user; the address itself is kept
#[utoipa::path(
    delete,
    path = "/api/owners/{owner_kind}/{owner_id}/address",
    params(
        ("owner_kind" = String, Path, description = "`listing` or `user`"),
        ("owner_id" = Uuid, Path, description = "Owner ID")
    ),
    responses(
        (status = 204, description = "Detached"),
        (status = 400, description = "Unknown owner kind"),
        (status = 404, description = "No address attached")
    ),
    tag = "owners"
)]
pub async fn detach_owner_address(
    State(service): State<Arc<AddressService>>,
    Path((owner_kind, owner_id)): Path<(String, Uuid)>,
) -> Result<StatusCode> {
    let owner = owner(&owner_kind, owner_id)?;
    service.detach_owner(owner).await?;
    Ok(StatusCode::NO_CONTENT)
}
