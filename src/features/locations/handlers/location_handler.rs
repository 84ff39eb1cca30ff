use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, RequestLocale};
use crate::features::locations::dtos::{
    CreateLocationNodeDto, LocationNodeDto, LocationQuery, NodeDeletionDto,
    TranslationResponseDto, UpdateLocationNodeDto, UpsertTranslationDto,
};
use crate::features::locations::models::NodeKind;
use crate::features::locations::services::LocationService;
use crate::shared::types::{ApiResponse, Meta};

fn parse_kind(raw: &str) -> Result<NodeKind> {
    raw.parse::<NodeKind>().map_err(AppError::BadRequest)
}

// ==================== Public reads ====================

/// List nodes of one kind
///
/// Cities come with their suburbs and districts with their settlements and
/// communities embedded as `children`.
#[utoipa::path(
    get,
    path = "/api/locations/{kind}",
    params(
        ("kind" = String, Path, description = "Node kind, singular or plural (e.g. `provinces`, `city`)"),
        ("locale" = Option<String>, Query, description = "Preferred locale; falls back to Accept-Language"),
        LocationQuery
    ),
    responses(
        (status = 200, description = "Nodes sorted by resolved title", body = ApiResponse<Vec<LocationNodeDto>>),
        (status = 400, description = "Unknown kind"),
        (status = 404, description = "Parent not found")
    ),
    tag = "locations"
)]
pub async fn list_nodes(
    State(service): State<Arc<LocationService>>,
    Path(kind): Path<String>,
    Query(query): Query<LocationQuery>,
    locale: RequestLocale,
) -> Result<Json<ApiResponse<Vec<LocationNodeDto>>>> {
    let kind = parse_kind(&kind)?;
    let nodes = service
        .list(kind, query.parent_id, query.search.as_deref(), locale.as_str())
        .await?;
    let total = nodes.len();
    Ok(Json(ApiResponse::success(
        Some(nodes),
        None,
        Some(Meta::total(total)),
    )))
}

/// Get one node by kind and id
#[utoipa::path(
    get,
    path = "/api/locations/{kind}/{id}",
    params(
        ("kind" = String, Path, description = "Node kind, singular or plural"),
        ("id" = Uuid, Path, description = "Node ID"),
        ("locale" = Option<String>, Query, description = "Preferred locale")
    ),
    responses(
        (status = 200, description = "Node with resolved title", body = ApiResponse<LocationNodeDto>),
        (status = 400, description = "Unknown kind"),
        (status = 404, description = "No node of that kind with this id")
    ),
    tag = "locations"
)]
pub async fn get_node(
    State(service): State<Arc<LocationService>>,
    Path((kind, id)): Path<(String, Uuid)>,
    locale: RequestLocale,
) -> Result<Json<ApiResponse<LocationNodeDto>>> {
    let kind = parse_kind(&kind)?;
    let node = service.get(kind, id, locale.as_str()).await?;
    Ok(Json(ApiResponse::success(Some(node), None, None)))
}

/// Children of a node of one kind
#[utoipa::path(
    get,
    path = "/api/locations/nodes/{id}/children/{child_kind}",
    params(
        ("id" = Uuid, Path, description = "Parent node ID"),
        ("child_kind" = String, Path, description = "Kind of children to return"),
        ("locale" = Option<String>, Query, description = "Preferred locale")
    ),
    responses(
        (status = 200, description = "Children sorted by resolved title; empty when the kind cannot live there", body = ApiResponse<Vec<LocationNodeDto>>),
        (status = 404, description = "Parent not found")
    ),
    tag = "locations"
)]
pub async fn get_children(
    State(service): State<Arc<LocationService>>,
    Path((id, child_kind)): Path<(Uuid, String)>,
    locale: RequestLocale,
) -> Result<Json<ApiResponse<Vec<LocationNodeDto>>>> {
    let child_kind = parse_kind(&child_kind)?;
    let children = service
        .get_children(id, child_kind, locale.as_str())
        .await?;
    let total = children.len();
    Ok(Json(ApiResponse::success(
        Some(children),
        None,
        Some(Meta::total(total)),
    )))
}

/// Ancestor chain of a node, province first
#[utoipa::path(
    get,
    path = "/api/locations/nodes/{id}/ancestors",
    params(
        ("id" = Uuid, Path, description = "Node ID"),
        ("locale" = Option<String>, Query, description = "Preferred locale")
    ),
    responses(
        (status = 200, description = "Chain from the province down to the node itself", body = ApiResponse<Vec<LocationNodeDto>>),
        (status = 404, description = "Node not found")
    ),
    tag = "locations"
)]
pub async fn get_ancestors(
    State(service): State<Arc<LocationService>>,
    Path(id): Path<Uuid>,
    locale: RequestLocale,
) -> Result<Json<ApiResponse<Vec<LocationNodeDto>>>> {
    let chain = service.get_ancestor_chain(id, locale.as_str()).await?;
    Ok(Json(ApiResponse::success(Some(chain), None, None)))
}

/// Stored translations of a node
#[utoipa::path(
    get,
    path = "/api/locations/nodes/{id}/translations",
    params(
        ("id" = Uuid, Path, description = "Node ID")
    ),
    responses(
        (status = 200, description = "Translations ordered by locale", body = ApiResponse<Vec<TranslationResponseDto>>),
        (status = 404, description = "Node not found")
    ),
    tag = "locations"
)]
pub async fn list_translations(
    State(service): State<Arc<LocationService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<TranslationResponseDto>>>> {
    let translations = service.list_translations(id).await?;
    Ok(Json(ApiResponse::success(Some(translations), None, None)))
}

// ==================== Admin writes ====================

/// Create a node
#[utoipa::path(
    post,
    path = "/api/admin/locations",
    request_body = CreateLocationNodeDto,
    responses(
        (status = 201, description = "Node created", body = ApiResponse<LocationNodeDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Parent missing or of the wrong kind")
    ),
    tag = "locations-admin",
    security(("basic_auth" = []))
)]
pub async fn create_node(
    State(service): State<Arc<LocationService>>,
    locale: RequestLocale,
    AppJson(dto): AppJson<CreateLocationNodeDto>,
) -> Result<(StatusCode, Json<ApiResponse<LocationNodeDto>>)> {
    let node = service.create(dto, locale.as_str()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(node),
            Some("Location node created".to_string()),
            None,
        )),
    ))
}

/// Edit a node's title or description
#[utoipa::path(
    patch,
    path = "/api/admin/locations/{id}",
    params(
        ("id" = Uuid, Path, description = "Node ID")
    ),
    request_body = UpdateLocationNodeDto,
    responses(
        (status = 200, description = "Node updated", body = ApiResponse<LocationNodeDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Node not found")
    ),
    tag = "locations-admin",
    security(("basic_auth" = []))
)]
pub async fn update_node(
    State(service): State<Arc<LocationService>>,
    Path(id): Path<Uuid>,
    locale: RequestLocale,
    AppJson(dto): AppJson<UpdateLocationNodeDto>,
) -> Result<Json<ApiResponse<LocationNodeDto>>> {
    let node = service.update(id, dto, locale.as_str()).await?;
    Ok(Json(ApiResponse::success(
        Some(node),
        Some("Location node updated".to_string()),
        None,
    )))
}

/// Delete a node with its whole subtree
///
/// Addresses referencing any removed node are detached rather than deleted.
#[utoipa::path(
    delete,
    path = "/api/admin/locations/{id}",
    params(
        ("id" = Uuid, Path, description = "Node ID")
    ),
    responses(
        (status = 200, description = "Subtree removed", body = ApiResponse<NodeDeletionDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Node not found")
    ),
    tag = "locations-admin",
    security(("basic_auth" = []))
)]
pub async fn delete_node(
    State(service): State<Arc<LocationService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<NodeDeletionDto>>> {
    let outcome = service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        Some(outcome),
        Some("Location node deleted".to_string()),
        None,
    )))
}

/// Create or replace a translation
#[utoipa::path(
    put,
    path = "/api/admin/locations/{id}/translations/{locale}",
    params(
        ("id" = Uuid, Path, description = "Node ID"),
        ("locale" = String, Path, description = "One of `ru`, `tg`, `en`")
    ),
    request_body = UpsertTranslationDto,
    responses(
        (status = 200, description = "Translation stored", body = ApiResponse<TranslationResponseDto>),
        (status = 400, description = "Unsupported locale or blank title"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Node not found")
    ),
    tag = "locations-admin",
    security(("basic_auth" = []))
)]
pub async fn upsert_translation(
    State(service): State<Arc<LocationService>>,
    Path((id, locale)): Path<(Uuid, String)>,
    AppJson(dto): AppJson<UpsertTranslationDto>,
) -> Result<Json<ApiResponse<TranslationResponseDto>>> {
    let translation = service.upsert_translation(id, &locale, dto).await?;
    Ok(Json(ApiResponse::success(Some(translation), None, None)))
}

/// Remove a translation
#[utoipa::path(
    delete,
    path = "/api/admin/locations/{id}/translations/{locale}",
    params(
        ("id" = Uuid, Path, description = "Node ID"),
        ("locale" = String, Path, description = "One of `ru`, `tg`, `en`")
    ),
    responses(
        (status = 204, description = "Translation removed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No such translation")
    ),
    tag = "locations-admin",
    security(("basic_auth" = []))
)]
pub async fn delete_translation(
    State(service): State<Arc<LocationService>>,
    Path((id, locale)): Path<(Uuid, String)>,
) -> Result<StatusCode> {
    service.delete_translation(id, &locale).await?;
    Ok(StatusCode::NO_CONTENT)
}
