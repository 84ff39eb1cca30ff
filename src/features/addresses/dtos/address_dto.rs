use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::addresses::models::{Address, Violation};
use crate::features::addresses::services::FormattedAddress;

/// A referenced node with its title in the request locale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ResolvedNodeDto {
    pub id: Uuid,
    pub title: String,
}

/// Stored address with every populated level resolved
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressResponseDto {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<ResolvedNodeDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<ResolvedNodeDto>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suburbs: Vec<ResolvedNodeDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<ResolvedNodeDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement: Option<ResolvedNodeDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community: Option<ResolvedNodeDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub village: Option<ResolvedNodeDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<String>,
    /// Every level, province first
    #[schema(example = "Согдийская область, Худжанд, Центр")]
    pub full: String,
    /// Branch head and its first child level
    #[schema(example = "Худжанд, Центр")]
    pub short: String,
    /// Every administrative reference was cleared by node deletions
    pub orphaned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AddressResponseDto {
    pub fn new(address: Address, titles: &HashMap<Uuid, String>, formatted: FormattedAddress) -> Self {
        let resolve = |id: Option<Uuid>| {
            id.and_then(|id| {
                titles.get(&id).map(|title| ResolvedNodeDto {
                    id,
                    title: title.clone(),
                })
            })
        };
        let data = &address.data;

        Self {
            id: address.id,
            province: resolve(data.province_id),
            city: resolve(data.city_id()),
            suburbs: data
                .suburb_ids()
                .iter()
                .filter_map(|id| resolve(Some(*id)))
                .collect(),
            district: resolve(data.district_id()),
            settlement: resolve(data.settlement_id()),
            community: resolve(data.community_id()),
            village: resolve(data.village_id()),
            line: data.line.clone(),
            full: formatted.full,
            short: formatted.short,
            orphaned: data.is_orphaned(),
            created_at: address.created_at,
            updated_at: address.updated_at,
        }
    }
}

/// Outcome of checking a selection without storing it
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressPreviewDto {
    /// No violations; the selection can be saved as is
    pub accepted: bool,
    pub full: String,
    pub short: String,
    pub violations: Vec<Violation>,
}
