use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::locations::models::{LocationNode, NodeKind, NodeRemoval, Translation};
use crate::shared::types::patch_field;
use crate::shared::validation::not_blank;

/// Query parameters for listing nodes of one kind
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct LocationQuery {
    /// Only nodes directly under this parent
    pub parent_id: Option<Uuid>,
    /// Case-insensitive partial match on the title in any locale
    #[param(example = "худ")]
    pub search: Option<String>,
}

/// A node with its title resolved for the requested locale
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(no_recursion)]
pub struct LocationNodeDto {
    pub id: Uuid,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    /// Title after locale fallback
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Immediate children; present on cities (suburbs) and districts (settlements, communities)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<LocationNodeDto>>,
}

impl LocationNodeDto {
    pub fn from_node(node: LocationNode, title: String) -> Self {
        Self {
            id: node.id,
            kind: node.kind,
            parent_id: node.parent_id,
            title,
            description: node.description,
            children: None,
        }
    }
}

/// Translation supplied together with a new node
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct TranslationInputDto {
    /// One of `ru`, `tg`, `en`
    #[schema(example = "tg")]
    pub locale: String,
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub title: String,
}

/// Create request for a hierarchy node
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocationNodeDto {
    pub kind: NodeKind,
    /// Required for every kind except `province`
    pub parent_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub translations: Vec<TranslationInputDto>,
}

/// Text edits for a node; `description: null` clears it
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLocationNodeDto {
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "patch_field")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 2000))]
    pub description: Option<Option<String>>,
}

/// Upsert request for a single translation
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpsertTranslationDto {
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResponseDto {
    pub node_id: Uuid,
    pub locale: String,
    pub title: String,
}

impl From<Translation> for TranslationResponseDto {
    fn from(translation: Translation) -> Self {
        Self {
            node_id: translation.node_id,
            locale: translation.locale.as_str().to_string(),
            title: translation.title,
        }
    }
}

/// Outcome of deleting a node subtree
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeDeletionDto {
    /// The node itself plus every descendant
    pub removed_nodes: u64,
    /// Addresses that lost at least one reference
    pub detached_addresses: u64,
}

impl From<NodeRemoval> for NodeDeletionDto {
    fn from(removal: NodeRemoval) -> Self {
        Self {
            removed_nodes: removal.removed_nodes,
            detached_addresses: removal.detached_addresses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_description_length_is_checked() {
        let long = UpdateLocationNodeDto {
            title: None,
            description: Some(Some("д".repeat(2001))),
        };
        assert!(long.validate().is_err());

        let at_limit = UpdateLocationNodeDto {
            title: None,
            description: Some(Some("д".repeat(2000))),
        };
        assert!(at_limit.validate().is_ok());

        let cleared = UpdateLocationNodeDto {
            title: None,
            description: Some(None),
        };
        assert!(cleared.validate().is_ok());
    }
}
