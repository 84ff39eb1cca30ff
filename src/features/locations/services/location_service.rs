use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::locations::dtos::{
    CreateLocationNodeDto, LocationNodeDto, NodeDeletionDto, TranslationResponseDto,
    UpdateLocationNodeDto, UpsertTranslationDto,
};
use crate::features::locations::models::{
    Locale, LocationNode, NewLocationNode, NodeChanges, NodeFilter, NodeKind, NodeRemoval,
};
use crate::features::locations::repositories::LocationRepository;
use crate::features::locations::services::TranslationIndex;
use crate::shared::constants::MAX_HIERARCHY_DEPTH;

/// Anything that holds references to nodes and must let go of them when the
/// nodes are deleted. Address aggregates are the only holder today.
///
/// The holder performs the deletion itself so that removing the nodes and
/// clearing the references commit or fail together.
#[async_trait]
pub trait NodeReferenceHolder: Send + Sync {
    /// Delete `node_ids` and clear every reference to them in one write
    async fn delete_nodes(&self, node_ids: &[Uuid]) -> Result<NodeRemoval>;
}

fn sort_by_title(nodes: &mut [LocationNodeDto]) {
    nodes.sort_by_cached_key(|n| (n.title.to_lowercase(), n.id));
}

/// Service for the administrative hierarchy: reads with resolved titles,
/// admin writes, subtree deletion with address detachment.
pub struct LocationService {
    repo: Arc<dyn LocationRepository>,
    titles: Arc<TranslationIndex>,
    references: Arc<dyn NodeReferenceHolder>,
}

impl LocationService {
    pub fn new(
        repo: Arc<dyn LocationRepository>,
        titles: Arc<TranslationIndex>,
        references: Arc<dyn NodeReferenceHolder>,
    ) -> Self {
        Self {
            repo,
            titles,
            references,
        }
    }

    // ==================== Reads ====================

    async fn find_node(&self, id: Uuid) -> Result<LocationNode> {
        self.repo
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Location node '{}' not found", id)))
    }

    /// Turn nodes into DTOs with resolved titles, sorted by that title.
    /// Cities and districts get their immediate children embedded.
    async fn to_dtos(&self, nodes: Vec<LocationNode>, locale: &str) -> Result<Vec<LocationNodeDto>> {
        let embed_parents: Vec<Uuid> = nodes
            .iter()
            .filter(|n| n.kind.embeds_children())
            .map(|n| n.id)
            .collect();
        let embed_kinds: Vec<NodeKind> = nodes
            .iter()
            .filter(|n| n.kind.embeds_children())
            .flat_map(|n| n.kind.child_kinds().iter().copied())
            .collect();
        let children = self.repo.children(&embed_parents, &embed_kinds).await?;

        let mut everything = nodes.clone();
        everything.extend(children.iter().cloned());
        let titles = self.titles.titles(&everything, locale).await?;
        let title_of = |node: &LocationNode| {
            titles
                .get(&node.id)
                .cloned()
                .unwrap_or_else(|| node.synthetic_title())
        };

        let mut children_by_parent: HashMap<Uuid, Vec<LocationNodeDto>> = HashMap::new();
        for child in children {
            let Some(parent_id) = child.parent_id else {
                continue;
            };
            let title = title_of(&child);
            children_by_parent
                .entry(parent_id)
                .or_default()
                .push(LocationNodeDto::from_node(child, title));
        }

        let mut dtos: Vec<LocationNodeDto> = nodes
            .into_iter()
            .map(|node| {
                let embeds = node.kind.embeds_children();
                let id = node.id;
                let title = title_of(&node);
                let mut dto = LocationNodeDto::from_node(node, title);
                if embeds {
                    let mut kids = children_by_parent.remove(&id).unwrap_or_default();
                    sort_by_title(&mut kids);
                    dto.children = Some(kids);
                }
                dto
            })
            .collect();
        sort_by_title(&mut dtos);
        Ok(dtos)
    }

    async fn to_dto(&self, node: LocationNode, locale: &str) -> Result<LocationNodeDto> {
        self.to_dtos(vec![node], locale)
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("Node vanished while resolving".to_string()))
    }

    /// List nodes of one kind, optionally under one parent or matching a search term
    pub async fn list(
        &self,
        kind: NodeKind,
        parent_id: Option<Uuid>,
        search: Option<&str>,
        locale: &str,
    ) -> Result<Vec<LocationNodeDto>> {
        if let Some(parent_id) = parent_id {
            self.find_node(parent_id).await?;
        }

        let nodes = self
            .repo
            .list(&NodeFilter {
                kind,
                parent_id,
                search: search.map(str::to_string),
            })
            .await?;

        self.to_dtos(nodes, locale).await
    }

    /// Get one node of the given kind
    pub async fn get(&self, kind: NodeKind, id: Uuid, locale: &str) -> Result<LocationNodeDto> {
        let node = self
            .repo
            .find(id)
            .await?
            .filter(|n| n.kind == kind)
            .ok_or_else(|| {
                AppError::NotFound(format!("{} with id '{}' not found", kind.label(), id))
            })?;

        self.to_dto(node, locale).await
    }

    /// Children of `node_id` of one kind. Empty when the kind cannot live under the node.
    pub async fn get_children(
        &self,
        node_id: Uuid,
        child_kind: NodeKind,
        locale: &str,
    ) -> Result<Vec<LocationNodeDto>> {
        let node = self.find_node(node_id).await?;
        if !node.kind.accepts_child(child_kind) {
            return Ok(Vec::new());
        }

        let children = self.repo.children(&[node.id], &[child_kind]).await?;
        self.to_dtos(children, locale).await
    }

    /// Nodes from the province down to `node_id`, inclusive
    pub async fn ancestor_nodes(&self, node_id: Uuid) -> Result<Vec<LocationNode>> {
        let node = self.find_node(node_id).await?;
        let mut chain = vec![node];

        while let Some(parent_id) = chain.last().and_then(|n| n.parent_id) {
            if chain.len() >= MAX_HIERARCHY_DEPTH || chain.iter().any(|n| n.id == parent_id) {
                return Err(AppError::Internal(format!(
                    "Ancestor chain of node {} is cyclic or deeper than {} levels",
                    node_id, MAX_HIERARCHY_DEPTH
                )));
            }
            let parent = self.repo.find(parent_id).await?.ok_or_else(|| {
                AppError::Internal(format!(
                    "Node {} references missing parent {}",
                    chain.last().map(|n| n.id).unwrap_or(node_id),
                    parent_id
                ))
            })?;
            chain.push(parent);
        }

        chain.reverse();
        Ok(chain)
    }

    /// Ancestor chain with resolved titles, root first. Children are not embedded.
    pub async fn get_ancestor_chain(
        &self,
        node_id: Uuid,
        locale: &str,
    ) -> Result<Vec<LocationNodeDto>> {
        let chain = self.ancestor_nodes(node_id).await?;
        let titles = self.titles.titles(&chain, locale).await?;

        Ok(chain
            .into_iter()
            .map(|node| {
                let title = titles
                    .get(&node.id)
                    .cloned()
                    .unwrap_or_else(|| node.synthetic_title());
                LocationNodeDto::from_node(node, title)
            })
            .collect())
    }

    pub async fn list_translations(&self, node_id: Uuid) -> Result<Vec<TranslationResponseDto>> {
        self.find_node(node_id).await?;
        let mut translations = self.repo.translations(&[node_id]).await?;
        translations.sort_by_key(|t| t.locale.as_str());
        Ok(translations.into_iter().map(Into::into).collect())
    }

    // ==================== Writes ====================

    /// Parent must exist and be of the kind-appropriate type; provinces have none
    async fn check_parent(&self, kind: NodeKind, parent_id: Option<Uuid>) -> Result<()> {
        match (kind.parent_kind(), parent_id) {
            (None, None) => Ok(()),
            (None, Some(_)) => Err(AppError::InvalidParent(format!(
                "A {} cannot have a parent",
                kind
            ))),
            (Some(expected), None) => Err(AppError::InvalidParent(format!(
                "A {} must be placed under a {}",
                kind, expected
            ))),
            (Some(expected), Some(parent_id)) => {
                let parent = self.repo.find(parent_id).await?.ok_or_else(|| {
                    AppError::InvalidParent(format!("Parent '{}' does not exist", parent_id))
                })?;
                if parent.kind != expected {
                    return Err(AppError::InvalidParent(format!(
                        "A {} must be placed under a {}, not a {}",
                        kind, expected, parent.kind
                    )));
                }
                Ok(())
            }
        }
    }

    /// Create a node, optionally with translations
    pub async fn create(&self, dto: CreateLocationNodeDto, locale: &str) -> Result<LocationNodeDto> {
        dto.validate()?;

        let translations = dto
            .translations
            .iter()
            .map(|t| {
                let locale = t.locale.parse::<Locale>().map_err(AppError::Validation)?;
                Ok((locale, t.title.trim().to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        self.check_parent(dto.kind, dto.parent_id).await?;

        let translation_count = translations.len();
        let node = self
            .repo
            .insert(NewLocationNode {
                kind: dto.kind,
                parent_id: dto.parent_id,
                title: dto.title.trim().to_string(),
                description: dto.description.filter(|d| !d.trim().is_empty()),
                translations,
            })
            .await?;

        tracing::info!(
            "Created {} '{}' ({}) with {} translation(s)",
            node.kind,
            node.title,
            node.id,
            translation_count
        );

        self.to_dto(node, locale).await
    }

    /// Edit title/description of a node
    pub async fn update(
        &self,
        id: Uuid,
        dto: UpdateLocationNodeDto,
        locale: &str,
    ) -> Result<LocationNodeDto> {
        dto.validate()?;

        let changes = NodeChanges {
            title: dto.title.map(|t| t.trim().to_string()),
            description: dto
                .description
                .map(|d| d.filter(|text| !text.trim().is_empty())),
        };

        let node = self
            .repo
            .update(id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Location node '{}' not found", id)))?;
        self.titles.invalidate(&[id]).await;

        tracing::info!("Updated {} {}", node.kind, node.id);
        self.to_dto(node, locale).await
    }

    /// Delete a node and its descendants. Addresses pointing at any of them are
    /// detached in the same write; deletion never fails because of references.
    pub async fn delete(&self, id: Uuid) -> Result<NodeDeletionDto> {
        let ids = self.repo.subtree_ids(id).await?;
        if ids.is_empty() {
            return Err(AppError::NotFound(format!(
                "Location node '{}' not found",
                id
            )));
        }

        let removal = self.references.delete_nodes(&ids).await?;
        self.titles.invalidate(&ids).await;

        tracing::info!(
            "Deleted node {} and {} descendant(s); detached {} address(es)",
            id,
            ids.len().saturating_sub(1),
            removal.detached_addresses
        );

        Ok(removal.into())
    }

    pub async fn upsert_translation(
        &self,
        node_id: Uuid,
        locale: &str,
        dto: UpsertTranslationDto,
    ) -> Result<TranslationResponseDto> {
        dto.validate()?;
        let locale = locale.parse::<Locale>().map_err(AppError::Validation)?;
        self.find_node(node_id).await?;

        let translation = self
            .repo
            .upsert_translation(node_id, locale, dto.title.trim())
            .await?;
        self.titles.invalidate(&[node_id]).await;

        tracing::info!("Stored '{}' translation for node {}", locale, node_id);
        Ok(translation.into())
    }

    pub async fn delete_translation(&self, node_id: Uuid, locale: &str) -> Result<()> {
        let locale = locale.parse::<Locale>().map_err(AppError::Validation)?;
        if !self.repo.delete_translation(node_id, locale).await? {
            return Err(AppError::NotFound(format!(
                "No '{}' translation for node '{}'",
                locale, node_id
            )));
        }
        self.titles.invalidate(&[node_id]).await;

        tracing::info!("Removed '{}' translation of node {}", locale, node_id);
        Ok(())
    }
}
