use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::locations::models::{
    Locale, LocationNode, NewLocationNode, NodeChanges, NodeFilter, NodeKind, Translation,
};

/// Storage for hierarchy nodes and their translations.
///
/// Implementations only move rows; parent-kind rules, fallback resolution
/// and detachment are decided by the services. Node deletion goes through
/// the reference holder so it shares a transaction with the detach.
#[async_trait]
pub trait LocationRepository: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<LocationNode>>;

    /// Nodes for the given ids; unknown ids are silently absent from the result
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<LocationNode>>;

    /// Nodes of one kind, ordered by primary title
    async fn list(&self, filter: &NodeFilter) -> Result<Vec<LocationNode>>;

    /// Direct children of any of `parent_ids` whose kind is in `kinds`, ordered by primary title
    async fn children(&self, parent_ids: &[Uuid], kinds: &[NodeKind]) -> Result<Vec<LocationNode>>;

    /// Insert the node and its translations as one write
    async fn insert(&self, node: NewLocationNode) -> Result<LocationNode>;

    /// Returns `None` when the node does not exist
    async fn update(&self, id: Uuid, changes: &NodeChanges) -> Result<Option<LocationNode>>;

    /// Ids of the node and all of its descendants; empty if the node does not exist
    async fn subtree_ids(&self, id: Uuid) -> Result<Vec<Uuid>>;

    async fn translations(&self, node_ids: &[Uuid]) -> Result<Vec<Translation>>;

    async fn upsert_translation(
        &self,
        node_id: Uuid,
        locale: Locale,
        title: &str,
    ) -> Result<Translation>;

    /// Returns whether a translation was removed
    async fn delete_translation(&self, node_id: Uuid, locale: Locale) -> Result<bool>;
}
