use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::Notify;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::locations::models::{
    Locale, LocationNode, NewLocationNode, NodeChanges, NodeFilter, NodeKind, Translation,
};
use crate::features::locations::repositories::LocationRepository;

/// Holds one `translations` read after it has loaded its rows, until resumed
#[derive(Default)]
pub struct ReadPause {
    pub loaded: Notify,
    pub resume: Notify,
}

/// In-memory node store for tests.
///
/// Locks are never held across an await point. A few switches let tests
/// make the next write fail or hold a read in flight.
#[derive(Default)]
pub struct InMemoryLocationRepository {
    nodes: RwLock<HashMap<Uuid, LocationNode>>,
    translations: RwLock<HashMap<(Uuid, Locale), Translation>>,
    fail_next_removal: AtomicBool,
    fail_next_translation_write: AtomicBool,
    translations_pause: Mutex<Option<Arc<ReadPause>>>,
}

fn poisoned<T>(_: T) -> AppError {
    AppError::Internal("in-memory location store lock poisoned".to_string())
}

fn by_title(a: &LocationNode, b: &LocationNode) -> std::cmp::Ordering {
    a.title.cmp(&b.title).then(a.id.cmp(&b.id))
}

impl InMemoryLocationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_removal(&self) {
        self.fail_next_removal.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_translation_write(&self) {
        self.fail_next_translation_write.store(true, Ordering::SeqCst);
    }

    /// The next `translations` call waits on the returned pause once its rows are loaded
    pub fn pause_next_translations_read(&self) -> Result<Arc<ReadPause>> {
        let pause = Arc::new(ReadPause::default());
        *self.translations_pause.lock().map_err(poisoned)? = Some(pause.clone());
        Ok(pause)
    }

    /// Remove nodes with their translations; returns how many nodes went away
    pub fn remove_nodes(&self, ids: &[Uuid]) -> Result<u64> {
        if self.fail_next_removal.swap(false, Ordering::SeqCst) {
            return Err(AppError::Internal("node removal failed".to_string()));
        }
        let mut nodes = self.nodes.write().map_err(poisoned)?;
        let mut translations = self.translations.write().map_err(poisoned)?;
        let removed = ids.iter().filter(|id| nodes.remove(*id).is_some()).count();
        translations.retain(|(node_id, _), _| !ids.contains(node_id));
        Ok(removed as u64)
    }

    fn matches_search(&self, node: &LocationNode, needle: &str) -> Result<bool> {
        if node.title.to_lowercase().contains(needle) {
            return Ok(true);
        }
        let translations = self.translations.read().map_err(poisoned)?;
        Ok(translations
            .values()
            .any(|t| t.node_id == node.id && t.title.to_lowercase().contains(needle)))
    }
}

#[async_trait]
impl LocationRepository for InMemoryLocationRepository {
    async fn find(&self, id: Uuid) -> Result<Option<LocationNode>> {
        let nodes = self.nodes.read().map_err(poisoned)?;
        Ok(nodes.get(&id).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<LocationNode>> {
        let nodes = self.nodes.read().map_err(poisoned)?;
        Ok(ids.iter().filter_map(|id| nodes.get(id).cloned()).collect())
    }

    async fn list(&self, filter: &NodeFilter) -> Result<Vec<LocationNode>> {
        let candidates: Vec<LocationNode> = {
            let nodes = self.nodes.read().map_err(poisoned)?;
            nodes
                .values()
                .filter(|n| n.kind == filter.kind)
                .filter(|n| filter.parent_id.is_none() || n.parent_id == filter.parent_id)
                .cloned()
                .collect()
        };

        let needle = filter
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let mut result = Vec::with_capacity(candidates.len());
        for node in candidates {
            let keep = match &needle {
                Some(needle) => self.matches_search(&node, needle)?,
                None => true,
            };
            if keep {
                result.push(node);
            }
        }
        result.sort_by(by_title);
        Ok(result)
    }

    async fn children(&self, parent_ids: &[Uuid], kinds: &[NodeKind]) -> Result<Vec<LocationNode>> {
        let nodes = self.nodes.read().map_err(poisoned)?;
        let mut result: Vec<LocationNode> = nodes
            .values()
            .filter(|n| n.parent_id.is_some_and(|p| parent_ids.contains(&p)))
            .filter(|n| kinds.contains(&n.kind))
            .cloned()
            .collect();
        result.sort_by(by_title);
        Ok(result)
    }

    async fn insert(&self, node: NewLocationNode) -> Result<LocationNode> {
        let now = Utc::now();
        let inserted = LocationNode {
            id: Uuid::new_v4(),
            kind: node.kind,
            parent_id: node.parent_id,
            title: node.title,
            description: node.description,
            created_at: now,
            updated_at: now,
        };
        let mut nodes = self.nodes.write().map_err(poisoned)?;
        let mut translations = self.translations.write().map_err(poisoned)?;
        nodes.insert(inserted.id, inserted.clone());
        for (locale, title) in node.translations {
            translations.insert(
                (inserted.id, locale),
                Translation {
                    node_id: inserted.id,
                    locale,
                    title,
                },
            );
        }
        Ok(inserted)
    }

    async fn update(&self, id: Uuid, changes: &NodeChanges) -> Result<Option<LocationNode>> {
        let mut nodes = self.nodes.write().map_err(poisoned)?;
        let Some(node) = nodes.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = &changes.title {
            node.title = title.clone();
        }
        if let Some(description) = &changes.description {
            node.description = description.clone();
        }
        node.updated_at = Utc::now();
        Ok(Some(node.clone()))
    }

    async fn subtree_ids(&self, id: Uuid) -> Result<Vec<Uuid>> {
        let nodes = self.nodes.read().map_err(poisoned)?;
        if !nodes.contains_key(&id) {
            return Ok(Vec::new());
        }

        let mut collected = vec![id];
        let mut frontier = vec![id];
        while let Some(current) = frontier.pop() {
            for child in nodes.values().filter(|n| n.parent_id == Some(current)) {
                if !collected.contains(&child.id) {
                    collected.push(child.id);
                    frontier.push(child.id);
                }
            }
        }
        Ok(collected)
    }

    async fn translations(&self, node_ids: &[Uuid]) -> Result<Vec<Translation>> {
        let loaded: Vec<Translation> = {
            let translations = self.translations.read().map_err(poisoned)?;
            translations
                .values()
                .filter(|t| node_ids.contains(&t.node_id))
                .cloned()
                .collect()
        };

        let pause = self.translations_pause.lock().map_err(poisoned)?.take();
        if let Some(pause) = pause {
            pause.loaded.notify_one();
            pause.resume.notified().await;
        }
        Ok(loaded)
    }

    async fn upsert_translation(
        &self,
        node_id: Uuid,
        locale: Locale,
        title: &str,
    ) -> Result<Translation> {
        if self.fail_next_translation_write.swap(false, Ordering::SeqCst) {
            return Err(AppError::Internal("translation write failed".to_string()));
        }
        let translation = Translation {
            node_id,
            locale,
            title: title.to_string(),
        };
        let mut translations = self.translations.write().map_err(poisoned)?;
        translations.insert((node_id, locale), translation.clone());
        Ok(translation)
    }

    async fn delete_translation(&self, node_id: Uuid, locale: Locale) -> Result<bool> {
        let mut translations = self.translations.write().map_err(poisoned)?;
        Ok(translations.remove(&(node_id, locale)).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_node(kind: NodeKind, parent_id: Option<Uuid>, title: &str) -> NewLocationNode {
        NewLocationNode {
            kind,
            parent_id,
            title: title.to_string(),
            description: None,
            translations: Vec::new(),
        }
    }

    #[test]
    fn test_subtree_ids_collects_descendants() {
        let repo = InMemoryLocationRepository::new();
        tokio_test::block_on(async {
            let province = repo
                .insert(new_node(NodeKind::Province, None, "ГБАО"))
                .await
                .unwrap();
            let district = repo
                .insert(new_node(NodeKind::District, Some(province.id), "Рошткала"))
                .await
                .unwrap();
            let settlement = repo
                .insert(new_node(NodeKind::Settlement, Some(district.id), "Хорог"))
                .await
                .unwrap();
            let village = repo
                .insert(new_node(NodeKind::Village, Some(settlement.id), "Сучан"))
                .await
                .unwrap();

            let ids = repo.subtree_ids(district.id).await.unwrap();
            assert_eq!(ids.len(), 3);
            assert!(ids.contains(&district.id));
            assert!(ids.contains(&settlement.id));
            assert!(ids.contains(&village.id));
            assert!(!ids.contains(&province.id));

            assert!(repo.subtree_ids(Uuid::new_v4()).await.unwrap().is_empty());
        });
    }

    #[test]
    fn test_insert_stores_translations_with_node() {
        let repo = InMemoryLocationRepository::new();
        tokio_test::block_on(async {
            let mut node = new_node(NodeKind::Province, None, "ГБАО");
            node.translations = vec![
                (Locale::En, "GBAO".to_string()),
                (Locale::Tg, "ВМКБ".to_string()),
            ];
            let province = repo.insert(node).await.unwrap();

            let mut stored = repo.translations(&[province.id]).await.unwrap();
            stored.sort_by_key(|t| t.locale.as_str());
            let titles: Vec<&str> = stored.iter().map(|t| t.title.as_str()).collect();
            assert_eq!(titles, vec!["GBAO", "ВМКБ"]);
        });
    }

    #[test]
    fn test_failed_removal_keeps_nodes() {
        let repo = InMemoryLocationRepository::new();
        tokio_test::block_on(async {
            let province = repo
                .insert(new_node(NodeKind::Province, None, "ГБАО"))
                .await
                .unwrap();

            repo.fail_next_removal();
            assert!(repo.remove_nodes(&[province.id]).is_err());
            assert!(repo.find(province.id).await.unwrap().is_some());
            assert_eq!(repo.remove_nodes(&[province.id]).unwrap(), 1);
        });
    }

    #[test]
    fn test_remove_nodes_drops_translations() {
        let repo = InMemoryLocationRepository::new();
        tokio_test::block_on(async {
            let province = repo
                .insert(new_node(NodeKind::Province, None, "Хатлонская область"))
                .await
                .unwrap();
            repo.upsert_translation(province.id, Locale::Tg, "Вилояти Хатлон")
                .await
                .unwrap();

            assert_eq!(repo.remove_nodes(&[province.id]).unwrap(), 1);
            assert!(repo.find(province.id).await.unwrap().is_none());
            assert!(repo.translations(&[province.id]).await.unwrap().is_empty());
        });
    }

    #[test]
    fn test_list_searches_translations() {
        let repo = InMemoryLocationRepository::new();
        tokio_test::block_on(async {
            let province = repo
                .insert(new_node(NodeKind::Province, None, "Согдийская область"))
                .await
                .unwrap();
            repo.upsert_translation(province.id, Locale::En, "Sughd Region")
                .await
                .unwrap();

            let filter = NodeFilter {
                kind: NodeKind::Province,
                parent_id: None,
                search: Some("sughd".to_string()),
            };
            let found = repo.list(&filter).await.unwrap();
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].id, province.id);
        });
    }
}
