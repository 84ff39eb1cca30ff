use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::config::LocaleConfig;
use crate::core::error::Result;
use crate::features::locations::models::{Locale, LocationNode, Translation};
use crate::features::locations::repositories::LocationRepository;

/// Resolve the display title of `node`.
///
/// Order: requested locale, default locale, primary title, `"<Kind> #<id>"`.
/// Total: always returns a non-empty string.
pub fn resolve_title(
    node: &LocationNode,
    translations: &[Translation],
    requested: Option<Locale>,
    default_locale: Locale,
) -> String {
    let translated = move |locale: Locale| {
        translations
            .iter()
            .find(|t| t.node_id == node.id && t.locale == locale)
            .map(|t| t.title.trim())
            .filter(|title| !title.is_empty())
    };

    requested
        .and_then(translated)
        .or_else(|| translated(default_locale))
        .or_else(|| node.primary_title())
        .map(str::to_string)
        .unwrap_or_else(|| node.synthetic_title())
}

struct CachedTitle {
    title: String,
    cached_at: Instant,
}

/// Cached titles per locale. `generation` moves on every invalidation; a fill
/// that started under an older generation is not stored.
#[derive(Default)]
struct TitleCache {
    generation: u64,
    locales: HashMap<Locale, HashMap<Uuid, CachedTitle>>,
}

/// Locale-aware title lookup with a per-locale cache.
///
/// The cache key is the effective locale: an unsupported request resolves
/// exactly like the default locale, so both share entries.
pub struct TranslationIndex {
    repo: Arc<dyn LocationRepository>,
    default_locale: Locale,
    ttl: Duration,
    cache: RwLock<TitleCache>,
}

impl std::fmt::Debug for TranslationIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationIndex")
            .field("default_locale", &self.default_locale)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TranslationIndex {
    pub fn new(repo: Arc<dyn LocationRepository>, config: &LocaleConfig) -> Self {
        Self {
            repo,
            default_locale: config.default_locale,
            ttl: config.title_cache_ttl,
            cache: RwLock::new(TitleCache::default()),
        }
    }

    /// Supported locale a request string maps to, or the default
    pub fn effective_locale(&self, requested: &str) -> Locale {
        Locale::parse(requested).unwrap_or(self.default_locale)
    }

    /// Resolved titles for `nodes` in the requested locale, keyed by node id
    pub async fn titles(
        &self,
        nodes: &[LocationNode],
        requested: &str,
    ) -> Result<HashMap<Uuid, String>> {
        let locale = self.effective_locale(requested);
        let mut resolved = HashMap::with_capacity(nodes.len());
        let mut misses: Vec<&LocationNode> = Vec::new();

        let generation = {
            let cache = self.cache.read().await;
            let entries = cache.locales.get(&locale);
            for node in nodes {
                match entries.and_then(|e| e.get(&node.id)) {
                    Some(entry) if entry.cached_at.elapsed() < self.ttl => {
                        resolved.insert(node.id, entry.title.clone());
                    }
                    _ => misses.push(node),
                }
            }
            cache.generation
        };

        if misses.is_empty() {
            tracing::debug!("Title cache hit for {} node(s) in '{}'", nodes.len(), locale);
            return Ok(resolved);
        }

        let miss_ids: Vec<Uuid> = misses.iter().map(|n| n.id).collect();
        let translations = self.repo.translations(&miss_ids).await?;
        tracing::debug!(
            "Title cache miss for {} node(s) in '{}'",
            miss_ids.len(),
            locale
        );

        let fresh: Vec<(Uuid, String)> = misses
            .into_iter()
            .map(|node| {
                let title = resolve_title(node, &translations, Some(locale), self.default_locale);
                (node.id, title)
            })
            .collect();

        let mut cache = self.cache.write().await;
        if cache.generation == generation {
            let entries = cache.locales.entry(locale).or_default();
            for (id, title) in &fresh {
                entries.insert(
                    *id,
                    CachedTitle {
                        title: title.clone(),
                        cached_at: Instant::now(),
                    },
                );
            }
        } else {
            tracing::debug!("Titles changed during lookup in '{}', not caching", locale);
        }
        drop(cache);

        resolved.extend(fresh);
        Ok(resolved)
    }

    /// Drop cached titles of the given nodes in every locale
    pub async fn invalidate(&self, node_ids: &[Uuid]) {
        let mut cache = self.cache.write().await;
        cache.generation += 1;
        for entries in cache.locales.values_mut() {
            for id in node_ids {
                entries.remove(id);
            }
        }
        tracing::debug!("Invalidated cached titles for {} node(s)", node_ids.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::locations::models::{NewLocationNode, NodeKind};
    use crate::features::locations::repositories::InMemoryLocationRepository;
    use chrono::Utc;
    use fake::{Fake, Faker};

    async fn title_of(
        index: &TranslationIndex,
        node: &LocationNode,
        requested: &str,
    ) -> Result<String> {
        let mut titles = index.titles(std::slice::from_ref(node), requested).await?;
        Ok(titles.remove(&node.id).unwrap_or_default())
    }

    fn node(kind: NodeKind, title: &str) -> LocationNode {
        LocationNode {
            id: Uuid::new_v4(),
            kind,
            parent_id: None,
            title: title.to_string(),
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn translation(node: &LocationNode, locale: Locale, title: &str) -> Translation {
        Translation {
            node_id: node.id,
            locale,
            title: title.to_string(),
        }
    }

    #[test]
    fn test_resolve_prefers_requested_locale() {
        let n = node(NodeKind::City, "Худжанд");
        let translations = vec![
            translation(&n, Locale::Ru, "Худжанд"),
            translation(&n, Locale::Tg, "Хуҷанд"),
            translation(&n, Locale::En, "Khujand"),
        ];
        assert_eq!(
            resolve_title(&n, &translations, Some(Locale::En), Locale::Ru),
            "Khujand"
        );
        assert_eq!(
            resolve_title(&n, &translations, Some(Locale::Tg), Locale::Ru),
            "Хуҷанд"
        );
    }

    #[test]
    fn test_resolve_falls_back_to_default_locale() {
        let n = node(NodeKind::Province, "");
        let translations = vec![translation(&n, Locale::Ru, "Согдийская область")];
        assert_eq!(
            resolve_title(&n, &translations, Some(Locale::En), Locale::Ru),
            "Согдийская область"
        );
        assert_eq!(
            resolve_title(&n, &translations, None, Locale::Ru),
            "Согдийская область"
        );
    }

    #[test]
    fn test_resolve_falls_back_to_primary_title() {
        let n = node(NodeKind::Suburb, "Центр");
        let other = node(NodeKind::Suburb, "Пахтакор");
        let translations = vec![translation(&other, Locale::En, "Pakhtakor")];
        assert_eq!(
            resolve_title(&n, &translations, Some(Locale::En), Locale::Ru),
            "Центр"
        );
    }

    #[test]
    fn test_resolve_synthesizes_title() {
        let n = node(NodeKind::Village, "   ");
        let blank = vec![translation(&n, Locale::Tg, " ")];
        assert_eq!(
            resolve_title(&n, &blank, Some(Locale::Tg), Locale::Ru),
            format!("Village #{}", n.id)
        );
    }

    #[test]
    fn test_resolve_is_total_for_arbitrary_locales() {
        let n = node(NodeKind::Community, "");
        for _ in 0..50 {
            let requested: String = Faker.fake();
            let title = resolve_title(&n, &[], Locale::parse(&requested), Locale::Ru);
            assert!(!title.is_empty());
        }
        for requested in ["", "zz", "ru-RU", "EN", "*", "tg;q=0.8", "😀"] {
            let title = resolve_title(&n, &[], Locale::parse(requested), Locale::Tg);
            assert_eq!(title, format!("Community #{}", n.id));
        }
    }

    #[tokio::test]
    async fn test_index_caches_until_invalidated() {
        let repo = Arc::new(InMemoryLocationRepository::new());
        let city = repo
            .insert(NewLocationNode {
                kind: NodeKind::City,
                parent_id: Some(Uuid::new_v4()),
                title: "Душанбе".to_string(),
                description: None,
                translations: Vec::new(),
            })
            .await
            .unwrap();
        let index = TranslationIndex::new(repo.clone(), &LocaleConfig::default());

        assert_eq!(title_of(&index, &city, "en").await.unwrap(), "Душанбе");

        repo.upsert_translation(city.id, Locale::En, "Dushanbe")
            .await
            .unwrap();
        // Still served from cache
        assert_eq!(title_of(&index, &city, "en").await.unwrap(), "Душанбе");

        index.invalidate(&[city.id]).await;
        assert_eq!(title_of(&index, &city, "en-US").await.unwrap(), "Dushanbe");
        assert_eq!(title_of(&index, &city, "ru").await.unwrap(), "Душанбе");
    }

    #[tokio::test]
    async fn test_lookup_racing_invalidation_is_not_cached() {
        let repo = Arc::new(InMemoryLocationRepository::new());
        let city = repo
            .insert(NewLocationNode {
                kind: NodeKind::City,
                parent_id: Some(Uuid::new_v4()),
                title: "Худжанд".to_string(),
                description: None,
                translations: Vec::new(),
            })
            .await
            .unwrap();
        let index = Arc::new(TranslationIndex::new(repo.clone(), &LocaleConfig::default()));

        // Hold the lookup after it has read the old rows
        let pause = repo.pause_next_translations_read().unwrap();
        let lookup = {
            let index = index.clone();
            let city = city.clone();
            tokio::spawn(async move { title_of(&index, &city, "en").await })
        };
        pause.loaded.notified().await;

        repo.upsert_translation(city.id, Locale::En, "Khujand")
            .await
            .unwrap();
        index.invalidate(&[city.id]).await;
        pause.resume.notify_one();

        assert_eq!(lookup.await.unwrap().unwrap(), "Худжанд");
        assert_eq!(title_of(&index, &city, "en").await.unwrap(), "Khujand");
    }

    #[tokio::test]
    async fn test_unsupported_locale_uses_default() {
        let repo = Arc::new(InMemoryLocationRepository::new());
        let index = TranslationIndex::new(repo, &LocaleConfig::default());
        assert_eq!(index.effective_locale("de-DE"), Locale::Ru);
        assert_eq!(index.effective_locale("tg"), Locale::Tg);
    }
}
