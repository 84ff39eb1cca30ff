use async_trait::async_trait;
use sqlx::{FromRow, PgConnection, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::locations::models::{
    Locale, LocationNode, NewLocationNode, NodeChanges, NodeFilter, NodeKind, Translation,
};
use crate::features::locations::repositories::LocationRepository;
use crate::shared::constants::MAX_SEARCH_RESULTS;

/// Translation row as stored; the locale column is plain text
#[derive(Debug, FromRow)]
struct TranslationRow {
    node_id: Uuid,
    locale: String,
    title: String,
}

impl TranslationRow {
    fn into_translation(self) -> Option<Translation> {
        match Locale::parse(&self.locale) {
            Some(locale) => Some(Translation {
                node_id: self.node_id,
                locale,
                title: self.title,
            }),
            None => {
                tracing::warn!(
                    "Skipping translation of node {} with unsupported locale '{}'",
                    self.node_id,
                    self.locale
                );
                None
            }
        }
    }
}

fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        tracing::error!("Failed to {}: {:?}", context, e);
        AppError::Database(e)
    }
}

/// `%term%` for `LIKE ... ESCAPE '\'`, with the term's own wildcards taken literally
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

async fn write_translation(
    conn: &mut PgConnection,
    node_id: Uuid,
    locale: Locale,
    title: &str,
) -> Result<Translation> {
    let row = sqlx::query_as::<_, TranslationRow>(
        r#"
        INSERT INTO location_translations (node_id, locale, title)
        VALUES ($1, $2, $3)
        ON CONFLICT (node_id, locale)
        DO UPDATE SET title = EXCLUDED.title, updated_at = NOW()
        RETURNING node_id, locale, title
        "#,
    )
    .bind(node_id)
    .bind(locale.as_str())
    .bind(title)
    .fetch_one(conn)
    .await
    .map_err(db_error("upsert translation"))?;

    row.into_translation().ok_or_else(|| {
        AppError::Internal(format!("Stored translation has unsupported locale '{}'", locale))
    })
}

/// Nodes for `ids`, share-locked until the surrounding transaction ends so
/// they cannot be deleted while a write that references them is in flight
pub(crate) async fn lock_nodes(
    conn: &mut PgConnection,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, LocationNode>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let nodes = sqlx::query_as::<_, LocationNode>(
        r#"
        SELECT id, kind, parent_id, title, description, created_at, updated_at
        FROM location_nodes
        WHERE id = ANY($1)
        FOR SHARE
        "#,
    )
    .bind(ids)
    .fetch_all(conn)
    .await
    .map_err(db_error("lock location nodes"))?;

    Ok(nodes.into_iter().map(|n| (n.id, n)).collect())
}

/// Remove nodes; translations go with them through the foreign key
pub(crate) async fn delete_nodes(conn: &mut PgConnection, ids: &[Uuid]) -> Result<u64> {
    if ids.is_empty() {
        return Ok(0);
    }

    let result = sqlx::query("DELETE FROM location_nodes WHERE id = ANY($1)")
        .bind(ids)
        .execute(conn)
        .await
        .map_err(db_error("delete location nodes"))?;

    Ok(result.rows_affected())
}

/// Postgres-backed node store
pub struct PgLocationRepository {
    pool: PgPool,
}

impl PgLocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocationRepository for PgLocationRepository {
    async fn find(&self, id: Uuid) -> Result<Option<LocationNode>> {
        sqlx::query_as::<_, LocationNode>(
            r#"
            SELECT id, kind, parent_id, title, description, created_at, updated_at
            FROM location_nodes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("fetch location node"))
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<LocationNode>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, LocationNode>(
            r#"
            SELECT id, kind, parent_id, title, description, created_at, updated_at
            FROM location_nodes
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("fetch location nodes"))
    }

    async fn list(&self, filter: &NodeFilter) -> Result<Vec<LocationNode>> {
        let search_pattern = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| like_pattern(&s.to_lowercase()));
        // LIMIT NULL means no limit; only searches are capped
        let limit = search_pattern.as_ref().map(|_| MAX_SEARCH_RESULTS);

        sqlx::query_as::<_, LocationNode>(
            r#"
            SELECT n.id, n.kind, n.parent_id, n.title, n.description, n.created_at, n.updated_at
            FROM location_nodes n
            WHERE n.kind = $1
              AND ($2::uuid IS NULL OR n.parent_id = $2)
              AND (
                $3::text IS NULL
                OR LOWER(n.title) LIKE $3 ESCAPE '\'
                OR EXISTS (
                    SELECT 1 FROM location_translations t
                    WHERE t.node_id = n.id AND LOWER(t.title) LIKE $3 ESCAPE '\'
                )
              )
            ORDER BY n.title ASC, n.id ASC
            LIMIT $4
            "#,
        )
        .bind(filter.kind)
        .bind(filter.parent_id)
        .bind(search_pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list location nodes"))
    }

    async fn children(&self, parent_ids: &[Uuid], kinds: &[NodeKind]) -> Result<Vec<LocationNode>> {
        if parent_ids.is_empty() || kinds.is_empty() {
            return Ok(Vec::new());
        }
        let kinds: Vec<String> = kinds.iter().map(|k| k.as_str().to_string()).collect();

        sqlx::query_as::<_, LocationNode>(
            r#"
            SELECT id, kind, parent_id, title, description, created_at, updated_at
            FROM location_nodes
            WHERE parent_id = ANY($1) AND kind::text = ANY($2)
            ORDER BY title ASC, id ASC
            "#,
        )
        .bind(parent_ids)
        .bind(kinds)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("fetch child nodes"))
    }

    async fn insert(&self, node: NewLocationNode) -> Result<LocationNode> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;

        let inserted = sqlx::query_as::<_, LocationNode>(
            r#"
            INSERT INTO location_nodes (kind, parent_id, title, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, kind, parent_id, title, description, created_at, updated_at
            "#,
        )
        .bind(node.kind)
        .bind(node.parent_id)
        .bind(&node.title)
        .bind(&node.description)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("insert location node"))?;

        for (locale, title) in &node.translations {
            write_translation(&mut tx, inserted.id, *locale, title).await?;
        }

        tx.commit().await.map_err(db_error("commit location node insert"))?;
        Ok(inserted)
    }

    async fn update(&self, id: Uuid, changes: &NodeChanges) -> Result<Option<LocationNode>> {
        let (set_description, description) = match &changes.description {
            Some(value) => (true, value.clone()),
            None => (false, None),
        };

        sqlx::query_as::<_, LocationNode>(
            r#"
            UPDATE location_nodes
            SET title = COALESCE($2, title),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, kind, parent_id, title, description, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&changes.title)
        .bind(set_description)
        .bind(description)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("update location node"))
    }

    async fn subtree_ids(&self, id: Uuid) -> Result<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            WITH RECURSIVE subtree AS (
                SELECT id, 0 AS depth FROM location_nodes WHERE id = $1
                UNION ALL
                SELECT n.id, s.depth + 1
                FROM location_nodes n
                JOIN subtree s ON n.parent_id = s.id
                WHERE s.depth < 8
            )
            SELECT id FROM subtree
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("collect node subtree"))
    }

    async fn translations(&self, node_ids: &[Uuid]) -> Result<Vec<Translation>> {
        if node_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, TranslationRow>(
            r#"
            SELECT node_id, locale, title
            FROM location_translations
            WHERE node_id = ANY($1)
            ORDER BY node_id, locale
            "#,
        )
        .bind(node_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("fetch translations"))?;

        Ok(rows
            .into_iter()
            .filter_map(TranslationRow::into_translation)
            .collect())
    }

    async fn upsert_translation(
        &self,
        node_id: Uuid,
        locale: Locale,
        title: &str,
    ) -> Result<Translation> {
        let mut conn = self.pool.acquire().await.map_err(db_error("acquire connection"))?;
        write_translation(&mut conn, node_id, locale, title).await
    }

    async fn delete_translation(&self, node_id: Uuid, locale: Locale) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM location_translations WHERE node_id = $1 AND locale = $2")
                .bind(node_id)
                .bind(locale.as_str())
                .execute(&self.pool)
                .await
                .map_err(db_error("delete translation"))?;

        Ok(result.rows_affected() > 0)
    }
}
