use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use std::collections::HashSet;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::addresses::models::{Address, AddressData, AddressSelection, Owner};
use crate::features::addresses::repositories::AddressRepository;
use crate::features::addresses::services::validate_selection;
use crate::features::locations::models::NodeRemoval;
use crate::features::locations::repositories::{delete_nodes, lock_nodes};

/// Address row without its suburbs
#[derive(Debug, FromRow)]
struct AddressRow {
    id: Uuid,
    province_id: Option<Uuid>,
    city_id: Option<Uuid>,
    district_id: Option<Uuid>,
    settlement_id: Option<Uuid>,
    community_id: Option<Uuid>,
    village_id: Option<Uuid>,
    line: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AddressRow {
    fn into_address(self, suburb_ids: Vec<Uuid>) -> Address {
        Address {
            id: self.id,
            data: AddressData::from_columns(
                self.province_id,
                self.city_id,
                suburb_ids,
                self.district_id,
                self.settlement_id,
                self.community_id,
                self.village_id,
                self.line,
            ),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const ADDRESS_COLUMNS: &str = "id, province_id, city_id, district_id, settlement_id, \
     community_id, village_id, line, created_at, updated_at";

fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        tracing::error!("Failed to {}: {:?}", context, e);
        AppError::Database(e)
    }
}

async fn load_suburbs(conn: &mut PgConnection, address_id: Uuid) -> Result<Vec<Uuid>> {
    sqlx::query_scalar::<_, Uuid>(
        "SELECT suburb_id FROM address_suburbs WHERE address_id = $1 ORDER BY position",
    )
    .bind(address_id)
    .fetch_all(conn)
    .await
    .map_err(db_error("fetch address suburbs"))
}

async fn load(conn: &mut PgConnection, id: Uuid) -> Result<Option<Address>> {
    let row = sqlx::query_as::<_, AddressRow>(&format!(
        "SELECT {} FROM addresses WHERE id = $1",
        ADDRESS_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(db_error("fetch address"))?;

    match row {
        Some(row) => {
            let suburbs = load_suburbs(conn, row.id).await?;
            Ok(Some(row.into_address(suburbs)))
        }
        None => Ok(None),
    }
}

async fn write_suburbs(conn: &mut PgConnection, address_id: Uuid, suburb_ids: &[Uuid]) -> Result<()> {
    sqlx::query("DELETE FROM address_suburbs WHERE address_id = $1")
        .bind(address_id)
        .execute(&mut *conn)
        .await
        .map_err(db_error("clear address suburbs"))?;

    if suburb_ids.is_empty() {
        return Ok(());
    }

    let positions: Vec<i32> = (0..suburb_ids.len() as i32).collect();
    sqlx::query(
        r#"
        INSERT INTO address_suburbs (address_id, suburb_id, position)
        SELECT $1, suburb_id, position
        FROM UNNEST($2::uuid[], $3::int[]) AS s(suburb_id, position)
        "#,
    )
    .bind(address_id)
    .bind(suburb_ids)
    .bind(positions)
    .execute(conn)
    .await
    .map_err(db_error("store address suburbs"))?;

    Ok(())
}

/// Overwrite the columns of an existing address; `None` if it is gone
async fn update(conn: &mut PgConnection, id: Uuid, data: &AddressData) -> Result<Option<AddressRow>> {
    sqlx::query_as::<_, AddressRow>(&format!(
        r#"
        UPDATE addresses
        SET province_id = $2, city_id = $3, district_id = $4, settlement_id = $5,
            community_id = $6, village_id = $7, line = $8, updated_at = NOW()
        WHERE id = $1
        RETURNING {}
        "#,
        ADDRESS_COLUMNS
    ))
    .bind(id)
    .bind(data.province_id)
    .bind(data.city_id())
    .bind(data.district_id())
    .bind(data.settlement_id())
    .bind(data.community_id())
    .bind(data.village_id())
    .bind(&data.line)
    .fetch_optional(conn)
    .await
    .map_err(db_error("update address"))
}

/// Validate against the referenced nodes, share-locking them for the rest of
/// the transaction so a concurrent node deletion waits for this write
async fn validated(conn: &mut PgConnection, selection: &AddressSelection) -> Result<AddressData> {
    let nodes = lock_nodes(conn, &selection.referenced_ids()).await?;
    validate_selection(selection, &nodes).map_err(|violations| {
        tracing::debug!("Address selection rejected: {:?}", violations);
        AppError::AddressRejected(violations)
    })
}

/// Clear references to `node_ids` from every address holding one; returns
/// how many addresses changed
async fn detach(conn: &mut PgConnection, node_ids: &[Uuid]) -> Result<u64> {
    let removed: HashSet<Uuid> = node_ids.iter().copied().collect();

    let affected = sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT a.id
        FROM addresses a
        WHERE a.province_id = ANY($1)
           OR a.city_id = ANY($1)
           OR a.district_id = ANY($1)
           OR a.settlement_id = ANY($1)
           OR a.community_id = ANY($1)
           OR a.village_id = ANY($1)
           OR EXISTS (
               SELECT 1 FROM address_suburbs s
               WHERE s.address_id = a.id AND s.suburb_id = ANY($1)
           )
        FOR UPDATE
        "#,
    )
    .bind(node_ids)
    .fetch_all(&mut *conn)
    .await
    .map_err(db_error("find addresses referencing nodes"))?;

    let mut detached = 0;
    for id in affected {
        let Some(address) = load(conn, id).await? else {
            continue;
        };
        let data = address.data.detached(&removed);
        if data == address.data {
            continue;
        }
        update(conn, id, &data).await?;
        write_suburbs(conn, id, data.suburb_ids()).await?;
        detached += 1;
    }
    Ok(detached)
}

/// Postgres-backed address store. Every multi-statement write runs in one
/// transaction.
pub struct PgAddressRepository {
    pool: PgPool,
}

impl PgAddressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AddressRepository for PgAddressRepository {
    async fn insert(&self, selection: &AddressSelection) -> Result<Address> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;
        let data = validated(&mut tx, selection).await?;

        let row = sqlx::query_as::<_, AddressRow>(&format!(
            r#"
            INSERT INTO addresses
                (province_id, city_id, district_id, settlement_id, community_id, village_id, line)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            ADDRESS_COLUMNS
        ))
        .bind(data.province_id)
        .bind(data.city_id())
        .bind(data.district_id())
        .bind(data.settlement_id())
        .bind(data.community_id())
        .bind(data.village_id())
        .bind(&data.line)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("insert address"))?;

        write_suburbs(&mut tx, row.id, data.suburb_ids()).await?;
        tx.commit().await.map_err(db_error("commit address insert"))?;

        Ok(row.into_address(data.suburb_ids().to_vec()))
    }

    async fn find(&self, id: Uuid) -> Result<Option<Address>> {
        let mut conn = self.pool.acquire().await.map_err(db_error("acquire connection"))?;
        load(&mut conn, id).await
    }

    async fn replace(&self, id: Uuid, selection: &AddressSelection) -> Result<Option<Address>> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;

        let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM addresses WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("lock address"))?;
        if existing.is_none() {
            return Ok(None);
        }

        let data = validated(&mut tx, selection).await?;
        let Some(row) = update(&mut tx, id, &data).await? else {
            return Ok(None);
        };
        write_suburbs(&mut tx, id, data.suburb_ids()).await?;
        tx.commit().await.map_err(db_error("commit address replace"))?;

        Ok(Some(row.into_address(data.suburb_ids().to_vec())))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("delete address"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_nodes(&self, node_ids: &[Uuid]) -> Result<NodeRemoval> {
        if node_ids.is_empty() {
            return Ok(NodeRemoval::default());
        }
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;

        let detached_addresses = detach(&mut tx, node_ids).await?;
        let removed_nodes = delete_nodes(&mut tx, node_ids).await?;

        tx.commit().await.map_err(db_error("commit node deletion"))?;
        Ok(NodeRemoval {
            removed_nodes,
            detached_addresses,
        })
    }

    async fn attach(&self, owner: Owner, address_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO address_attachments (owner_kind, owner_id, address_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (owner_kind, owner_id)
            DO UPDATE SET address_id = EXCLUDED.address_id, created_at = NOW()
            "#,
        )
        .bind(owner.kind)
        .bind(owner.id)
        .bind(address_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("attach address"))?;

        Ok(())
    }

    async fn detach_owner(&self, owner: Owner) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM address_attachments WHERE owner_kind = $1 AND owner_id = $2")
                .bind(owner.kind)
                .bind(owner.id)
                .execute(&self.pool)
                .await
                .map_err(db_error("detach owner address"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn address_id_for(&self, owner: Owner) -> Result<Option<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT address_id FROM address_attachments WHERE owner_kind = $1 AND owner_id = $2",
        )
        .bind(owner.kind)
        .bind(owner.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("fetch owner address"))
    }

    async fn attachment_count(&self, address_id: Uuid) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM address_attachments WHERE address_id = $1",
        )
        .bind(address_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("count address attachments"))
    }
}
