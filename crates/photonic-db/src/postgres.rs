use async_trait::async_trait;
use chrono::{DateTime, Utc};
use photonic_core::config::is_valid_table_name;
use photonic_core::models::{MediaMetadataUpdate, MediaRecord, NewMedia, OwnerKind, OwnerRef};
use photonic_core::AppError;
use serde_json::Value as JsonValue;
use sqlx::{FromRow, PgPool};

use crate::repository::MediaRepository;

const COLUMNS: &str = "id, asset_uuid, owner_kind, owner_id, filename, alt, title, description, \
                       caption, presets, config, created_at, updated_at";

/// Raw media table row
#[derive(Debug, FromRow)]
struct MediaRow {
    id: i64,
    asset_uuid: Option<String>,
    owner_kind: Option<String>,
    owner_id: Option<i64>,
    filename: String,
    alt: Option<String>,
    title: Option<String>,
    description: Option<String>,
    caption: Option<String>,
    presets: Option<JsonValue>,
    config: Option<JsonValue>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MediaRow> for MediaRecord {
    fn from(row: MediaRow) -> Self {
        let owner = match (row.owner_kind, row.owner_id) {
            (Some(kind), Some(id)) => OwnerKind::new(kind).ok().map(|kind| OwnerRef { kind, id }),
            _ => None,
        };

        MediaRecord {
            id: row.id,
            asset_uuid: row.asset_uuid,
            filename: row.filename,
            owner,
            alt: row.alt,
            title: row.title,
            description: row.description,
            caption: row.caption,
            presets: row.presets,
            config: row.config,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL repository for the media table
///
/// The table name is configurable, so queries are built at runtime; the name
/// is validated as a plain identifier on construction.
#[derive(Clone)]
pub struct PgMediaRepository {
    pool: PgPool,
    table: String,
}

impl PgMediaRepository {
    pub fn new(pool: PgPool, table: impl Into<String>) -> Result<Self, AppError> {
        let table = table.into();
        if !is_valid_table_name(&table) {
            return Err(AppError::Configuration(format!(
                "Invalid media table name: {}",
                table
            )));
        }
        Ok(Self { pool, table })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the media table and its owner index if they do not exist
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id BIGSERIAL PRIMARY KEY,
                asset_uuid TEXT UNIQUE,
                owner_kind TEXT,
                owner_id BIGINT,
                filename TEXT NOT NULL,
                alt TEXT,
                title TEXT,
                description TEXT,
                caption TEXT,
                presets JSONB,
                config JSONB,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            table = self.table
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS {table}_owner_idx ON {table} (owner_kind, owner_id)",
            table = self.table
        ))
        .execute(&self.pool)
        .await?;

        tracing::debug!(table = %self.table, "Media table schema ensured");
        Ok(())
    }
}

#[async_trait]
impl MediaRepository for PgMediaRepository {
    async fn find(&self, id: i64) -> Result<Option<MediaRecord>, AppError> {
        let row = sqlx::query_as::<_, MediaRow>(&format!(
            "SELECT {} FROM {} WHERE id = $1",
            COLUMNS, self.table
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MediaRecord::from))
    }

    async fn find_many(&self, ids: &[i64]) -> Result<Vec<MediaRecord>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, MediaRow>(&format!(
            "SELECT {} FROM {} WHERE id = ANY($1) ORDER BY id",
            COLUMNS, self.table
        ))
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MediaRecord::from).collect())
    }

    async fn create(&self, media: NewMedia) -> Result<MediaRecord, AppError> {
        let config = media.config_json()?;
        let (owner_kind, owner_id) = match &media.owner {
            Some(owner) => (Some(owner.kind.as_str().to_string()), Some(owner.id)),
            None => (None, None),
        };

        let row = sqlx::query_as::<_, MediaRow>(&format!(
            r#"
            INSERT INTO {} (
                asset_uuid, owner_kind, owner_id, filename,
                alt, title, description, caption, presets, config
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            self.table, COLUMNS
        ))
        .bind(media.asset_uuid)
        .bind(owner_kind)
        .bind(owner_id)
        .bind(media.filename)
        .bind(media.metadata.alt)
        .bind(media.metadata.title)
        .bind(media.metadata.description)
        .bind(media.metadata.caption)
        .bind(media.presets)
        .bind(config)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(media_id = row.id, table = %self.table, "Media row created");
        Ok(row.into())
    }

    async fn update_metadata(
        &self,
        id: i64,
        update: &MediaMetadataUpdate,
    ) -> Result<Option<MediaRecord>, AppError> {
        let row = sqlx::query_as::<_, MediaRow>(&format!(
            r#"
            UPDATE {}
            SET alt = COALESCE($2, alt),
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                caption = COALESCE($5, caption),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            self.table, COLUMNS
        ))
        .bind(id)
        .bind(update.alt.as_deref())
        .bind(update.title.as_deref())
        .bind(update.description.as_deref())
        .bind(update.caption.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MediaRecord::from))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", self.table))
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_for_owner(&self, owner: &OwnerRef) -> Result<Vec<MediaRecord>, AppError> {
        let rows = sqlx::query_as::<_, MediaRow>(&format!(
            "SELECT {} FROM {} WHERE owner_kind = $1 AND owner_id = $2 ORDER BY id",
            COLUMNS, self.table
        ))
        .bind(owner.kind.as_str())
        .bind(owner.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MediaRecord::from).collect())
    }

    async fn delete_for_owner(&self, owner: &OwnerRef, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE id = $1 AND owner_kind = $2 AND owner_id = $3",
            self.table
        ))
        .bind(id)
        .bind(owner.kind.as_str())
        .bind(owner.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
